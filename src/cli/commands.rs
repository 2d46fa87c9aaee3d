use crate::config::AppConfig;
use crate::payload::RawRequest;
use crate::resources::EchoApi;
use crate::server::{AppService, HttpServer};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for the brrtargs service
#[derive(Parser, Debug)]
#[command(name = "brrtargs")]
#[command(about = "Request argument loader and validator for resource endpoints", long_about = None)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the resource table over HTTP with echo handlers
    Serve {
        /// Listen address, overrides the configuration
        #[arg(long)]
        addr: Option<String>,
    },
    /// Load and validate one request offline and print the result
    Resolve {
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, relative to the base path, e.g. `/trades?location=kraken`
        #[arg(short, long)]
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
    /// List registered routes and their bound methods
    Routes,
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path),
        None => {
            let mut config = AppConfig::default();
            config.apply_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
    }
}

pub fn run_cli(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            serve(&config)
        }
        Commands::Resolve { method, path, body } => {
            let output = resolve(&config, &method, &path, body.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Commands::Routes => {
            let service = AppService::from_config(&config, Arc::new(EchoApi))?;
            for (pattern, resource) in service.router.routes() {
                let methods = service
                    .dispatcher
                    .methods_for(&resource)
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
                println!("{methods:<24} {pattern:<48} {resource}");
            }
            Ok(())
        }
    }
}

fn serve(config: &AppConfig) -> Result<()> {
    let service = AppService::from_config(config, Arc::new(EchoApi))?;
    service.router.dump_routes();
    let handle = HttpServer(service)
        .start(config.server.addr.as_str())
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!(addr = %handle.addr(), "Server listening");
    handle
        .join()
        .map_err(|_| anyhow!("server coroutine panicked"))
}

/// Run routing, loading and validation for `target` without a handler.
///
/// Returns `{"status": 200, "arguments": {...}}` on success and
/// `{"status": <code>, "error": {...}}` otherwise.
pub fn resolve(config: &AppConfig, method: &str, target: &str, body: Option<&str>) -> Result<Value> {
    let service = AppService::from_config(config, Arc::new(EchoApi))?;
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{method}'"))?;

    let base = service.router.base_path();
    let full_target = if target.starts_with(base) || base.is_empty() {
        target.to_string()
    } else {
        format!("{base}{target}")
    };
    let mut raw = RawRequest::from_target(method.clone(), &full_target);
    let route_match = service
        .router
        .route(&raw.path)
        .ok_or_else(|| anyhow!("No route matches {}", raw.path))?;
    raw = raw.with_path_params(route_match.path_params);
    if let Some(body) = body {
        raw = raw.with_body(body.as_bytes().to_vec());
    }

    match service.dispatcher.resolve(&route_match.resource, &raw) {
        None => Err(anyhow!(
            "{} is not bound for resource {}",
            method,
            route_match.resource
        )),
        Some(Ok(args)) => Ok(json!({ "status": 200, "arguments": args.to_json() })),
        Some(Err(e)) => {
            let status = e.status();
            Ok(json!({ "status": status, "error": e.into_response().body }))
        }
    }
}
