use super::request::{parse_request, ParsedRequest};
use super::response::write_handler_response;
use crate::config::AppConfig;
use crate::connector::ConnectorSlot;
use crate::dispatcher::{Dispatcher, HandlerResponse, RequestId};
use crate::resources::{register_all, RestApi};
use crate::router::Router;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{debug, info};

/// HTTP front: routes a request to its resource and hands it to the
/// dispatcher. Router and dispatcher are immutable once serving starts.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    pub fn new(router: Arc<Router>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { router, dispatcher }
    }

    /// Register the full resource table against `api`, installing the
    /// configured chain connector when there is one.
    pub fn from_config(config: &AppConfig, api: Arc<dyn RestApi>) -> anyhow::Result<Self> {
        let slot = Arc::new(ConnectorSlot::new());
        if let Some(connector) = config.build_connector()? {
            slot.install(Arc::new(connector));
        }
        let mut router = Router::new(&config.server.base_path);
        let mut dispatcher = Dispatcher::with_connector_slot(slot);
        register_all(&mut dispatcher, &mut router, api)?;
        Ok(Self::new(Arc::new(router), Arc::new(dispatcher)))
    }

    /// Produce the response for one parsed request.
    pub fn handle(&self, req: ParsedRequest) -> HandlerResponse {
        if req.method == "GET" && req.path == "/health" {
            return health_endpoint(&self.dispatcher);
        }

        let request_id = RequestId::from_header_or_new(req.header("x-request-id"));

        let Ok(method) = Method::from_bytes(req.method.as_bytes()) else {
            return HandlerResponse::json(
                400,
                json!({ "error": "Invalid HTTP method", "method": req.method }),
            );
        };

        let Some(route_match) = self.router.route(&req.path) else {
            return HandlerResponse::json(
                404,
                json!({ "error": "Not Found", "method": req.method, "path": req.path }),
            );
        };

        let resource = Arc::clone(&route_match.resource);
        let path = req.path.clone();
        let raw = req.into_raw(method.clone(), route_match.path_params);

        match self
            .dispatcher
            .dispatch_with_request_id(&resource, &raw, request_id)
        {
            Some(response) => response,
            None => {
                let allowed = self.dispatcher.methods_for(&resource);
                debug!(
                    request_id = %request_id,
                    resource = %resource,
                    method = %method,
                    allowed = ?allowed,
                    "Method not bound for resource"
                );
                let mut response = HandlerResponse::json(
                    405,
                    json!({
                        "error": "Method Not Allowed",
                        "method": method.as_str(),
                        "path": path,
                    }),
                );
                let allow = allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                response.set_header("Allow", allow);
                response
            }
        }
    }
}

/// `{ "status": "ok" }` plus whether a chain connector is installed
pub fn health_endpoint(dispatcher: &Dispatcher) -> HandlerResponse {
    HandlerResponse::ok(json!({
        "status": "ok",
        "connector_configured": dispatcher.connector_slot().is_configured(),
    }))
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);
        let method = parsed.method.clone();
        let path = parsed.path.clone();
        let response = self.handle(parsed);
        info!(
            method = %method,
            path = %path,
            status = response.status,
            "Request complete"
        );
        write_handler_response(res, response);
        Ok(())
    }
}
