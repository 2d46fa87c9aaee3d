//! # CLI Module
//!
//! ## Commands
//!
//! ```bash
//! # serve every resource with echo handlers
//! brrtargs --config brrtargs.yaml serve --addr 0.0.0.0:4242
//!
//! # check how a request would be loaded and validated
//! brrtargs resolve --method GET --path '/trades?location=kraken&from_timestamp=5'
//!
//! # list patterns and bound verbs
//! brrtargs routes
//! ```
//!
//! `resolve` prints the validated arguments, or the error body with its
//! status, without starting a server.

mod commands;


pub use commands::{resolve, run_cli, Cli, Commands};
