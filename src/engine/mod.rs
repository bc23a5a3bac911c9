//! # Request Engine
//!
//! One request is one linear pass:
//!
//! ```text
//! RequestDocument
//!     │  resolver    dataDict    → bindings
//!     │  dispatcher  commandList → bindings (in order, last write wins)
//!     ▼  serializer  returnDict  → Response
//! ```
//!
//! Every stage records faults into the request's [`ErrorList`] and keeps
//! going, so a single response reports everything wrong with a request.
//! Output data is all-or-nothing: any recorded fault turns the response into
//! an error response.
//!
//! ## Components
//!
//! - [`resolver`]: typed data import and the literal inference chain
//! - [`dispatcher`]: allowlisted function calls and attribute reads
//! - [`serializer`]: return rendering and response gating
//! - [`context`]: the per-request [`BindingTable`] and [`ErrorList`]

pub mod context;
pub mod dispatcher;
pub mod resolver;
pub mod serializer;

use std::sync::Arc;

use tracing::{debug, info_span};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineResult, RequestFault};
use crate::library::DomainLibrary;
use crate::request::RequestDocument;
use crate::response::Response;

pub use context::{BindingTable, ErrorList, RequestContext};

/// Shared, stateless request processor. Safe to use from many threads; all
/// mutable state lives in a per-request [`RequestContext`].
pub struct RequestEngine {
    library: Arc<dyn DomainLibrary>,
    config: EngineConfig,
}

impl RequestEngine {
    pub fn new(library: Arc<dyn DomainLibrary>) -> Self {
        Self::with_config(library, EngineConfig::default())
    }

    pub fn with_config(library: Arc<dyn DomainLibrary>, config: EngineConfig) -> Self {
        Self { library, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one request to completion.
    pub fn process(&self, request: &RequestDocument) -> Response {
        let span = info_span!("request", id = %Uuid::new_v4());
        let _guard = span.enter();

        let mut ctx = RequestContext::new();
        let library = self.library.as_ref();

        resolver::resolve_data(&request.data, &mut ctx, library, &self.config);
        debug!(bindings = ctx.bindings.len(), faults = ctx.errors.len(), "data resolved");

        dispatcher::execute_commands(&request.commands, &mut ctx, library, &self.config);
        debug!(bindings = ctx.bindings.len(), faults = ctx.errors.len(), "commands executed");

        let response = serializer::build_response(&request.returns, &mut ctx);
        debug!(status = ?response.status, "response built");
        response
    }

    /// Byte-level seam for a transport: JSON request in, JSON response out.
    /// A body that is not a request document yields an error response.
    pub fn process_json(&self, body: &str) -> String {
        let response = match RequestDocument::from_json(body) {
            Ok(request) => self.process(&request),
            Err(e) => Response::from_faults(&[RequestFault::MalformedData(e.to_string())]),
        };
        render_response(&response)
    }

    /// Run one request on the blocking pool so a long library call never
    /// stalls the async executor.
    pub async fn handle(self: Arc<Self>, body: String) -> EngineResult<String> {
        let output = tokio::task::spawn_blocking(move || self.process_json(&body)).await?;
        Ok(output)
    }
}

fn render_response(response: &Response) -> String {
    match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            let message = serde_json::Value::String(format!("cannot serialize response: {e}"));
            format!(r#"{{"status":"error","dataDict":{{}},"errorList":[{message}]}}"#)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MemoryLibrary;
    use crate::response::Status;

    fn engine() -> RequestEngine {
        RequestEngine::new(Arc::new(
            MemoryLibrary::new().with_work("bwv7.7", "G4 A4 B4/2\nG3/2 D3/2"),
        ))
    }

    #[test]
    fn integer_round_trip() {
        let out = engine().process_json(
            r#"{"dataDict":{"x":{"fmt":"int","data":"5"}},"commandList":[],"returnDict":{"x":"int"}}"#,
        );
        assert_eq!(
            out,
            r#"{"status":"success","dataDict":{"x":{"fmt":"int","data":"5"}},"errorList":[]}"#
        );
    }

    #[test]
    fn invalid_integer_is_single_error() {
        let out = engine().process_json(
            r#"{"dataDict":{"x":{"fmt":"int","data":"abc"}},"commandList":[],"returnDict":{"x":"int"}}"#,
        );
        let response: Response = serde_json::from_str(&out).unwrap();
        assert_eq!(response.status, Status::Error);
        assert!(response.data_dict.is_empty());
        assert_eq!(response.error_list.len(), 1);
        assert!(response.error_list[0].starts_with("invalid integer for data element"));
    }

    #[test]
    fn malformed_body_is_error_response() {
        let out = engine().process_json("{not json");
        let response: Response = serde_json::from_str(&out).unwrap();
        assert_eq!(response.status, Status::Error);
        assert!(response.error_list[0].starts_with("Malformed request document"));
    }

    #[test]
    fn empty_request_succeeds() {
        assert_eq!(
            engine().process_json("{}"),
            r#"{"status":"success","dataDict":{},"errorList":[]}"#
        );
    }

    #[test]
    fn requests_share_no_bindings() {
        let engine = engine();
        let first = engine.process_json(r#"{"dataDict":{"x":{"data":"1"}}}"#);
        assert!(first.contains("success"));
        let second = engine.process_json(r#"{"returnDict":{"x":"int"}}"#);
        assert!(second.contains("Data element x not defined at time of return"));
    }

    #[test]
    fn config_is_exposed() {
        let engine = RequestEngine::with_config(
            Arc::new(MemoryLibrary::new()),
            EngineConfig::default().with_max_commands(3),
        );
        assert_eq!(engine.config().max_commands, Some(3));
    }

    #[tokio::test]
    async fn handle_runs_on_blocking_pool() {
        let engine = Arc::new(engine());
        let out = engine
            .handle(r#"{"dataDict":{"b":{"fmt":"bool","data":"True"}},"returnDict":{"b":"str"}}"#.into())
            .await
            .unwrap();
        assert_eq!(
            out,
            r#"{"status":"success","dataDict":{"b":{"fmt":"str","data":"True"}},"errorList":[]}"#
        );
    }
}
