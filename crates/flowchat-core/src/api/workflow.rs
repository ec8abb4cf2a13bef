//! Workflow API service
//!
//! Passthrough for the diagram-rendering collaborator; the core never
//! interprets the specification it fetches.

use super::client::HttpClient;
use super::types::WorkflowSpec;
use crate::config::endpoints;
use crate::error::ChatResult;

/// Workflow API service backed by the HTTP transport
#[derive(Debug, Clone)]
pub struct WorkflowApi {
    http: HttpClient,
}

impl WorkflowApi {
    /// Create a workflow API over the given transport
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch a workflow specification by its spec id
    pub async fn get_workflow(&self, spec_id: &str) -> ChatResult<WorkflowSpec> {
        self.http.get_json(&endpoints::workflow(spec_id)).await
    }
}
