//! Helpers shared by the unit tests of this crate

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use trellis_core::{HttpQueryError, TrellisError};

use crate::processor::{HttpQueryProcessor, HttpQueryRequest, HttpQueryResponse};

enum Outcome {
    Echo,
    Fail(HttpQueryError),
    Internal,
}

/// Processor that records every request it receives
pub(crate) struct RecordingProcessor {
    requests: Mutex<Vec<HttpQueryRequest>>,
    outcome: Outcome,
}

impl RecordingProcessor {
    fn with_outcome(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            outcome,
        })
    }

    /// Answers with the received payload as `data`
    pub(crate) fn echo() -> Arc<Self> {
        Self::with_outcome(Outcome::Echo)
    }

    /// Fails every request with a protocol error
    pub(crate) fn failing(err: HttpQueryError) -> Arc<Self> {
        Self::with_outcome(Outcome::Fail(err))
    }

    /// Fails every request with an execution error
    pub(crate) fn internal() -> Arc<Self> {
        Self::with_outcome(Outcome::Internal)
    }

    pub(crate) fn requests(&self) -> Vec<HttpQueryRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> Option<HttpQueryRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl HttpQueryProcessor for RecordingProcessor {
    async fn run_http_query(
        &self,
        request: HttpQueryRequest,
    ) -> Result<HttpQueryResponse, TrellisError> {
        let payload = request.query.clone();
        self.requests.lock().unwrap().push(request);

        match &self.outcome {
            Outcome::Echo => {
                let graphql_response = json!({ "data": { "payload": payload } }).to_string();
                let mut headers = BTreeMap::new();
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                headers.insert("X-Processed".to_string(), "yes".to_string());
                Ok(HttpQueryResponse {
                    graphql_response,
                    headers,
                })
            }
            Outcome::Fail(err) => Err(err.clone().into()),
            Outcome::Internal => Err(TrellisError::Execution("resolver exploded".to_string())),
        }
    }
}
