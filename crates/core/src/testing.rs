//! Test doubles shared by the unit tests of this crate.

use crate::config::CoreConfig;
use crate::constants::DEFAULT_APP_NAME;
use crate::resource::{Api, ApiRequest, ApiResponse, Method, Transport};
use crate::AdminResult;
use async_trait::async_trait;
use hms_types::NonEmptyText;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&ApiRequest) -> AdminResult<ApiResponse> + Send + Sync>;

/// Transport answering from a closure and recording every request it sees.
pub(crate) struct MockTransport {
    responder: Responder,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&ApiRequest) -> AdminResult<ApiResponse> + Send + Sync + 'static,
    {
        Arc::new(Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> AdminResult<ApiResponse> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub(crate) fn test_config() -> Arc<CoreConfig> {
    Arc::new(
        CoreConfig::new(
            "http://localhost:8080/",
            NonEmptyText::new(DEFAULT_APP_NAME).unwrap(),
            20,
        )
        .unwrap(),
    )
}

pub(crate) fn test_api(transport: Arc<MockTransport>) -> Api {
    Api::new(transport, test_config())
}
