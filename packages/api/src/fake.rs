//! In-memory [`Transport`] for tests: canned responses per route, every
//! request recorded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::ApiError;
use crate::transport::{ApiRequest, Method, Transport};

type Reply = Result<Value, ApiError>;

#[derive(Default)]
struct Route {
    queued: VecDeque<Reply>,
    // Repeated once the queue runs dry.
    last: Option<Reply>,
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    routes: Arc<Mutex<HashMap<(Method, String), Route>>>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
}

impl FakeTransport {
    /// Queue `reply` for the next request to `method path`.
    pub fn respond(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .queued
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.sent.lock().unwrap().push(request.clone());

        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes.get_mut(&(request.method, request.path.clone())) else {
            return Err(ApiError::NotFound(format!("no fake route for {}", request.path)));
        };
        if let Some(reply) = route.queued.pop_front() {
            route.last = Some(reply.clone());
            return reply;
        }
        route
            .last
            .clone()
            .unwrap_or_else(|| Err(ApiError::NotFound(request.path.clone())))
    }
}
