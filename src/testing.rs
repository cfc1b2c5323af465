//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::api::{ApiRequest, HttpMethod, RawResponse, Transport};

type Reply = Result<RawResponse, String>;

/// Answers requests from a script and records everything it was sent.
///
/// Replies come from the ordered `sequence` first; once that is drained,
/// from per-route queues keyed by method and path. The last reply of a route
/// repeats so a page can re-fetch as often as it likes.
#[derive(Default)]
pub struct ScriptedTransport {
    sequence: Mutex<VecDeque<Reply>>,
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>,
    sent: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(sequence: Vec<Reply>) -> Self {
        ScriptedTransport {
            sequence: Mutex::new(sequence.into()),
            ..Default::default()
        }
    }

    pub fn routed() -> Self {
        Self::default()
    }

    /// Queue a reply for `method path`.
    pub fn on(&self, method: HttpMethod, path: &str, status: u16, body: impl Into<String>) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Ok(RawResponse::new(status, body)));
        self
    }

    /// Queue a transport-level failure for `method path`.
    pub fn fail(&self, method: HttpMethod, path: &str, reason: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Err(reason.to_string()));
        self
    }

    /// Drop every queued reply for `method path`.
    pub fn clear(&self, method: HttpMethod, path: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .remove(&(method, path.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn reply(&self, request: &ApiRequest) -> Reply {
        if let Some(next) = self.sequence.lock().unwrap().pop_front() {
            return next;
        }
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(request.method, request.path.clone())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Err(format!("no route for {} {}", request.method, request.path)),
        }
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Reply {
        let reply = self.reply(&request);
        self.sent.lock().unwrap().push(request);
        reply
    }
}

impl<T: Transport + Sync> Transport for &T {
    async fn send(&self, request: ApiRequest) -> Reply {
        (**self).send(request).await
    }
}
