//! Scripted transport for tests
//!
//! `MockTransport` records every request it sees and answers from a handler
//! closure, falling back to a FIFO of canned responses.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::{HttpRequest, HttpResponse, HttpTransport, TransportError};

type Handler = Box<dyn Fn(&HttpRequest) -> Option<Result<HttpResponse, TransportError>> + Send + Sync>;

#[derive(Default)]
pub struct MockTransport {
    handlers: Mutex<Vec<Handler>>,
    queue: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request no handler claims
    pub fn enqueue(&self, response: HttpResponse) -> &Self {
        self.queue.lock().push_back(Ok(response));
        self
    }

    pub fn enqueue_error(&self, error: TransportError) -> &Self {
        self.queue.lock().push_back(Err(error));
        self
    }

    /// Install a handler; returning `None` passes the request on.
    ///
    /// Handlers are consulted in installation order before the queue.
    pub fn with_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&HttpRequest) -> Option<Result<HttpResponse, TransportError>> + Send + Sync + 'static,
    {
        self.handlers.lock().push(Box::new(handler));
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl HttpTransport for MockTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());

        for handler in self.handlers.lock().iter() {
            if let Some(reply) = handler(request) {
                return reply;
            }
        }

        self.queue.lock().pop_front().unwrap_or_else(|| {
            Err(TransportError::Connect(format!(
                "no scripted response for {}",
                request.url
            )))
        })
    }
}
