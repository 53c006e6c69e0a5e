//! `wiremock` server for adapter tests, driven from synchronous test code.

use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

/// A mock HTTP endpoint plus the runtime it was started on.
///
/// The adapters use blocking `reqwest`, so tests stay synchronous and only the
/// mock setup and inspection go through `block_on`.
pub struct MockApi {
    server: MockServer,
    runtime: Runtime,
}

impl MockApi {
    pub fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }
}

/// Path and query of a recorded request, as sent on the wire.
pub fn target(request: &Request) -> String {
    match request.url.query() {
        Some(query) => format!("{}?{query}", request.url.path()),
        None => request.url.path().to_string(),
    }
}

pub fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).and_then(|v| v.to_str().ok())
}
