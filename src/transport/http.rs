use crate::error::CallError;
use crate::graph::HttpMethod;
use std::io;
use std::time::Duration;
use tracing::debug;

/// A fully resolved request, with every variable already substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP collaborator used by API/Webhook nodes.
///
/// Implementations return `Ok` for any response the server produced, whatever its
/// status; the node decides what counts as success.
pub trait HttpClient: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, CallError>;
}

/// Blocking client backed by `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqHttpClient;

impl HttpClient for UreqHttpClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, CallError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(request.timeout_ms))
            .build();

        let mut call = agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        debug!(method = request.method.as_str(), url = %request.url, "Sending HTTP request");
        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        match result {
            Ok(response) => {
                let status = response.status();
                let body = response
                    .into_string()
                    .map_err(|e| CallError::Transport(e.to_string()))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, response)) => Ok(HttpResponse {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                if is_timeout(&transport) {
                    Err(CallError::Timeout(request.timeout_ms))
                } else {
                    Err(CallError::Transport(transport.to_string()))
                }
            }
        }
    }
}

/// Whether a transport failure was caused by the request deadline.
fn is_timeout(transport: &ureq::Transport) -> bool {
    if !matches!(
        transport.kind(),
        ureq::ErrorKind::Io | ureq::ErrorKind::ConnectionFailed
    ) {
        return false;
    }
    let mut source = std::error::Error::source(transport);
    while let Some(error) = source {
        if let Some(io) = error.downcast_ref::<io::Error>() {
            return matches!(io.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock);
        }
        source = error.source();
    }
    false
}
