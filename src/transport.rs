//! HTTP transport seam
//!
//! The client only needs "GET this URL with these headers, give me status and
//! body". [`UreqTransport`] is the default blocking implementation; tests
//! and hosts with their own networking plug in another [`Transport`].

use std::time::Duration;

use crate::config::SourceConfig;
use crate::error::{Result, SourceError};

/// Raw response as seen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    /// Issue a GET. A non-2xx status is a normal `Ok` response; `Err` is for
    /// failures where no response was obtained.
    fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse>;
}

/// Blocking transport on a shared `ureq` agent
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &SourceConfig) -> Self {
        let agent = ureq::Agent::new_with_config(
            ureq::Agent::config_builder()
                .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
                .build(),
        );

        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn fetch(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let transport_error = |e: ureq::Error| SourceError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        match request.call() {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.into_body().read_to_string().map_err(transport_error)?;
                Ok(HttpResponse { status, body })
            }
            // Non-2xx surfaces as an error by default; hand it back as a response
            Err(ureq::Error::StatusCode(status)) => Ok(HttpResponse {
                status,
                body: String::new(),
            }),
            Err(e) => Err(transport_error(e)),
        }
    }
}
