// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal Moonraker HTTP client
//!
//! Both the ejector arm and Klipper-based printers expose Moonraker's
//! REST API. Requests are blocking `ureq` calls run on the blocking pool.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,
    /// The proxy gave up waiting for the firmware; the command may still run
    #[error("gateway timeout (HTTP {0})")]
    GatewayTimeout(u16),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
}

impl HttpError {
    /// The request may have reached the firmware even though no answer came back
    pub fn is_provisional(&self) -> bool {
        matches!(self, HttpError::Timeout | HttpError::GatewayTimeout(_))
    }
}

fn map_error(err: ureq::Error) -> HttpError {
    match err {
        ureq::Error::Timeout(_) => HttpError::Timeout,
        ureq::Error::Io(e) if e.kind() == std::io::ErrorKind::TimedOut => HttpError::Timeout,
        ureq::Error::StatusCode(code) => status_error(code),
        ureq::Error::ConnectionFailed => HttpError::Connection("connection refused".into()),
        ureq::Error::HostNotFound => HttpError::Connection("host not found".into()),
        ureq::Error::Io(e) => HttpError::Connection(e.to_string()),
        other => HttpError::Protocol(other.to_string()),
    }
}

fn status_error(code: u16) -> HttpError {
    match code {
        502 | 504 => HttpError::GatewayTimeout(code),
        _ => HttpError::Status(code),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

/// Moonraker endpoint on one host
#[derive(Clone)]
pub struct MoonrakerClient {
    base_url: String,
    agent: ureq::Agent,
}

impl MoonrakerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, HttpError> {
        self.request(Method::Get, path, query).await
    }

    pub async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, HttpError> {
        self.request(Method::Post, path, query).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, HttpError> {
        let agent = self.agent.clone();
        let url = format!("{}{}", self.base_url, path);
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        tokio::task::spawn_blocking(move || {
            let result = match method {
                Method::Get => {
                    let mut request = agent.get(&url);
                    for (k, v) in &query {
                        request = request.query(k, v);
                    }
                    request.call()
                }
                Method::Post => {
                    let mut request = agent.post(&url);
                    for (k, v) in &query {
                        request = request.query(k, v);
                    }
                    request.send_empty()
                }
            };
            let mut response = result.map_err(map_error)?;
            let code = response.status().as_u16();
            if code >= 400 {
                return Err(status_error(code));
            }
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(map_error)?;
            parse_body(&body)
        })
        .await
        .map_err(|e| HttpError::Protocol(format!("request task failed: {}", e)))?
    }
}

/// Empty bodies are valid for some POST endpoints
pub fn parse_body(body: &str) -> Result<Value, HttpError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| HttpError::Protocol(format!("invalid JSON: {}", e)))
}

/// `{"result": "ok"}` acknowledges a G-code script
pub fn is_ok_result(body: &Value) -> bool {
    body.get("result")
        .and_then(Value::as_str)
        .is_some_and(|r| r.eq_ignore_ascii_case("ok"))
}

/// Error message carried by a Moonraker error envelope
pub fn error_message(body: &Value) -> Option<String> {
    let error = body.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| error.as_str().map(str::to_string))
}

/// Object status out of an `objects/query` response
pub fn object<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get("result")?.get("status")?.get(name)
}

/// `idle_timeout.state`, e.g. `Idle`, `Ready` or `Printing`
pub fn idle_timeout_state(body: &Value) -> Option<String> {
    object(body, "idle_timeout")?
        .get("state")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Macro names from a `gcode_macros` object query
pub fn macro_names(body: &Value) -> Vec<String> {
    object(body, "gcode_macros")
        .and_then(Value::as_object)
        .map(|macros| macros.keys().cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "moonraker_tests.rs"]
mod tests;
