//! HTTP client for the hub API.
//!
//! [`HubApi`] is the seam between the application and the network. The
//! production implementation, [`HubClient`], issues blocking `ureq` requests
//! and is only ever called from runtime worker threads. Tests substitute an
//! in-memory hub.

pub mod sse;

use crate::model::{HubError, SessionBody, SessionId, SessionInfo, SessionList};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{BufRead, BufReader};
use std::time::Duration;

/// Default hub host.
pub const DEFAULT_HUB_IP: &str = "localhost";
/// Default hub port.
pub const DEFAULT_HUB_PORT: u16 = 3002;

const EVENTS_PATH: &str = "/api/events";
const SESSIONS_PATH: &str = "/api/sessions";
const SEND_MESSAGE_PATH: &str = "/api/agent/send-message";
const STOP_PATH: &str = "/api/control/stop";
const HEALTH_PATH: &str = "/api/health";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the hub listens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubAddress {
    /// Host name or IP.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl HubAddress {
    /// Create an address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a port typed by the operator, falling back to the default.
    pub fn parse_port(raw: &str) -> u16 {
        raw.trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .unwrap_or(DEFAULT_HUB_PORT)
    }

    /// `http://host:port`
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for HubAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HUB_IP, DEFAULT_HUB_PORT)
    }
}

impl fmt::Display for HubAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Open SSE stream, read line by line.
pub type EventStream = Box<dyn BufRead + Send>;

/// Operations the monitor needs from the hub.
///
/// All methods block; callers run them off the UI thread.
pub trait HubApi: Send + Sync {
    /// `GET /api/sessions`
    fn list_sessions(&self) -> Result<Vec<SessionInfo>, HubError>;

    /// `GET /api/sessions/{id}`, returning the raw NDJSON content.
    fn session_content(&self, id: &SessionId) -> Result<String, HubError>;

    /// `POST /api/agent/send-message`
    fn send_message(&self, message: &str) -> Result<(), HubError>;

    /// `POST /api/control/stop`
    fn emergency_stop(&self) -> Result<(), HubError>;

    /// `GET /api/health`
    fn health(&self) -> Result<(), HubError>;

    /// Open `GET /api/events`.
    fn open_events(&self) -> Result<EventStream, HubError>;
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// `ureq`-backed [`HubApi`].
#[derive(Debug, Clone)]
pub struct HubClient {
    address: HubAddress,
    agent: ureq::Agent,
    stream_agent: ureq::Agent,
}

impl HubClient {
    /// Create a client for `address`.
    pub fn new(address: HubAddress) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        // The event stream stays open indefinitely; only bound the connect.
        let stream_agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            address,
            agent,
            stream_agent,
        }
    }

    /// Address this client talks to.
    pub fn address(&self) -> &HubAddress {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address.base_url(), path)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, HubError> {
        let mut response = self
            .agent
            .get(&self.url(path))
            .call()
            .map_err(|e| transport(path, e))?;
        expect_status(path, &mut response, |status| (200..300).contains(&status))?;
        response
            .body_mut()
            .read_json::<T>()
            .map_err(|e| HubError::Decode {
                endpoint: path.to_string(),
                message: e.to_string(),
            })
    }
}

fn transport(endpoint: &str, error: ureq::Error) -> HubError {
    HubError::Transport {
        endpoint: endpoint.to_string(),
        message: error.to_string(),
    }
}

fn expect_status(
    endpoint: &str,
    response: &mut ureq::http::Response<ureq::Body>,
    accept: impl Fn(u16) -> bool,
) -> Result<(), HubError> {
    let status = response.status().as_u16();
    if accept(status) {
        return Ok(());
    }
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Err(HubError::Rejected {
        endpoint: endpoint.to_string(),
        status,
        message: error_text(&body),
    })
}

/// Server error text: the JSON `error` field when present, else the raw body.
pub fn error_text(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}

impl HubApi for HubClient {
    fn list_sessions(&self) -> Result<Vec<SessionInfo>, HubError> {
        let list: SessionList = self.get_json(SESSIONS_PATH)?;
        Ok(list.sessions)
    }

    fn session_content(&self, id: &SessionId) -> Result<String, HubError> {
        let path = format!("{SESSIONS_PATH}/{id}");
        let body: SessionBody = self.get_json(&path)?;
        Ok(body.content)
    }

    fn send_message(&self, message: &str) -> Result<(), HubError> {
        let mut response = self
            .agent
            .post(&self.url(SEND_MESSAGE_PATH))
            .send_json(SendMessageBody { message })
            .map_err(|e| transport(SEND_MESSAGE_PATH, e))?;
        expect_status(SEND_MESSAGE_PATH, &mut response, |status| status == 200)
    }

    fn emergency_stop(&self) -> Result<(), HubError> {
        let mut response = self
            .agent
            .post(&self.url(STOP_PATH))
            .send_empty()
            .map_err(|e| transport(STOP_PATH, e))?;
        expect_status(STOP_PATH, &mut response, |status| status == 200)
    }

    fn health(&self) -> Result<(), HubError> {
        let mut response = self
            .agent
            .get(&self.url(HEALTH_PATH))
            .call()
            .map_err(|e| transport(HEALTH_PATH, e))?;
        expect_status(HEALTH_PATH, &mut response, |status| status == 200)
    }

    fn open_events(&self) -> Result<EventStream, HubError> {
        let mut response = self
            .stream_agent
            .get(&self.url(EVENTS_PATH))
            .header("Accept", "text/event-stream")
            .call()
            .map_err(|e| transport(EVENTS_PATH, e))?;
        expect_status(EVENTS_PATH, &mut response, |status| status == 200)?;
        let reader = response.into_body().into_reader();
        Ok(Box::new(BufReader::new(reader)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_uses_host_and_port() {
        let address = HubAddress::new("10.0.0.5", 4000);
        assert_eq!(address.base_url(), "http://10.0.0.5:4000");
        assert_eq!(address.to_string(), "10.0.0.5:4000");
    }

    #[test]
    fn default_address_is_localhost_3002() {
        assert_eq!(HubAddress::default().base_url(), "http://localhost:3002");
    }

    #[test]
    fn invalid_port_falls_back_to_default() {
        assert_eq!(HubAddress::parse_port("8080"), 8080);
        assert_eq!(HubAddress::parse_port(" 8080 "), 8080);
        assert_eq!(HubAddress::parse_port("abc"), DEFAULT_HUB_PORT);
        assert_eq!(HubAddress::parse_port("70000"), DEFAULT_HUB_PORT);
        assert_eq!(HubAddress::parse_port("0"), DEFAULT_HUB_PORT);
    }

    #[test]
    fn error_text_prefers_json_error_field() {
        assert_eq!(error_text(r#"{"error":"agent busy"}"#), "agent busy");
        assert_eq!(error_text("plain failure\n"), "plain failure");
        assert_eq!(error_text(r#"{"status":"bad"}"#), r#"{"status":"bad"}"#);
    }

    #[test]
    fn client_url_joins_base_and_path() {
        let client = HubClient::new(HubAddress::new("hub", 1));
        assert_eq!(client.url(HEALTH_PATH), "http://hub:1/api/health");
    }
}
