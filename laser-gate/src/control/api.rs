use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::errors::Error;

/// A read-only view of the gate, as reported to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    #[serde(rename = "system_active")]
    pub armed: bool,
    pub intrusion_count: u32,
    #[serde(rename = "current_ldr")]
    pub current_light: u16,
    pub threshold: u16,
    pub is_dark: bool,
    #[serde(rename = "ip_address")]
    pub network_address: String,
}

/// The operations a client may request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiRequest {
    GetStatus,
    Toggle,
    Reset,
    Calibrate,
    /// Anything else (the raw route is kept for logging).
    Unknown(String),
}

impl ApiRequest {
    /// Routes a `METHOD /path` pair. The query string, if any, is ignored.
    pub fn route(method: &str, path: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        match (method, path) {
            ("GET", "/api/status") => ApiRequest::GetStatus,
            ("POST", "/api/toggle") => ApiRequest::Toggle,
            ("POST", "/api/reset") => ApiRequest::Reset,
            ("POST", "/api/calibrate") => ApiRequest::Calibrate,
            _ => ApiRequest::Unknown(format!("{} {}", method, path)),
        }
    }
}

impl Display for ApiRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiRequest::GetStatus => write!(f, "GET /api/status"),
            ApiRequest::Toggle => write!(f, "POST /api/toggle"),
            ApiRequest::Reset => write!(f, "POST /api/reset"),
            ApiRequest::Calibrate => write!(f, "POST /api/calibrate"),
            ApiRequest::Unknown(route) => write!(f, "{}", route),
        }
    }
}

/// The result of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Status(StatusSnapshot),
    Armed { system_active: bool },
    Count { intrusion_count: u32 },
    Threshold { threshold: u16 },
    NotFound,
    Error { error: String },
}

impl ApiResponse {
    /// Returns the JSON body of the response, none for [`ApiResponse::NotFound`].
    pub fn to_json(&self) -> Result<Option<String>, Error> {
        match self {
            ApiResponse::NotFound => Ok(None),
            response => Ok(Some(serde_json::to_string(response)?)),
        }
    }
}

impl From<Error> for ApiResponse {
    fn from(error: Error) -> Self {
        ApiResponse::Error {
            error: error.to_string(),
        }
    }
}
