//! Defines the remote control surface: the operations a client may request and their results.

pub use crate::control::api::{ApiRequest, ApiResponse, StatusSnapshot};
pub use crate::control::service::ControlService;

mod api;
mod service;
