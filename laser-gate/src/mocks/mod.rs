//! Mocked collaborators: in-memory hardware and a scripted control transport.

pub mod hardware;
pub mod transport;
