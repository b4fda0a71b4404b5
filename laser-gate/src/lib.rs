#![doc(html_root_url = "https://docs.rs/laser-gate/0.1.0")]

//! <h1 align="center">LASER-GATE - A laser tripwire intrusion detector</h1>
//! <div style="text-align:center;font-style:italic;">Laser-Gate drives a laser beam, a light sensor, a touch pad and a buzzer as a small security gate - written in Rust.</div>
//!
//! # Features
//!
//! A laser beam shines on a light sensor (LDR). While the gate is armed, every time the beam gets
//! blocked an intrusion is counted and the buzzer sounds for as long as the beam stays blocked.
//!
//! - Calibrate a detection threshold from the clear-beam light level ([`Calibrator`](detection::Calibrator))
//! - Count intrusions on the light→dark edges ([`IntrusionDetector`](detection::IntrusionDetector))
//! - Arm/disarm with a touch pad ([`TouchToggle`](detection::TouchToggle))
//! - Remote control through a small JSON API ([`ControlService`](control::ControlService) over [`HttpTransport`](io::HttpTransport))
//! - Everything runs in a single, cooperative [`PollLoop`](runtime::PollLoop)
//!
//! The controller talks to the physical board through the pin-level [`Hardware`](hardware::Hardware)
//! trait: a mocked implementation is available with the `mocks` feature.
//!
//! # Getting Started
//!
//! - Add the following to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! laser-gate = "0.1.0"
//! ```
//!
//! - Implement [`Hardware`](hardware::Hardware) for your board and run the loop:
//! ```ignore
//! use laser_gate::config::GateConfig;
//! use laser_gate::hardware::Board;
//! use laser_gate::io::HttpTransport;
//! use laser_gate::runtime::PollLoop;
//!
//! #[laser_gate::runtime]
//! async fn main() -> Result<(), laser_gate::errors::Error> {
//!     let config = GateConfig::from_file("gate.json")?;
//!     let board = Board::new(MyBoard::default()).open()?;
//!     let transport = HttpTransport::new(&config);
//!     PollLoop::new(&board, config, transport)?.run().await
//! }
//! ```
//!
//! # Feature flags
//!
//! - **mocks** -- Provides mocked hardware and transport (useful for tests and demos).

#[cfg(test)]
extern crate self as laser_gate;

pub mod config;
pub mod control;
pub mod detection;
pub mod devices;
pub mod errors;
pub mod hardware;
pub mod io;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod runtime;
pub mod utils;

pub use laser_gate_macros::runtime;
