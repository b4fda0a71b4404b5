//! Defines the cooperative scheduler driving the gate.

pub use crate::runtime::poll_loop::{PollLoop, Step};

mod poll_loop;
