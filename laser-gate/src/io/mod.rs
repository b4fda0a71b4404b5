//! Defines the transports carrying remote control requests to the poll loop.

use std::fmt::{Debug, Display};

pub use transports::*;

use crate::control::{ApiRequest, ApiResponse};
use crate::errors::Error;

mod transports;

/// Defines the trait all control transports must implement.
///
/// A transport is polled by the loop: [`Transport::accept`] must never wait for a client to show
/// up. Each accepted exchange is a single request answered by a single response, after which the
/// peer is dropped.
#[allow(async_fn_in_trait)]
pub trait Transport: Debug + Display {
    /// The handle on an accepted client, consumed by the response.
    type Peer;

    /// Starts listening for clients.
    async fn open(&mut self) -> Result<(), Error>;

    /// Stops listening: pending clients are dropped.
    fn close(&mut self) -> Result<(), Error>;

    /// Checks if the transport is listening.
    fn is_open(&self) -> bool;

    /// Returns the address clients should use, as reported in status snapshots.
    fn network_address(&self) -> String;

    /// Accepts one pending client, if any, and reads its request.
    ///
    /// # Notes
    /// Returns `Ok(None)` right away when no client is pending. Reading the request itself may wait
    /// up to the transport timeout.
    async fn accept(&mut self) -> Result<Option<(Self::Peer, ApiRequest)>, Error>;

    /// Sends the response to the given client and closes the exchange.
    async fn respond(&mut self, peer: Self::Peer, response: &ApiResponse) -> Result<(), Error>;
}
