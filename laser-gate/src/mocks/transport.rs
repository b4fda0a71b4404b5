use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::control::{ApiRequest, ApiResponse};
use crate::errors::Error;
use crate::errors::TransportError::{IoException, NotInitialized};
use crate::io::Transport;

/// A scripted client event.
#[derive(Clone, Debug)]
enum MockClient {
    Request(ApiRequest),
    /// The client connects but the exchange fails (reset, timeout...).
    Fault,
}

/// Inner data of the [`MockTransport`], shared by all its clones.
#[derive(Clone, Debug, Default)]
pub struct MockTransportData {
    opened: bool,
    closed: usize,
    clients: VecDeque<MockClient>,
    responses: Vec<(ApiRequest, ApiResponse)>,
}

/// Mock implementation of [`Transport`]: clients are queued by the test, one per accept, and the
/// responses are recorded along with their request.
#[derive(Clone, Debug)]
pub struct MockTransport {
    pub address: String,
    pub data: Arc<RwLock<MockTransportData>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self {
            address: String::from("192.168.4.1"),
            data: Arc::new(RwLock::new(MockTransportData::default())),
        }
    }
}

impl MockTransport {
    /// Queues a client sending the given request.
    pub fn push_request(&self, request: ApiRequest) {
        self.data.write().clients.push_back(MockClient::Request(request));
    }

    /// Queues a client whose exchange fails.
    pub fn push_fault(&self) {
        self.data.write().clients.push_back(MockClient::Fault);
    }

    /// Returns the number of clients not accepted yet.
    pub fn pending(&self) -> usize {
        self.data.read().clients.len()
    }

    /// Returns the responses sent so far, along with the request they answer.
    pub fn get_responses(&self) -> Vec<(ApiRequest, ApiResponse)> {
        self.data.read().responses.clone()
    }

    /// Returns how many times the transport has been closed.
    pub fn get_close_count(&self) -> usize {
        self.data.read().closed
    }
}

impl Display for MockTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let data = self.data.read();
        write!(
            f,
            "MockTransport({}) [opened={}, pending={}]",
            self.address,
            data.opened,
            data.clients.len()
        )
    }
}

impl Transport for MockTransport {
    type Peer = ApiRequest;

    async fn open(&mut self) -> Result<(), Error> {
        self.data.write().opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        let mut lock = self.data.write();
        lock.opened = false;
        lock.closed += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.data.read().opened
    }

    fn network_address(&self) -> String {
        self.address.clone()
    }

    async fn accept(&mut self) -> Result<Option<(ApiRequest, ApiRequest)>, Error> {
        let mut lock = self.data.write();
        if !lock.opened {
            return Err(NotInitialized.into());
        }
        match lock.clients.pop_front() {
            None => Ok(None),
            Some(MockClient::Request(request)) => Ok(Some((request.clone(), request))),
            Some(MockClient::Fault) => Err(IoException {
                info: String::from("Connection reset by client"),
            }
            .into()),
        }
    }

    async fn respond(&mut self, peer: ApiRequest, response: &ApiResponse) -> Result<(), Error> {
        self.data.write().responses.push((peer, response.clone()));
        Ok(())
    }
}
