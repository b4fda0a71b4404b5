use log::error;
use snafu::Snafu;

pub use crate::errors::Error::*;
use crate::errors::TransportError::{IoException, Timeout};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Hardware error: {source}.
    HardwareError { source: HardwareError },
    /// Transport error: {source}.
    TransportError { source: TransportError },
    /// Detection error: {source}.
    DetectionError { source: DetectionError },
    /// Unknown error: {info}.
    Unknown { info: String },
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        error!("std::io error {:?}", error);
        let info = match error.kind() {
            std::io::ErrorKind::AddrInUse => String::from("Address already in use"),
            std::io::ErrorKind::ConnectionReset => String::from("Connection reset by client"),
            std::io::ErrorKind::BrokenPipe => String::from("Connection closed by client"),
            _ => error.to_string(),
        };
        Self::TransportError {
            source: IoException { info },
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::TransportError { source: Timeout }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unknown {
            info: value.to_string(),
        }
    }
}

impl From<HardwareError> for Error {
    fn from(value: HardwareError) -> Self {
        Self::HardwareError { source: value }
    }
}

impl From<TransportError> for Error {
    fn from(value: TransportError) -> Self {
        Self::TransportError { source: value }
    }
}

impl From<DetectionError> for Error {
    fn from(value: DetectionError) -> Self {
        Self::DetectionError { source: value }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HardwareError {
    /// Unknown pin {pin}
    UnknownPin { pin: u8 },
    /// Pin ({pin}) could not be read - {context}
    ReadFailure { pin: u8, context: &'static str },
    /// Pin ({pin}) could not be written - {context}
    WriteFailure { pin: u8, context: &'static str },
    /// Hardware is not connected
    NotConnected,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    /// {info}
    IoException { info: String },
    /// Transport has not been opened
    NotInitialized,
    /// Client did not send its request in time
    Timeout,
    /// Malformed request received
    MalformedRequest,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DetectionError {
    /// No light sample could be read ({expected} expected)
    NoSamples { expected: usize },
}

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::HardwareError::{ReadFailure, UnknownPin};

    use super::*;

    #[test]
    fn test_error_display() {
        let transport_error = Error::from(IoException {
            info: "I/O error message".to_string(),
        });
        assert_eq!(
            format!("{}", transport_error),
            "Transport error: I/O error message."
        );

        let hardware_error = Error::from(ReadFailure {
            pin: 34,
            context: "test context",
        });
        assert_eq!(
            format!("{}", hardware_error),
            "Hardware error: Pin (34) could not be read - test context."
        );

        let detection_error = Error::from(DetectionError::NoSamples { expected: 10 });
        assert_eq!(
            format!("{}", detection_error),
            "Detection error: No light sample could be read (10 expected)."
        );

        let unknown_error = Unknown {
            info: "Some unknown error".to_string(),
        };
        assert_eq!(
            format!("{}", unknown_error),
            "Unknown error: Some unknown error."
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::AddrInUse, "address in use");
        let error: Error = io_error.into();
        assert_eq!(
            format!("{}", error),
            "Transport error: Address already in use."
        );

        let io_error = io::Error::new(io::ErrorKind::Other, "something else");
        let error: Error = io_error.into();
        assert_eq!(format!("{}", error), "Transport error: something else.");
    }

    #[test]
    fn test_from_transport_error() {
        let error: Error = TransportError::NotInitialized.into();
        assert_eq!(
            format!("{}", error),
            "Transport error: Transport has not been opened."
        );
    }

    #[test]
    fn test_from_hardware_error() {
        let error: Error = UnknownPin { pin: 42 }.into();
        assert_eq!(format!("{}", error), "Hardware error: Unknown pin 42.");
    }

    #[test]
    fn test_from_serde_error() {
        let serde_error = serde_json::from_str::<u8>("nope").unwrap_err();
        let error: Error = serde_error.into();
        assert!(format!("{}", error).starts_with("Unknown error: "));
    }
}
