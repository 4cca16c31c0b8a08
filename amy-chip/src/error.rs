//! Error types for the bus, transport and startup layers.
//!
//! None of these ever escape the pipeline loop: the coordinator and the codec
//! drivers log them and carry on, because the loop is the outermost context of
//! the firmware and has nobody to report to.

use embedded_hal::i2c::{self, ErrorKind};
use thiserror::Error;

/// A register write that did not complete on the two-wire bus.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BusError<E> {
    /// The transaction timed out or lost arbitration.
    #[error("bus is busy")]
    Busy,
    /// The addressed device did not acknowledge.
    #[error("no acknowledge from device")]
    Nack,
    /// Any other HAL failure.
    #[error("write failed: {0:?}")]
    Other(E),
}

impl<E: i2c::Error> BusError<E> {
    /// Sort a HAL error into the three outcomes the drivers log.
    pub fn classify(err: E) -> Self {
        match err.kind() {
            ErrorKind::Bus | ErrorKind::ArbitrationLoss => BusError::Busy,
            ErrorKind::NoAcknowledge(_) => BusError::Nack,
            _ => BusError::Other(err),
        }
    }
}

/// A failed block transfer on the audio transport.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError<E> {
    /// The transfer did not finish before its deadline.
    #[error("transfer timed out")]
    Timeout,
    /// The underlying channel reported an error.
    #[error("channel error: {0:?}")]
    Channel(E),
}

/// The remote render stage is already driven by another coordinator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("remote render stage already has a coordinator")]
pub struct RemoteClaimed;

/// A startup step that reported failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("startup step `{step}` failed")]
pub struct InitError {
    pub step: &'static str,
}
