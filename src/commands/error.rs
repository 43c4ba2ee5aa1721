//! Command failures.
//!
//! None of these ever reach the transport as an error: the handler turns each
//! one into a `-ERR <message>` reply and the connection stays open.

use crate::protocol::{ParseError, RespValue};
use crate::storage::{LifecycleState, PersistenceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// The request frame could not be decoded
    #[error("{0}")]
    Protocol(#[from] ParseError),

    /// The frame decoded but is not an array of string arguments
    #[error("{0}")]
    InvalidRequest(&'static str),

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),

    /// Commands are only served while running
    #[error("server is {0}")]
    NotRunning(LifecycleState),

    #[error("{0}")]
    Persistence(#[from] PersistenceError),
}

impl CommandError {
    /// The reply sent to the client for this failure.
    pub fn to_resp(&self) -> RespValue {
        RespValue::error(format!("ERR {}", self))
    }
}
