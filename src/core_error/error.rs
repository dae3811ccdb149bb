use std::io;

use thiserror::Error;

use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_session::state::SessionState;

/// Failures on an already open channel.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    #[error("timed out while {0}")]
    Timeout(&'static str),
}

/// The server said something that does not follow the protocol grammar.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed reply: {0:?}")]
    MalformedReply(String),

    #[error("malformed passive mode reply: {0:?}")]
    MalformedPassiveReply(String),

    #[error("malformed listing line {line_no}: {line:?}")]
    MalformedListingLine { line_no: usize, line: String },

    #[error("connection rejected by server: {code} {text}")]
    RejectedConnection { code: u16, text: String },

    #[error("unexpected reply to {command}: {code} {text}")]
    UnexpectedReply {
        command: FtpCommand,
        code: u16,
        text: String,
    },
}

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("authentication failed: {code} {text}")]
    Authentication { code: u16, text: String },

    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("a data channel is already open, drain or close it first")]
    DataChannelBusy,
}

impl FtpError {
    /// Read timeouts are reported to the caller, who owns any retry policy.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FtpError::Io(IoError::Timeout(_)))
    }
}

/// Generic Result type defaults to Result<T, FtpError>
pub type Result<T> = std::result::Result<T, FtpError>;
