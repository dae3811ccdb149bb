// Error types shared by the reply reader, the parsers and the session

pub mod error;

pub use error::{FtpError, IoError, ProtocolError, Result};
