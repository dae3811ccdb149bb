//! A small FTP client: control connection, login, passive data channels and
//! Unix style directory listings.
//!
//! ```no_run
//! use rouilleftp_client::{ClientConfig, ControlSession, TcpConnector};
//!
//! #[tokio::main]
//! async fn main() -> rouilleftp_client::Result<()> {
//!     let config = ClientConfig {
//!         host: "ftp.example.org".to_string(),
//!         ..ClientConfig::default()
//!     };
//!     let connector = TcpConnector::new(config.connect_timeout());
//!     let mut session = ControlSession::open(connector, config).await?;
//!
//!     session.enter_passive_mode().await?;
//!     let entries = session.list_files("/pub").await?;
//!     println!("{} entries", entries.len());
//!
//!     session.disconnect().await?;
//!     session.close().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_listing;
pub mod core_network;
pub mod core_reply;
pub mod core_session;

pub use config::ClientConfig;
pub use core_error::{FtpError, IoError, ProtocolError, Result};
pub use core_listing::{parse_line, parse_listing, DirectoryEntry, EntryType, ListingPolicy};
pub use core_network::{Connector, DataChannel, PassiveAddress, TcpConnector};
pub use core_reply::{Reply, ReplyAssembler, ReplyReader};
pub use core_session::{ControlSession, SessionState};
