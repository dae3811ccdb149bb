// src/constants.rs

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 21;
pub const DEFAULT_USERNAME: &str = "anonymous";
pub const DEFAULT_PASSWORD: &str = "test@example.com";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_MAX_LINE_LEN: usize = 2048;
pub const DEFAULT_MAX_REPLY_LINES: usize = 1024;
pub const MAX_DELAYED_GREETINGS: usize = 8; // 120 replies accepted before the greeting

/* Reply codes the client branches on (RFC 959 section 4.2) */

pub const SERVICE_READY_IN_MINUTES: u16 = 120;
pub const SERVICE_CLOSING: u16 = 221;
pub const ENTERING_PASSIVE_MODE: u16 = 227;
pub const LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const NOT_AVAILABLE: u16 = 421;
