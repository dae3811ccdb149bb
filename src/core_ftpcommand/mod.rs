// Here's the list of the FTP commands the client sends
pub mod ftpcommand;

pub use ftpcommand::FtpCommand;
