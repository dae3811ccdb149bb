use std::fmt;

/// Commands the client puts on the control channel.
#[derive(Clone, Copy, Eq, Hash, PartialEq, Debug)]
pub enum FtpCommand {
    USER,
    PASS,
    PASV,
    CWD,
    LIST,
    QUIT,
}

impl FtpCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::PASV => "PASV",
            FtpCommand::CWD => "CWD",
            FtpCommand::LIST => "LIST",
            FtpCommand::QUIT => "QUIT",
        }
    }

    /// Builds the wire line, CRLF included.
    pub fn to_line(&self, arg: Option<&str>) -> String {
        match arg {
            Some(arg) => format!("{} {}\r\n", self.as_str(), arg),
            None => format!("{}\r\n", self.as_str()),
        }
    }

    /// Same as [`FtpCommand::to_line`] but with secrets masked, for logging.
    pub fn to_log_line(&self, arg: Option<&str>) -> String {
        match (self, arg) {
            (FtpCommand::PASS, Some(_)) => format!("{} ****", self.as_str()),
            (_, Some(arg)) => format!("{} {}", self.as_str(), arg),
            (_, None) => self.as_str().to_string(),
        }
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_lines() {
        assert_eq!(FtpCommand::PASV.to_line(None), "PASV\r\n");
        assert_eq!(FtpCommand::CWD.to_line(Some("/pub")), "CWD /pub\r\n");
        assert_eq!(FtpCommand::LIST.to_line(Some(".")), "LIST .\r\n");
    }

    #[test]
    fn test_password_is_masked() {
        assert_eq!(FtpCommand::PASS.to_log_line(Some("secret")), "PASS ****");
        assert_eq!(FtpCommand::USER.to_log_line(Some("demo")), "USER demo");
        assert_eq!(FtpCommand::QUIT.to_log_line(None), "QUIT");
    }
}
