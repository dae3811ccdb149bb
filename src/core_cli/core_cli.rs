use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleftp", about = "List a directory on an FTP server.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Server host, overrides the configuration file
    #[arg(long)]
    pub host: Option<String>,

    /// Server port, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Login name, overrides the configuration file
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password, overrides the configuration file
    #[arg(long)]
    pub password: Option<String>,

    /// Directory to change into before listing
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Path given to LIST
    #[arg(default_value = ".")]
    pub path: String,

    /// Read the listing from the control channel instead of a PASV data channel
    #[arg(long)]
    pub active: bool,

    /// Skip listing lines that cannot be parsed instead of failing
    #[arg(long)]
    pub skip_malformed: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::parse_from([
            "rouilleftp",
            "--host",
            "ftp.example.org",
            "-p",
            "2121",
            "--dir",
            "/pub",
            "--skip-malformed",
            "incoming",
        ]);
        assert_eq!(cli.host.as_deref(), Some("ftp.example.org"));
        assert_eq!(cli.port, Some(2121));
        assert_eq!(cli.dir.as_deref(), Some("/pub"));
        assert_eq!(cli.path, "incoming");
        assert!(cli.skip_malformed);
        assert!(!cli.active);
        assert!(cli.config.is_empty());
    }
}
