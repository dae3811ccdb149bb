mod core_cli;

use crate::core_cli::Cli;
use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use env_logger::{Builder, Env};
use log::{info, warn};
use rouilleftp_client::{ClientConfig, ControlSession, DirectoryEntry, ListingPolicy, TcpConnector};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let config = load_config(&args)?;
    info!("Using configuration: {:?}", config);

    let connector = TcpConnector::new(config.connect_timeout());
    let addr = format!("{}:{}", config.host, config.port);
    let mut session = ControlSession::open(connector, config)
        .await
        .with_context(|| format!("Failed to open session with {}", addr))?;

    let result = list_directory(&mut session, &args).await;
    if result.is_ok() {
        session
            .disconnect()
            .await
            .context("Failed to disconnect")?;
    }

    if args.verbose {
        for (i, message) in session.messages().iter().enumerate() {
            println!("{} {}", format!("[{}]", i).dimmed(), message.trim_end());
        }
    }
    session.close().await;

    for entry in result? {
        print_entry(&entry);
    }
    Ok(())
}

/// Starts from the configuration file, if any, then applies command line overrides.
fn load_config(args: &Cli) -> Result<ClientConfig> {
    let mut config = if args.config.is_empty() {
        ClientConfig::default()
    } else {
        ClientConfig::load_from_file(&args.config)?
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(user) = &args.user {
        config.username = user.clone();
    }
    if let Some(password) = &args.password {
        config.password = password.clone();
    }
    if args.active {
        config.passive = false;
    }
    if args.skip_malformed {
        config.listing_policy = ListingPolicy::SkipMalformed;
    }
    Ok(config)
}

async fn list_directory(
    session: &mut ControlSession<TcpConnector>,
    args: &Cli,
) -> Result<Vec<DirectoryEntry>> {
    if let Some(dir) = &args.dir {
        if !session.change_directory(dir).await? {
            warn!("Could not change directory to {}, listing from the current one", dir);
        }
    }

    if session.config().passive {
        let addr = session
            .enter_passive_mode()
            .await
            .context("Failed to enter passive mode")?;
        info!("Passive data channel: {}", addr);
    }

    let entries = session
        .list_files(&args.path)
        .await
        .with_context(|| format!("Failed to list {}", args.path))?;
    Ok(entries)
}

fn print_entry(entry: &DirectoryEntry) {
    if entry.is_dir() {
        println!("{}", entry.to_string().blue().bold());
    } else if entry.link_target().is_some() {
        println!("{}", entry.to_string().cyan());
    } else {
        println!("{}", entry);
    }
}
