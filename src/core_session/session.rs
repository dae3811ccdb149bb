use std::fmt;

use log::{debug, info, warn};
use tokio::io::{AsyncWriteExt, BufStream};

use super::state::SessionState;
use crate::config::ClientConfig;
use crate::constants::{
    ENTERING_PASSIVE_MODE, FILE_ACTION_OK, LOGGED_IN, MAX_DELAYED_GREETINGS, NOT_AVAILABLE,
    SERVICE_CLOSING, SERVICE_READY_IN_MINUTES,
};
use crate::core_error::{FtpError, IoError, ProtocolError, Result};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_listing::{parse_listing, DirectoryEntry};
use crate::core_network::{Connector, DataChannel, PassiveAddress};
use crate::core_reply::{Reply, ReplyReader};

#[derive(Clone)]
struct Credentials {
    username: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"****")
            .finish()
    }
}

/// An FTP control connection and the data channel it may have negotiated.
///
/// Every command is one write followed by the read of its reply; nothing is
/// pipelined. At most one data channel exists at a time: it is created by a
/// successful PASV and consumed by the next LIST, or dropped by
/// [`ControlSession::close_data_channel`].
///
/// # Example
/// ```no_run
/// use rouilleftp_client::{ClientConfig, ControlSession, TcpConnector};
///
/// # async fn run() -> rouilleftp_client::Result<()> {
/// let config = ClientConfig::default();
/// let connector = TcpConnector::new(config.connect_timeout());
/// let mut session = ControlSession::open(connector, config).await?;
/// session.enter_passive_mode().await?;
/// for entry in session.list_files(".").await? {
///     println!("{}", entry);
/// }
/// session.disconnect().await?;
/// session.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ControlSession<C: Connector> {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    config: ClientConfig,
    connector: C,
    reader: ReplyReader,
    control: BufStream<C::Stream>,
    data: Option<DataChannel<C::Stream>>,
    passive: bool,
    state: SessionState,
    messages: Vec<String>,
}

impl<C> ControlSession<C>
where
    C: Connector,
{
    /// Opens the control channel and waits for a positive greeting.
    pub async fn connect(
        mut connector: C,
        host: &str,
        port: u16,
        persistent: bool,
        config: ClientConfig,
    ) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        info!("Connecting to {}", addr);
        let stream = connector
            .open(host, port, persistent)
            .await
            .map_err(|source| FtpError::Connection { addr, source })?;

        let mut session = ControlSession {
            host: host.to_string(),
            port,
            credentials: None,
            reader: ReplyReader::from_config(&config),
            config,
            connector,
            control: BufStream::new(stream),
            data: None,
            passive: false,
            state: SessionState::Disconnected,
            messages: Vec::new(),
        };
        session.wait_greeting().await?;
        session.transition(SessionState::Connected);
        Ok(session)
    }

    /// Connects and logs in with the host and credentials from `config`.
    pub async fn open(connector: C, config: ClientConfig) -> Result<Self> {
        let host = config.host.clone();
        let username = config.username.clone();
        let password = config.password.clone();

        let mut session =
            Self::connect(connector, &host, config.port, config.persistent, config).await?;
        session.authenticate(&username, &password).await?;
        Ok(session)
    }

    async fn wait_greeting(&mut self) -> Result<()> {
        let mut delays = 0;
        loop {
            let reply = self.read_and_record("receiving greeting").await?;
            if reply.code() == SERVICE_READY_IN_MINUTES && delays < MAX_DELAYED_GREETINGS {
                delays += 1;
                info!("Server not ready yet: {}", reply.text());
                continue;
            }
            if reply.is_positive_completion() {
                info!("Connected to {}:{}: {}", self.host, self.port, reply.text());
                return Ok(());
            }
            return Err(ProtocolError::RejectedConnection {
                code: reply.code(),
                text: reply.text(),
            }
            .into());
        }
    }

    /// Sends USER, then PASS when the server asks for it.
    ///
    /// A rejected login leaves the session connected, so the caller may try again.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        if self.state != SessionState::Connected {
            return Err(FtpError::InvalidState {
                operation: "authenticate",
                state: self.state,
            });
        }

        let reply = self
            .command(FtpCommand::USER, Some(username), "sending username")
            .await?;
        if !reply.is_positive_completion() {
            if !reply.is_positive_intermediate() {
                return Err(authentication_error(&reply));
            }
            let reply = self
                .command(FtpCommand::PASS, Some(password), "sending password")
                .await?;
            if !reply.is_positive_completion() {
                return Err(authentication_error(&reply));
            }
            if reply.code() != LOGGED_IN {
                debug!("Login accepted with reply {}", reply.code());
            }
        }

        info!("Logged in as {}", username);
        self.credentials = Some(Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self.transition(SessionState::Authenticated);
        // nothing else to negotiate after login
        self.transition(SessionState::Ready);
        Ok(())
    }

    /// Negotiates a passive data channel and connects to it.
    ///
    /// Fails with [`FtpError::DataChannelBusy`] while a previous channel is still
    /// open. On any failure the session is left without a data channel.
    pub async fn enter_passive_mode(&mut self) -> Result<PassiveAddress> {
        self.require_logged_in("enter passive mode")?;
        if self.data.is_some() {
            return Err(FtpError::DataChannelBusy);
        }

        let channel = self.negotiate_data_channel().await?;
        let addr = channel.peer();
        self.data = Some(channel);
        self.passive = true;
        Ok(addr)
    }

    async fn negotiate_data_channel(&mut self) -> Result<DataChannel<C::Stream>> {
        let reply = self
            .command(FtpCommand::PASV, None, "entering passive mode")
            .await?;
        if reply.code() != ENTERING_PASSIVE_MODE {
            return Err(unexpected_reply(FtpCommand::PASV, &reply));
        }

        let addr = PassiveAddress::parse(&reply.text())?;
        let stream = self
            .connector
            .open(&addr.ip().to_string(), addr.port(), false)
            .await
            .map_err(|source| FtpError::Connection {
                addr: addr.to_string(),
                source,
            })?;
        info!("Data channel open to {}", addr);
        Ok(DataChannel::new(stream, addr))
    }

    /// Drops a negotiated data channel that will not be used.
    ///
    /// Returns whether there was one.
    pub async fn close_data_channel(&mut self) -> bool {
        match self.data.take() {
            Some(channel) => {
                channel.close().await;
                true
            }
            None => false,
        }
    }

    /// Sends CWD. `Ok(false)` means the server refused, with its reply in
    /// [`ControlSession::messages`].
    pub async fn change_directory(&mut self, path: &str) -> Result<bool> {
        self.require_logged_in("change directory")?;

        let reply = self
            .command(FtpCommand::CWD, Some(path), "changing directory")
            .await?;
        if reply.code() == FILE_ACTION_OK {
            Ok(true)
        } else {
            info!("CWD {} refused: {}", path, reply);
            Ok(false)
        }
    }

    /// Sends LIST and parses the listing.
    ///
    /// In passive mode the listing comes over the data channel, negotiating a new
    /// one first if the last one was already used. Otherwise it is read from the
    /// control channel reply.
    pub async fn list_files(&mut self, path: &str) -> Result<Vec<DirectoryEntry>> {
        self.require_logged_in("list files")?;

        let body = if self.passive {
            self.list_over_data_channel(path).await?
        } else {
            self.list_over_control(path).await?
        };

        let entries = parse_listing(&body, self.config.listing_policy)?;
        debug!("Listed {} entries in {}", entries.len(), path);
        Ok(entries)
    }

    async fn list_over_data_channel(&mut self, path: &str) -> Result<String> {
        // taken out of the session: it is consumed or dropped, never reused
        let channel = match self.data.take() {
            Some(channel) => channel,
            None => self.negotiate_data_channel().await?,
        };

        self.send_command(FtpCommand::LIST, Some(path)).await?;
        let reply = self.read_reply("waiting for transfer start").await?;
        if !reply.is_positive_preliminary() {
            self.record(&reply);
            return Err(unexpected_reply(FtpCommand::LIST, &reply));
        }

        let data = match channel.read_to_end(self.reader.timeout()).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Data channel transfer failed: {}", e);
                // the completion reply still has to be consumed before the next command
                if let Ok(reply) = self.read_reply("waiting for aborted transfer").await {
                    self.record(&reply);
                }
                return Err(e.into());
            }
        };
        let body = String::from_utf8_lossy(&data).into_owned();
        self.messages.push(body.clone());

        let reply = self.read_reply("waiting for transfer completion").await?;
        if !reply.is_positive_completion() {
            self.record(&reply);
            return Err(unexpected_reply(FtpCommand::LIST, &reply));
        }
        Ok(body)
    }

    async fn list_over_control(&mut self, path: &str) -> Result<String> {
        let mut reply = self
            .command(FtpCommand::LIST, Some(path), "listing over control channel")
            .await?;
        if reply.is_positive_preliminary() {
            reply = self.read_and_record("waiting for listing completion").await?;
        }
        if !reply.is_positive_completion() {
            return Err(unexpected_reply(FtpCommand::LIST, &reply));
        }

        let lines: Vec<&str> = reply
            .interior_lines()
            .iter()
            .map(|line| line.trim_start())
            .collect();
        Ok(lines.join("\n"))
    }

    /// Sends QUIT and reads the goodbye. The sockets stay open until
    /// [`ControlSession::close`].
    pub async fn disconnect(&mut self) -> Result<()> {
        if self.state == SessionState::Disconnected {
            return Err(FtpError::InvalidState {
                operation: "disconnect",
                state: self.state,
            });
        }

        let reply = self.command(FtpCommand::QUIT, None, "quitting").await?;
        if reply.code() != SERVICE_CLOSING {
            warn!("Unexpected reply to QUIT: {}", reply);
        }
        self.transition(SessionState::Disconnected);
        Ok(())
    }

    /// Tears the session down, closing the data channel if one is open and the
    /// control channel. A session that was not disconnected sends QUIT first.
    pub async fn close(mut self) {
        self.close_data_channel().await;

        if self.state != SessionState::Disconnected {
            if let Err(e) = self.disconnect().await {
                warn!("QUIT on teardown failed: {}", e);
            }
        }

        if let Err(e) = self.control.shutdown().await {
            debug!("Control channel shutdown: {}", e);
        }
        info!("Session to {}:{} closed", self.host, self.port);
    }

    /// Raw text of every reply observed, oldest first.
    ///
    /// A passive LIST contributes the listing itself, the transfer status
    /// replies around it are only logged.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_passive(&self) -> bool {
        self.passive
    }

    pub fn has_data_channel(&self) -> bool {
        self.data.is_some()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|c| c.username.as_str())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn require_logged_in(&self, operation: &'static str) -> Result<()> {
        if self.state.is_logged_in() {
            Ok(())
        } else {
            Err(FtpError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            "Session {}:{} {} -> {}",
            self.host, self.port, self.state, next
        );
        self.state = next;
    }

    async fn send_command(&mut self, cmd: FtpCommand, arg: Option<&str>) -> Result<()> {
        debug!("> {}", cmd.to_log_line(arg));
        let line = cmd.to_line(arg);
        self.control
            .write_all(line.as_bytes())
            .await
            .map_err(IoError::WriteFailed)?;
        self.control.flush().await.map_err(IoError::WriteFailed)?;
        Ok(())
    }

    /// A failed read leaves the control stream at an unknown position, the session
    /// drops to `Disconnected`.
    async fn read_reply(&mut self, stage: &'static str) -> Result<Reply> {
        let reply = match self.reader.read_reply(&mut self.control, stage).await {
            Ok(reply) => reply,
            Err(e) => {
                if self.state != SessionState::Disconnected {
                    warn!("Control channel out of sync after {}: {}", stage, e);
                    self.transition(SessionState::Disconnected);
                }
                return Err(e);
            }
        };
        if reply.code() == NOT_AVAILABLE {
            // the server closes the control connection after a 421
            warn!("Service not available: {}", reply.text());
            self.transition(SessionState::Disconnected);
        }
        Ok(reply)
    }

    fn record(&mut self, reply: &Reply) {
        self.messages.push(reply.raw().to_string());
    }

    async fn read_and_record(&mut self, stage: &'static str) -> Result<Reply> {
        let reply = self.read_reply(stage).await?;
        self.record(&reply);
        Ok(reply)
    }

    async fn command(
        &mut self,
        cmd: FtpCommand,
        arg: Option<&str>,
        stage: &'static str,
    ) -> Result<Reply> {
        self.send_command(cmd, arg).await?;
        self.read_and_record(stage).await
    }
}

impl<C> fmt::Debug for ControlSession<C>
where
    C: Connector,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSession")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credentials", &self.credentials)
            .field("state", &self.state)
            .field("passive", &self.passive)
            .field("data_channel", &self.data.as_ref().map(|c| c.peer()))
            .field("messages", &self.messages.len())
            .finish()
    }
}

fn authentication_error(reply: &Reply) -> FtpError {
    FtpError::Authentication {
        code: reply.code(),
        text: reply.text(),
    }
}

fn unexpected_reply(command: FtpCommand, reply: &Reply) -> FtpError {
    ProtocolError::UnexpectedReply {
        command,
        code: reply.code(),
        text: reply.text(),
    }
    .into()
}
