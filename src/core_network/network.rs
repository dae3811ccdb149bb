use std::io;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpSocket, TcpStream};

/// Opens the byte streams a session talks over.
///
/// The control channel and every passive data channel go through the same
/// connector, so tests and alternative transports only need to provide this.
#[async_trait]
pub trait Connector: Send {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    /// `persistent` asks for a long lived connection. Connectors that cannot
    /// honour it open a plain one.
    async fn open(&mut self, host: &str, port: u16, persistent: bool) -> io::Result<Self::Stream>;
}

/// Plain TCP connector. Persistent connections get TCP keep-alive.
#[derive(Clone, Debug)]
pub struct TcpConnector {
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn open(&mut self, host: &str, port: u16, persistent: bool) -> io::Result<TcpStream> {
        let mut last_err = None;

        for addr in tokio::net::lookup_host((host, port)).await? {
            let socket = if addr.is_ipv4() {
                TcpSocket::new_v4()?
            } else {
                TcpSocket::new_v6()?
            };
            socket.set_keepalive(persistent)?;

            match tokio::time::timeout(self.connect_timeout, socket.connect(addr)).await {
                Ok(Ok(stream)) => {
                    stream.set_nodelay(true)?;
                    debug!("Connected to {} (persistent: {})", addr, persistent);
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    debug!("Failed to connect to {}: {}", addr, e);
                    last_err = Some(e);
                }
                Err(_) => {
                    debug!("Timed out connecting to {}", addr);
                    last_err = Some(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("timed out connecting to {}", addr),
                    ));
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no address found for {}", host),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_tcp_connector_opens_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 ready\r\n").await.unwrap();
        });

        let mut connector = TcpConnector::new(Duration::from_secs(5));
        let mut stream = connector.open("127.0.0.1", port, true).await.unwrap();
        let mut greeting = String::new();
        stream.read_to_string(&mut greeting).await.unwrap();
        server.await.unwrap();
        assert_eq!(greeting, "220 ready\r\n");
    }
}
