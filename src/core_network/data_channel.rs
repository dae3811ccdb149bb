use std::time::Duration;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::pasv::PassiveAddress;
use crate::core_error::IoError;

/// A passive mode data connection, good for exactly one transfer.
///
/// Reading consumes the channel, so a drained channel can never be read again.
pub struct DataChannel<S> {
    stream: S,
    peer: PassiveAddress,
}

impl<S> DataChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: PassiveAddress) -> Self {
        Self { stream, peer }
    }

    pub fn peer(&self) -> PassiveAddress {
        self.peer
    }

    /// Reads until the server closes its side, each read bounded by `timeout`.
    pub async fn read_to_end(mut self, timeout: Duration) -> Result<Vec<u8>, IoError> {
        let mut data = Vec::new();
        let mut buffer = vec![0; 8192];
        loop {
            let bytes_read = tokio::time::timeout(timeout, self.stream.read(&mut buffer))
                .await
                .map_err(|_| IoError::Timeout("reading data channel"))?
                .map_err(IoError::ReadFailed)?;
            if bytes_read == 0 {
                break;
            }
            data.extend_from_slice(&buffer[..bytes_read]);
        }
        debug!("Read {} bytes from data channel {}", data.len(), self.peer);

        self.close().await;
        Ok(data)
    }

    /// Shuts the stream down. The peer may already be gone, which is fine here.
    pub async fn close(mut self) {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Data channel {} shutdown: {}", self.peer, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn peer() -> PassiveAddress {
        PassiveAddress::new(Ipv4Addr::LOCALHOST, 2121)
    }

    #[tokio::test]
    async fn test_read_until_peer_closes() {
        let (client, mut server) = tokio::io::duplex(16);
        let writer = tokio::spawn(async move {
            server.write_all(b"first line\r\nsecond line\r\n").await.unwrap();
        });

        let channel = DataChannel::new(client, peer());
        let data = channel.read_to_end(Duration::from_secs(5)).await.unwrap();
        writer.await.unwrap();
        assert_eq!(data, b"first line\r\nsecond line\r\n");
    }

    #[tokio::test]
    async fn test_stalled_transfer_times_out() {
        let (client, _server) = tokio::io::duplex(16);
        let channel = DataChannel::new(client, peer());
        match channel.read_to_end(Duration::from_millis(50)).await {
            Err(IoError::Timeout(stage)) => assert_eq!(stage, "reading data channel"),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
