use std::time::Duration;

use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use super::reply::{Reply, ReplyAssembler};
use crate::config::ClientConfig;
use crate::core_error::{FtpError, IoError, ProtocolError};

/// Reads complete replies off a control channel.
#[derive(Clone, Debug)]
pub struct ReplyReader {
    max_line_len: usize,
    max_lines: usize,
    timeout: Duration,
}

impl ReplyReader {
    pub fn new(max_line_len: usize, max_lines: usize, timeout: Duration) -> Self {
        Self {
            max_line_len,
            max_lines,
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.max_line_len,
            config.max_reply_lines,
            config.read_timeout(),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Reads one reply, giving up after the configured timeout.
    ///
    /// `stage` names what the caller was waiting for and ends up in the timeout
    /// error.
    pub async fn read_reply<R>(&self, src: &mut R, stage: &'static str) -> Result<Reply, FtpError>
    where
        R: AsyncBufRead + Unpin,
    {
        match tokio::time::timeout(self.timeout, self.read_untimed(src)).await {
            Ok(r) => r,
            Err(_) => Err(IoError::Timeout(stage).into()),
        }
    }

    async fn read_untimed<R>(&self, src: &mut R) -> Result<Reply, FtpError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::with_capacity(self.max_line_len);

        let first = self.read_line(src, &mut buf, "").await?;
        let mut assembler = ReplyAssembler::start(&first)?;
        while !assembler.is_final() {
            if assembler.line_count() >= self.max_lines {
                return Err(ProtocolError::MalformedReply(assembler.raw().to_string()).into());
            }
            let line = self.read_line(src, &mut buf, assembler.raw()).await?;
            assembler.feed_line(&line)?;
        }

        let reply = assembler.finish()?;
        for line in reply.raw().lines() {
            debug!("< {}", line);
        }
        Ok(reply)
    }

    /// Reads one LF terminated line, without the terminator.
    ///
    /// `received` is the reply text seen so far, attached to the error when the
    /// stream ends or the line runs past the length limit.
    async fn read_line<R>(
        &self,
        src: &mut R,
        buf: &mut Vec<u8>,
        received: &str,
    ) -> Result<String, FtpError>
    where
        R: AsyncBufRead + Unpin,
    {
        buf.clear();
        let mut limited = AsyncReadExt::take(&mut *src, self.max_line_len as u64);
        let n = limited
            .read_until(b'\n', buf)
            .await
            .map_err(IoError::ReadFailed)?;

        if n == 0 || buf.last() != Some(&b'\n') {
            // closed mid-reply, or the line does not fit
            let partial = String::from_utf8_lossy(&buf[..]);
            return Err(ProtocolError::MalformedReply(format!("{}{}", received, partial)).into());
        }

        let line = String::from_utf8_lossy(&buf[..]);
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
