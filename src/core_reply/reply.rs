use std::fmt;

use crate::core_error::ProtocolError;

/// One complete server reply.
///
/// `lines` holds the text of every line with the `<code><sep>` prefix removed from
/// the opening and closing lines. Interior lines of a multi-line reply are kept
/// verbatim. `raw` is the reply as received, each line terminated by CRLF.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reply {
    code: u16,
    lines: Vec<String>,
    multiline: bool,
    raw: String,
}

impl Reply {
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Lines between the opening and the closing line of a multi-line reply.
    pub fn interior_lines(&self) -> &[String] {
        if self.multiline && self.lines.len() > 2 {
            &self.lines[1..self.lines.len() - 1]
        } else {
            &[]
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_positive_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_positive_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }

    pub fn is_transient_negative(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_negative(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text())
    }
}

/// Assembles reply lines into a [`Reply`].
///
/// A reply opened with `<code> ` is final on its first line. One opened with
/// `<code>-` only becomes final on a line starting with the same code followed by
/// a space; anything else in between, other codes included, is body text.
#[derive(Debug)]
pub struct ReplyAssembler {
    code: u16,
    end_prefix: [u8; 4],
    lines: Vec<String>,
    multiline: bool,
    finished: bool,
    raw: String,
}

impl ReplyAssembler {
    /// Starts a reply from its opening line, without the line terminator.
    pub fn start(line: &str) -> Result<Self, ProtocolError> {
        let line = trim_terminator(line);
        let bytes = line.as_bytes();
        if bytes.len() < 4 || !bytes[..3].iter().all(u8::is_ascii_digit) {
            return Err(ProtocolError::MalformedReply(line.to_string()));
        }
        let multiline = match bytes[3] {
            b' ' => false,
            b'-' => true,
            _ => return Err(ProtocolError::MalformedReply(line.to_string())),
        };

        let code = bytes[..3]
            .iter()
            .fold(0u16, |acc, c| acc * 10 + (c - b'0') as u16);
        if !(100..600).contains(&code) {
            return Err(ProtocolError::MalformedReply(line.to_string()));
        }

        Ok(ReplyAssembler {
            code,
            end_prefix: [bytes[0], bytes[1], bytes[2], b' '],
            lines: vec![line[4..].to_string()],
            multiline,
            finished: !multiline,
            raw: format!("{}\r\n", line),
        })
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is_final(&self) -> bool {
        self.finished
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Raw text collected so far.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Feeds the next line and returns whether the reply is now complete.
    pub fn feed_line(&mut self, line: &str) -> Result<bool, ProtocolError> {
        let line = trim_terminator(line);
        if self.finished {
            return Err(ProtocolError::MalformedReply(format!(
                "{}{}",
                self.raw, line
            )));
        }

        self.raw.push_str(line);
        self.raw.push_str("\r\n");
        if line.as_bytes().starts_with(&self.end_prefix) {
            self.lines.push(line[4..].to_string());
            self.finished = true;
        } else {
            // interior lines keep their leading whitespace
            self.lines.push(line.to_string());
        }
        Ok(self.finished)
    }

    pub fn finish(self) -> Result<Reply, ProtocolError> {
        if !self.finished {
            return Err(ProtocolError::MalformedReply(self.raw));
        }
        Ok(Reply {
            code: self.code,
            lines: self.lines,
            multiline: self.multiline,
            raw: self.raw,
        })
    }
}

fn trim_terminator(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}
