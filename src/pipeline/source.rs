use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::core::konst::MAX_NAME_LENGTH;

/// Whitespace-delimited tokens from one input source.
///
/// Bytes are scanned straight out of the reader's buffer and split on ASCII
/// whitespace, so a file may carry one hostname per line or all of them on
/// one line. At most `max_len + 1` bytes of a token are kept; the rest of an
/// over-long token is consumed and dropped, and the truncated token still
/// fails the length check downstream.
pub struct HostnameReader<R> {
    reader: R,
    max_len: usize,
}

impl HostnameReader<BufReader<File>> {
    pub fn open(path: &Path) -> io::Result<HostnameReader<BufReader<File>>> {
        let file = File::open(path)?;
        Ok(HostnameReader::new(BufReader::new(file)))
    }
}

impl<R: BufRead> HostnameReader<R> {
    pub fn new(reader: R) -> HostnameReader<R> {
        HostnameReader {
            reader,
            max_len: MAX_NAME_LENGTH,
        }
    }

    /// Collect the next token into `token`. Returns once a delimiter after
    /// the token or the end of input is reached.
    fn scan(&mut self, token: &mut Vec<u8>) -> io::Result<()> {
        let keep = self.max_len + 1;
        loop {
            let (used, ended) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buf.is_empty() {
                    return Ok(());
                }

                let mut used = 0;
                let mut ended = false;
                for &byte in buf {
                    used += 1;
                    if byte.is_ascii_whitespace() {
                        if token.is_empty() {
                            continue;
                        }
                        ended = true;
                        break;
                    }
                    if token.len() < keep {
                        token.push(byte);
                    }
                }
                (used, ended)
            };
            self.reader.consume(used);
            if ended {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> Iterator for HostnameReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut token = Vec::new();
        if let Err(e) = self.scan(&mut token) {
            return Some(Err(e));
        }
        if token.is_empty() {
            return None;
        }

        // The cut may fall inside a multibyte character. The token is
        // rejected on length anyway, so only its size matters.
        if token.len() > self.max_len {
            return Some(Ok(String::from_utf8_lossy(&token).into_owned()));
        }
        Some(String::from_utf8(token).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
