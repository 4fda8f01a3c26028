use std::fs::File;
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::Path;

use parking_lot::Mutex;

use crate::pipeline::error::PipelineError;

/// Shared output target, one `hostname,address` line per resolution.
///
/// Has its own lock, separate from the queue lock, so queue traffic never
/// waits on output I/O.
#[derive(Debug)]
pub struct OutputSink<W> {
    writer: Mutex<W>,
}

impl OutputSink<File> {
    /// Create or truncate the output file.
    pub fn create(path: &Path) -> Result<OutputSink<File>, PipelineError> {
        let file = File::create(path).map_err(|source| PipelineError::OutputFile {
            path: path.to_owned(),
            source,
        })?;
        Ok(OutputSink::new(file))
    }
}

impl<W: Write> OutputSink<W> {
    pub fn new(writer: W) -> OutputSink<W> {
        OutputSink {
            writer: Mutex::new(writer),
        }
    }

    /// Append one line. An unresolved hostname gets an empty address field.
    pub fn write_line(&self, hostname: &str, address: Option<IpAddr>) -> io::Result<()> {
        let line = format_line(hostname, address);
        let mut writer = self.writer.lock();
        writer.write_all(line.as_bytes())?;
        writer.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

/// `hostname,address\n`, or `hostname,\n` when unresolved.
pub fn format_line(hostname: &str, address: Option<IpAddr>) -> String {
    match address {
        Some(addr) => format!("{hostname},{addr}\n"),
        None => format!("{hostname},\n"),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn resolved_line_is_expected() {
        let addr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(format_line("a.test", Some(addr)), "a.test,1.1.1.1\n");
    }

    #[test]
    fn unresolved_line_has_empty_address() {
        assert_eq!(format_line("bogus.invalid", None), "bogus.invalid,\n");
    }

    #[test]
    fn ipv6_address_is_written_verbatim() {
        let addr: IpAddr = "2001:db8::1".parse().unwrap();
        assert_eq!(format_line("v6.test", Some(addr)), "v6.test,2001:db8::1\n");
    }

    #[test]
    fn create_fails_for_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(matches!(
            OutputSink::create(&path),
            Err(PipelineError::OutputFile { .. })
        ));
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale,line\n").unwrap();

        let sink = OutputSink::create(&path).unwrap();
        sink.write_line("a.test", None).unwrap();
        drop(sink);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.test,\n");
    }

    #[test]
    fn concurrent_writers_never_interleave_lines() {
        let sink = Arc::new(OutputSink::new(Vec::new()));
        let writers: Vec<_> = (0..8)
            .map(|w| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..500 {
                        let addr = IpAddr::V4(Ipv4Addr::new(10, w, (i / 256) as u8, (i % 256) as u8));
                        sink.write_line(&format!("host-{w}-{i}.test"), Some(addr)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).unwrap();
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(output.ends_with('\n'));

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 8 * 500);
        for line in lines {
            let (host, addr) = line.split_once(',').unwrap();
            let mut parts = host.trim_end_matches(".test").split('-').skip(1);
            let w: u8 = parts.next().unwrap().parse().unwrap();
            let i: usize = parts.next().unwrap().parse().unwrap();
            assert_eq!(addr, format!("10.{w}.{}.{}", i / 256, i % 256));
        }
    }
}
