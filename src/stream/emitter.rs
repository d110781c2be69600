//! Event emitter writing the primary and diagnostic streams

use eyre::{Context, Result};
use std::io::Write;

use super::Event;

/// Writes numbered events to a primary stream and a `WROTE <n>` line per
/// event to a diagnostic stream.
///
/// The counter starts at 1 and only advances after both writes succeed.
pub struct Emitter<O: Write, D: Write> {
    label: String,
    next_id: u64,
    out: O,
    diag: D,
}

impl<O: Write, D: Write> Emitter<O, D> {
    pub fn new(label: impl Into<String>, out: O, diag: D) -> Self {
        Self {
            label: label.into(),
            next_id: 1,
            out,
            diag,
        }
    }

    /// Emit the next event and return it.
    pub fn emit(&mut self) -> Result<Event> {
        let event = Event::new(&self.label, self.next_id);
        let line = event.to_json_line()?;

        self.out
            .write_all(line.as_bytes())
            .and_then(|_| self.out.flush())
            .context(format!("Failed to write event {}", event.event_id))?;

        let progress = format!("WROTE {}\n", event.event_id);
        self.diag
            .write_all(progress.as_bytes())
            .and_then(|_| self.diag.flush())
            .context(format!("Failed to write progress for event {}", event.event_id))?;

        log::debug!("Emitted event {}", event.event_id);
        self.next_id += 1;
        Ok(event)
    }

    /// Number of events emitted so far
    pub fn emitted(&self) -> u64 {
        self.next_id - 1
    }

    /// Flush both streams before stopping.
    pub fn finish(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush event stream")?;
        self.diag.flush().context("Failed to flush progress stream")?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (O, D) {
        (self.out, self.diag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Both streams appending to one buffer, tagged, to check interleaving
    #[derive(Clone)]
    struct Tagged {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Write for Tagged {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let text = String::from_utf8_lossy(buf).to_string();
            self.log.borrow_mut().push(format!("{}:{}", self.tag, text.trim_end()));
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }
    }

    fn lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn test_emit_ping_scenario() {
        let mut emitter = Emitter::new("ping", Vec::new(), Vec::new());
        for _ in 0..3 {
            emitter.emit().unwrap();
        }
        assert_eq!(emitter.emitted(), 3);

        let (out, diag) = emitter.into_parts();
        assert_eq!(
            lines(&out),
            vec![
                r#"{"eventId":1,"message":"ping 1"}"#,
                r#"{"eventId":2,"message":"ping 2"}"#,
                r#"{"eventId":3,"message":"ping 3"}"#,
            ]
        );
        assert_eq!(lines(&diag), vec!["WROTE 1", "WROTE 2", "WROTE 3"]);
    }

    #[test]
    fn test_emit_without_label() {
        let mut emitter = Emitter::new("", Vec::new(), Vec::new());
        let first = emitter.emit().unwrap();
        let second = emitter.emit().unwrap();

        assert_eq!(first.message, " 1");
        assert_eq!(second.message, " 2");
    }

    #[test]
    fn test_counter_is_monotonic() {
        let mut emitter = Emitter::new("seq", Vec::new(), Vec::new());
        let ids: Vec<u64> = (0..100).map(|_| emitter.emit().unwrap().event_id).collect();
        assert_eq!(ids, (1..=100).collect::<Vec<u64>>());

        let (out, diag) = emitter.into_parts();
        for (n, (line, progress)) in lines(&out).iter().zip(lines(&diag)).enumerate() {
            let event: Event = serde_json::from_str(line).unwrap();
            assert_eq!(event.event_id, n as u64 + 1);
            assert_eq!(event.message, format!("seq {}", n + 1));
            assert_eq!(progress, format!("WROTE {}", n + 1));
        }
    }

    #[test]
    fn test_primary_written_before_progress() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let out = Tagged { tag: "out", log: log.clone() };
        let diag = Tagged { tag: "err", log: log.clone() };

        let mut emitter = Emitter::new("ping", out, diag);
        emitter.emit().unwrap();
        emitter.emit().unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                r#"out:{"eventId":1,"message":"ping 1"}"#.to_string(),
                "err:WROTE 1".to_string(),
                r#"out:{"eventId":2,"message":"ping 2"}"#.to_string(),
                "err:WROTE 2".to_string(),
            ]
        );
    }

    #[test]
    fn test_primary_write_failure_propagates() {
        let mut emitter = Emitter::new("ping", Broken, Vec::new());
        let err = emitter.emit().unwrap_err();

        assert!(err.to_string().contains("event 1"));
        assert_eq!(emitter.emitted(), 0);

        let (_, diag) = emitter.into_parts();
        assert!(diag.is_empty());
    }

    #[test]
    fn test_diagnostic_write_failure_propagates() {
        let mut emitter = Emitter::new("ping", Vec::new(), Broken);
        let err = emitter.emit().unwrap_err();

        assert!(err.to_string().contains("progress"));
        assert_eq!(emitter.emitted(), 0);
    }

    #[test]
    fn test_finish_flushes() {
        let mut emitter = Emitter::new("ping", Vec::new(), Vec::new());
        emitter.emit().unwrap();
        assert!(emitter.finish().is_ok());

        let mut broken = Emitter::new("ping", Broken, Vec::new());
        assert!(broken.finish().is_err());
    }
}
