//! Line-splitting `io::Write` adapter over the forwarder queue.

use std::io;

use super::LineQueue;

/// Buffers written bytes and queues every complete line on `flush`.
///
/// Lines end at CR or LF; empty segments between terminators are skipped and
/// text after the last LF stays buffered for the next flush.
#[derive(Debug)]
pub struct ConsoleWriter {
    buffer: Vec<u8>,
    queue: LineQueue,
}

impl ConsoleWriter {
    pub fn new(queue: LineQueue) -> Self {
        Self {
            buffer: Vec::new(),
            queue,
        }
    }

    /// Bytes written but not yet part of a complete line.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let Some(last) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Ok(());
        };
        let rest = self.buffer.split_off(last + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        for line in complete
            .split(|&b| b == b'\r' || b == b'\n')
            .filter(|line| !line.is_empty())
        {
            self.queue.offer(String::from_utf8_lossy(line));
        }
        Ok(())
    }
}
