use std::io::{self, Write};

const INDENT: &str = "  ";

/// A sequential text sink that tracks the indentation depth.
///
/// Line breaks requested with [`new_line`](Self::new_line) are buffered and written, followed by
/// the indentation of the current depth, right before the next chunk. Lines therefore never end
/// with whitespace, and a chunk written after [`deindent`](Self::deindent) starts at the outer
/// depth. In compact mode line breaks are dropped altogether.
pub struct TurtleSink<W: Write> {
    writer: W,
    depth: usize,
    pending_lines: usize,
    compact: bool,
}

impl<W: Write> TurtleSink<W> {
    pub fn new(writer: W, compact: bool) -> Self {
        Self {
            writer,
            depth: 0,
            pending_lines: 0,
            compact,
        }
    }

    pub fn write_str(&mut self, chunk: &str) -> io::Result<()> {
        if self.pending_lines > 0 {
            for _ in 0..self.pending_lines {
                self.writer.write_all(b"\n")?;
            }
            for _ in 0..self.depth {
                self.writer.write_all(INDENT.as_bytes())?;
            }
            self.pending_lines = 0;
        }
        self.writer.write_all(chunk.as_bytes())
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn deindent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Requests `count` line breaks before the next chunk.
    pub fn new_line(&mut self, count: usize) {
        if !self.compact {
            self.pending_lines += count;
        }
    }

    /// Ends the stream: writes the pending line breaks, flushes and returns the writer.
    pub fn finish(mut self) -> io::Result<W> {
        for _ in 0..self.pending_lines {
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_nested(compact: bool) -> String {
        let mut sink = TurtleSink::new(Vec::new(), compact);
        sink.write_str("[").unwrap();
        sink.indent();
        sink.new_line(1);
        sink.write_str("a b").unwrap();
        sink.deindent();
        sink.new_line(1);
        sink.write_str("] .").unwrap();
        sink.new_line(2);
        String::from_utf8(sink.finish().unwrap()).unwrap()
    }

    #[test]
    fn indentation_applies_to_the_next_chunk() {
        assert_eq!(write_nested(false), "[\n  a b\n] .\n\n");
    }

    #[test]
    fn compact_mode_drops_line_breaks() {
        assert_eq!(write_nested(true), "[a b] .");
    }

    #[test]
    fn line_breaks_accumulate() {
        let mut sink = TurtleSink::new(Vec::new(), false);
        sink.indent();
        sink.write_str("x").unwrap();
        sink.new_line(1);
        sink.new_line(1);
        sink.write_str("y").unwrap();
        assert_eq!(sink.finish().unwrap(), b"x\n\n  y");
    }
}
