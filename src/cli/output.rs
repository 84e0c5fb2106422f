//! Shared CLI output helpers.
//!
//! Records go to stdout as JSON lines. Status lines go to stderr so that
//! stdout can be piped straight into other tools.

use std::fmt::Display;
use std::io::{self, BufWriter, Stdout, Write};

use serde::Serialize;

const RULE_WIDTH: usize = 56;

/// Newline-delimited JSON writer.
pub struct JsonLines<W: Write> {
    out: W,
    written: usize,
}

impl JsonLines<BufWriter<Stdout>> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }
}

impl<W: Write> JsonLines<W> {
    pub const fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record).map_err(io::Error::from)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Print a section header and separator.
pub fn section(title: &str) {
    println!();
    println!("{title}");
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// Print a simple key/value line.
pub fn key_value(label: &str, value: impl Display) {
    println!("{label:<14} {value}");
}

/// Print a successful status line.
pub fn ok(message: &str) {
    println!("✓ {message}");
}

/// Print a warning status line.
pub fn warn(message: &str) {
    eprintln!("⚠ {message}");
}

/// Print an error status line.
pub fn error(message: &str) {
    eprintln!("✗ {message}");
}
