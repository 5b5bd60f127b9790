//! Result presentation.
//!
//! [`ResultPresenter`] is the seam between the pipeline and whatever shows the
//! result. [`OutputWriter`] is the machine-readable presenter: it writes each
//! outcome as JSON or as one JSON line.

use serde::Serialize;
use std::io::{self, Write};

use crate::types::Outcome;

/// Displays analysis outcomes and non-fatal notices.
pub trait ResultPresenter {
    /// Show the outcome for one photo.
    fn present(&mut self, outcome: &Outcome) -> io::Result<()>;

    /// Show a short non-fatal notice ("permission not granted", device errors).
    fn notice(&mut self, message: &str) -> io::Result<()>;
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON document per outcome, optionally pretty-printed
    Json,
    /// Newline-delimited JSON, never pretty-printed
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct Notice<'a> {
    status: &'static str,
    message: &'a str,
}

/// Presenter that serializes outcomes as JSON.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    /// Serialize one item followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty && self.format == OutputFormat::Json {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        self.writer.flush()
    }

    pub fn items_written(&self) -> usize {
        self.items_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ResultPresenter for OutputWriter<W> {
    fn present(&mut self, outcome: &Outcome) -> io::Result<()> {
        self.write(outcome)
    }

    fn notice(&mut self, message: &str) -> io::Result<()> {
        self.write(&Notice {
            status: "notice",
            message,
        })
    }
}
