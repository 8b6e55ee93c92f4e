use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::VMemError;

/// One record of the fault log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEvent {
    pub req_pageno: usize,
    pub replaced_page: Option<usize>,
    pub alloc_frame: usize,
    pub pf_count: u64,
    pub g_count: u64,
}

/// Append-only stream of fault records, flushed after every record
pub struct FaultLogger {
    writer: Box<dyn Write + Send>,
}

impl FaultLogger {
    /// Creates (or truncates) the log file at `path`
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, VMemError> {
        let file = File::create(path).map_err(|source| VMemError::ResourceInit {
            resource: "fault log",
            source,
        })?;

        Ok(Self::from_writer(BufWriter::new(file)))
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Box::new(writer),
        }
    }

    /// Logger that drops every record
    pub fn disabled() -> Self {
        Self::from_writer(io::sink())
    }

    pub fn log(&mut self, event: &LogEvent) -> Result<(), VMemError> {
        let replaced_page = match event.replaced_page {
            Some(page) => page as i64,
            None => -1,
        };

        write!(
            self.writer,
            "Page fault {:10}, Global count {:10}:\nRemoved: {:10}, Allocated: {:10}, Frame: {:10}\n",
            event.pf_count, event.g_count, replaced_page, event.req_pageno, event.alloc_frame
        )
        .and_then(|_| self.writer.flush())
        .map_err(VMemError::FaultLog)
    }
}
