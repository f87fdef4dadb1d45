//! Log drain: formats entries from the log streams and hands them to a sink.
//!
//! The sink is a UART on target (see `hal::uart`), anything implementing
//! [`LogSink`] on host.
//!
//! Line format: `[timestamp_us] LEVEL source: message\n`

use core::fmt::Write;

use crate::logging::{BufWriter, LogEntry, LogStream, LOG_BUFFER_SIZE};

/// Size of one formatted log line.
pub const LINE_BUF_SIZE: usize = 192;

/// Interval between dropped-message reports.
pub const DROPPED_REPORT_INTERVAL_US: i64 = 10_000_000;

/// Byte sink for formatted log lines. May block.
pub trait LogSink {
    fn write_line(&mut self, line: &[u8]);
}

/// Format a log entry into `buf`, returns the number of bytes used.
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter::new(buf);
    let _ = write!(
        writer,
        "[{:10}] {:<5} {}: {}\n",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.source.as_str(),
        entry.message()
    );
    writer.len()
}

/// Drains a set of log streams into a sink.
pub struct LogDrain<'a, const S: usize, const N: usize = LOG_BUFFER_SIZE> {
    streams: [&'a LogStream<N>; S],
    last_dropped_report_us: i64,
}

impl<'a, const S: usize, const N: usize> LogDrain<'a, S, N> {
    /// Streams are drained in the given order, first one has priority.
    pub fn new(streams: [&'a LogStream<N>; S]) -> Self {
        Self {
            streams,
            last_dropped_report_us: 0,
        }
    }

    /// Write everything currently published, returns the number of entries.
    ///
    /// Every [`DROPPED_REPORT_INTERVAL_US`] a warning line with the dropped
    /// counts is emitted if any stream lost messages.
    pub fn drain_into<K: LogSink>(&mut self, sink: &mut K, now_us: i64) -> usize {
        let mut line = [0u8; LINE_BUF_SIZE];
        let mut count = 0;

        for stream in self.streams.iter() {
            while let Some(entry) = stream.drain() {
                let len = format_log_entry(&entry, &mut line);
                sink.write_line(&line[..len]);
                count += 1;
            }
        }

        if now_us - self.last_dropped_report_us >= DROPPED_REPORT_INTERVAL_US {
            let total: u32 = self.streams.iter().map(|s| s.dropped()).sum();
            if total > 0 {
                let mut writer = BufWriter::new(&mut line);
                let _ = write!(writer, "[{:10}] WARN  system: dropped", now_us);
                for (i, stream) in self.streams.iter().enumerate() {
                    let _ = write!(writer, " s{}={}", i, stream.dropped());
                    stream.reset_dropped();
                }
                let _ = writer.write_str("\n");
                let len = writer.len();
                sink.write_line(&line[..len]);
            }
            self.last_dropped_report_us = now_us;
        }

        count
    }
}
