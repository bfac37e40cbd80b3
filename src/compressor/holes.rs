//! Zero-run detection for sparse files
//!
//! The compressor writes long runs of zero bytes as a single "skip N bytes"
//! marker. [`HolesFinder`] walks a byte source and reports either one such run
//! or one literal byte per call.

use std::io::{self, BufRead};
use tracing::debug;

/// One scanner result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoleEvent {
    /// A zero run of at least the threshold, fully consumed
    Hole(u64),
    /// A single literal byte, possibly a zero from a short run
    Byte(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking at fresh input
    Scanning,
    /// Inside a zero run whose end has not been seen yet
    Counting { zeros: u64 },
    /// Handing out the zeros of a run that was too short to be a hole
    Replaying { zeros: u64 },
}

/// Reports zero runs of at least `threshold` bytes as holes
///
/// Not meant to be shared between threads; drive one finder from one place.
#[derive(Debug)]
pub struct HolesFinder<R> {
    reader: R,
    threshold: u64,
    state: ScanState,
}

impl<R: BufRead> HolesFinder<R> {
    /// Create a finder; a threshold of 0 behaves like 1
    pub fn new(reader: R, threshold: u64) -> Self {
        let threshold = threshold.max(1);
        debug!("Scanning for holes of at least {} bytes", threshold);
        Self {
            reader,
            threshold,
            state: ScanState::Scanning,
        }
    }

    /// Configured minimum hole length
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Next event, or `None` once the source is exhausted
    pub fn next_event(&mut self) -> io::Result<Option<HoleEvent>> {
        if let ScanState::Replaying { zeros } = self.state {
            self.state = match zeros {
                1 => ScanState::Scanning,
                n => ScanState::Replaying { zeros: n - 1 },
            };
            return Ok(Some(HoleEvent::Byte(0)));
        }

        let run = self.consume_zeros()?;
        self.state = ScanState::Scanning;
        if run >= self.threshold {
            return Ok(Some(HoleEvent::Hole(run)));
        }
        if run > 0 {
            if run > 1 {
                self.state = ScanState::Replaying { zeros: run - 1 };
            }
            return Ok(Some(HoleEvent::Byte(0)));
        }

        self.consume_byte()
    }

    /// Consume the zero run at the current position and return its length
    ///
    /// Zeros consumed so far are kept in the scan state, so a read error in
    /// the middle of a run loses nothing and the next call picks up the count.
    fn consume_zeros(&mut self) -> io::Result<u64> {
        let mut run = match self.state {
            ScanState::Counting { zeros } => zeros,
            _ => 0,
        };
        loop {
            let (zeros, available) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                (buf.iter().take_while(|&&b| b == 0).count(), buf.len())
            };
            self.reader.consume(zeros);
            run += zeros as u64;
            if run > 0 {
                self.state = ScanState::Counting { zeros: run };
            }

            // Stop at end of input or at the first non-zero byte
            if available == 0 || zeros < available {
                return Ok(run);
            }
        }
    }

    fn consume_byte(&mut self) -> io::Result<Option<HoleEvent>> {
        loop {
            let byte = match self.reader.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            return Ok(byte.map(|b| {
                self.reader.consume(1);
                HoleEvent::Byte(b)
            }));
        }
    }
}

impl<R: BufRead> Iterator for HolesFinder<R> {
    type Item = io::Result<HoleEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Totals from scanning a whole stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoleSummary {
    /// Number of holes
    pub holes: u64,
    /// Bytes covered by holes
    pub hole_bytes: u64,
    /// Bytes that would be written literally
    pub data_bytes: u64,
}

/// Drive a finder over `reader` to the end
pub fn summarize(reader: impl BufRead, threshold: u64) -> io::Result<HoleSummary> {
    let mut summary = HoleSummary::default();
    for event in HolesFinder::new(reader, threshold) {
        match event? {
            HoleEvent::Hole(len) => {
                summary.holes += 1;
                summary.hole_bytes += len;
            }
            HoleEvent::Byte(_) => summary.data_bytes += 1,
        }
    }
    Ok(summary)
}
