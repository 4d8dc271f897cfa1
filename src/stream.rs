// SPDX-License-Identifier: GPL-2.0
//! Stream driver: feed a file or standard input to the encoder

use std::io::{ErrorKind, Read};

use crate::device::IndicatorDevice;
use crate::encoder::{Dispatch, MorseEncoder};
use crate::error::{MledError, Result};
use crate::interrupt::Delay;

/// Bytes read per chunk
pub const CHUNK_SIZE: usize = 1024;

/// Counts of what was sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub characters: usize,
    pub word_gaps: usize,
    pub skipped: usize,
}

impl StreamStats {
    /// Bytes that were sent as Morse or as a word gap
    pub fn dispatched(&self) -> usize {
        self.characters + self.word_gaps
    }

    fn record(&mut self, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Char(_) => self.characters += 1,
            Dispatch::WordGap => self.word_gaps += 1,
            Dispatch::Skipped(_) => self.skipped += 1,
        }
    }
}

/// Read `source` until EOF, sending every byte through `encoder`
pub fn run<R, D, W>(mut source: R, encoder: &mut MorseEncoder<'_, D, W>) -> Result<StreamStats>
where
    R: Read,
    D: IndicatorDevice,
    W: Delay,
{
    let mut stats = StreamStats::default();
    let mut buf = [0u8; CHUNK_SIZE];

    loop {
        let len = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(MledError::Read(e)),
        };

        tracing::debug!("Read {} bytes", len);

        for &byte in &buf[..len] {
            stats.record(encoder.dispatch(byte)?);
        }
    }

    tracing::debug!(
        "Sent {} characters, {} word gaps, skipped {}",
        stats.characters,
        stats.word_gaps,
        stats.skipped
    );

    Ok(stats)
}
