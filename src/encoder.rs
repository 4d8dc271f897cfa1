// SPDX-License-Identifier: GPL-2.0
//! Morse encoder: turns input bytes into pulses on one indicator

use std::io::Write;

use tracing::warn;

use crate::blink::Blinker;
use crate::device::IndicatorDevice;
use crate::error::{MledError, Result};
use crate::interrupt::Delay;
use crate::morse::{self, CharacterCode, CHAR_GAP, WORD_GAP};

/// What happened to one input byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Letter or digit sent as Morse
    Char(u8),
    /// Space sent as a word gap
    WordGap,
    /// No code for this byte, reported and skipped
    Skipped(u8),
}

pub struct MorseEncoder<'a, D, W> {
    blinker: &'a mut Blinker<D, W>,
    leds: u8,
    trace: Option<&'a mut dyn Write>,
}

impl<'a, D: IndicatorDevice, W: Delay> MorseEncoder<'a, D, W> {
    /// Encode onto `leds`; symbols are echoed to `trace` when given
    pub fn new(blinker: &'a mut Blinker<D, W>, leds: u8, trace: Option<&'a mut dyn Write>) -> Self {
        Self {
            blinker,
            leds,
            trace,
        }
    }

    /// Send one input byte
    pub fn dispatch(&mut self, byte: u8) -> Result<Dispatch> {
        if byte == b' ' {
            self.word_gap()?;
            return Ok(Dispatch::WordGap);
        }

        match morse::lookup(byte) {
            Some(code) => {
                tracing::trace!("'{}' -> {}", byte as char, morse::to_pattern(code));
                self.encode_char(code)?;
                Ok(Dispatch::Char(byte))
            }
            None => {
                warn!("non-ascii character found: 0x{:02x}", byte);
                Ok(Dispatch::Skipped(byte))
            }
        }
    }

    /// Pulse every symbol of `code`, then hold the inter-character gap
    pub fn encode_char(&mut self, code: CharacterCode) -> Result<()> {
        for symbol in code {
            self.emit(symbol.trace_char())?;
            self.blinker.pulse(self.leds, symbol.duration())?;
        }
        self.emit(' ')?;
        self.blinker.pause(CHAR_GAP)
    }

    /// Dark pause for a space in the input
    pub fn word_gap(&mut self) -> Result<()> {
        self.blinker.rest(WORD_GAP)
    }

    fn emit(&mut self, c: char) -> Result<()> {
        if let Some(out) = self.trace.as_mut() {
            write!(out, "{c}").map_err(MledError::Trace)?;
            out.flush().map_err(MledError::Trace)?;
        }
        Ok(())
    }
}
