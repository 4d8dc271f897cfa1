// SPDX-License-Identifier: GPL-2.0
//! Binary clock mode
//!
//! Hour and minute are sent as six bits each, bit 0 first. A set bit is a
//! dash-length pulse, a clear bit a dot-length pulse.

use std::io::Write;

use chrono::{Local, Timelike};

use crate::blink::Blinker;
use crate::device::IndicatorDevice;
use crate::error::{MledError, Result};
use crate::interrupt::Delay;
use crate::morse::{CLOCK_GAP, DASH, DOT};

/// Bits sent per value
pub const CLOCK_BITS: u32 = 6;

/// Hour and minute to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
}

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }

    /// Current local time
    pub fn now() -> Self {
        let now = Local::now();
        Self::new(now.hour(), now.minute())
    }
}

/// Send the low six bits of `value`, least significant first.
///
/// Writes one `1`/`0` per bit to `out` and a newline at the end.
pub fn encode_value<D, W>(
    blinker: &mut Blinker<D, W>,
    leds: u8,
    value: u32,
    out: &mut dyn Write,
) -> Result<()>
where
    D: IndicatorDevice,
    W: Delay,
{
    for bit in 0..CLOCK_BITS {
        let set = value & (1 << bit) != 0;
        write!(out, "{}", if set { '1' } else { '0' }).map_err(MledError::Trace)?;
        out.flush().map_err(MledError::Trace)?;
        blinker.pulse(leds, if set { DASH } else { DOT })?;
    }
    writeln!(out).map_err(MledError::Trace)
}

/// Print `time` and send hour, gap, minute
pub fn run<D, W>(
    blinker: &mut Blinker<D, W>,
    leds: u8,
    time: ClockTime,
    out: &mut dyn Write,
) -> Result<()>
where
    D: IndicatorDevice,
    W: Delay,
{
    let hour = format!("{:02}", time.hour);
    let minute = format!("{:02}", time.minute);
    writeln!(out, "{hour}:{minute}").map_err(MledError::Trace)?;
    writeln!(out, "{} {}", time.hour, time.minute).map_err(MledError::Trace)?;

    tracing::debug!("Sending {}:{} as binary", hour, minute);

    encode_value(blinker, leds, time.hour, out)?;
    blinker.rest(CLOCK_GAP)?;
    encode_value(blinker, leds, time.minute, out)
}
