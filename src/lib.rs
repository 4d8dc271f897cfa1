// SPDX-License-Identifier: GPL-2.0
//! Morse code on the keyboard LEDs
//!
//! Text is sent as dots and dashes on an indicator LED (CAPS LOCK by
//! default) through the Linux console KDSETLED ioctl. A clock mode sends the
//! current hour and minute as six-bit binary instead.
//!
//! Data flow: [`stream::run`] reads bytes and hands them to
//! [`encoder::MorseEncoder`], which looks codes up in [`morse`] and lights
//! the LED through [`blink::Blinker`]. [`clock`] drives the blinker
//! directly.

pub mod blink;
pub mod clock;
pub mod device;
pub mod encoder;
pub mod error;
pub mod interrupt;
pub mod morse;
pub mod stream;

#[cfg(test)]
mod mock;

pub use blink::Blinker;
pub use clock::ClockTime;
pub use device::{Console, IndicatorDevice, Led, SnapshotGuard, CONSOLE_PATH};
pub use encoder::{Dispatch, MorseEncoder};
pub use error::{MledError, Result};
pub use interrupt::{Delay, Interrupt};
pub use morse::Symbol;
pub use stream::StreamStats;
