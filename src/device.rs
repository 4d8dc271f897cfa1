// SPDX-License-Identifier: GPL-2.0
//! Keyboard LED access through the Linux console
//!
//! The console exposes the LED bitmask through two ioctls:
//! KDSETLED (write the mask) and KDGETLED (read it back).
//! From linux/kd.h:
//!   #define KDGETLED 0x4B31
//!   #define KDSETLED 0x4B32
//!   LED_SCR = 0x01, LED_NUM = 0x02, LED_CAP = 0x04

use std::fs::File;
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;

use crate::error::{MledError, Result};
use crate::interrupt::Interrupt;

pub const CONSOLE_PATH: &str = "/dev/console";

pub const LED_SCROLL: u8 = 0x01;
pub const LED_NUM: u8 = 0x02;
pub const LED_CAPS: u8 = 0x04;

/// All indicators off
pub const LEDS_OFF: u8 = 0x00;

const KDGETLED: libc::c_ulong = 0x4B31;
const KDSETLED: libc::c_ulong = 0x4B32;

nix::ioctl_read_bad!(kd_get_led, KDGETLED, u8);
nix::ioctl_write_int_bad!(kd_set_led, KDSETLED);

/// Which keyboard indicator to blink
#[derive(Clone, Copy, ValueEnum, Debug, Default, PartialEq, Eq)]
pub enum Led {
    /// CAPS LOCK
    #[default]
    Caps,
    /// NUM LOCK
    Num,
    /// SCROLL LOCK
    Scroll,
}

impl Led {
    /// Bit in the KDSETLED mask
    pub fn mask(self) -> u8 {
        match self {
            Led::Caps => LED_CAPS,
            Led::Num => LED_NUM,
            Led::Scroll => LED_SCROLL,
        }
    }
}

impl std::fmt::Display for Led {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Led::Caps => write!(f, "caps"),
            Led::Num => write!(f, "num"),
            Led::Scroll => write!(f, "scroll"),
        }
    }
}

/// Something that holds the keyboard indicator state
pub trait IndicatorDevice {
    /// Replace the lit indicators with `leds`
    fn set_leds(&mut self, leds: u8) -> Result<()>;

    /// Read the currently lit indicators
    fn get_leds(&mut self) -> Result<u8>;
}

impl<D: IndicatorDevice + ?Sized> IndicatorDevice for &mut D {
    fn set_leds(&mut self, leds: u8) -> Result<()> {
        (**self).set_leds(leds)
    }

    fn get_leds(&mut self) -> Result<u8> {
        (**self).get_leds()
    }
}

/// Handle to the console device.
///
/// Clones share the same file descriptor, which is closed once the last
/// clone is dropped.
#[derive(Debug, Clone)]
pub struct Console {
    file: Arc<File>,
}

impl Console {
    /// Open the console without making it our controlling terminal
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::options()
            .read(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|source| MledError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Opened {}", path.display());

        Ok(Self {
            file: Arc::new(file),
        })
    }
}

impl IndicatorDevice for Console {
    fn set_leds(&mut self, leds: u8) -> Result<()> {
        let fd = self.file.as_raw_fd();
        unsafe { kd_set_led(fd, leds as libc::c_int) }
            .map_err(|e| MledError::Device(io::Error::from(e)))?;
        Ok(())
    }

    fn get_leds(&mut self) -> Result<u8> {
        let fd = self.file.as_raw_fd();
        let mut leds: u8 = 0;
        unsafe { kd_get_led(fd, &mut leds) }.map_err(|e| MledError::Device(io::Error::from(e)))?;
        Ok(leds)
    }
}

/// Snapshot of the indicator state taken before blinking starts.
///
/// Wraps the device for the whole run and writes the saved state back when
/// dropped, whatever way the run ended. If an [`Interrupt`] is attached it
/// is marked settled once the state is back.
pub struct SnapshotGuard<D: IndicatorDevice> {
    device: D,
    saved: u8,
    restored: bool,
    interrupt: Option<Interrupt>,
}

impl<D: IndicatorDevice> SnapshotGuard<D> {
    /// Read the current state and keep it for restoring
    pub fn new(mut device: D) -> Result<Self> {
        let saved = device.get_leds()?;
        tracing::debug!("Saved LED state 0x{:02x}", saved);
        Ok(Self {
            device,
            saved,
            restored: false,
            interrupt: None,
        })
    }

    /// Settle `interrupt` after restoring
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn saved(&self) -> u8 {
        self.saved
    }

    /// Restore the saved state now and report failure to the caller
    pub fn restore(mut self) -> Result<()> {
        self.restore_once()
    }

    fn restore_once(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        let result = self.device.set_leds(self.saved);
        if result.is_ok() {
            tracing::debug!("Restored LED state 0x{:02x}", self.saved);
        }
        if let Some(interrupt) = &self.interrupt {
            interrupt.settle();
        }
        result
    }
}

impl<D: IndicatorDevice> IndicatorDevice for SnapshotGuard<D> {
    fn set_leds(&mut self, leds: u8) -> Result<()> {
        self.device.set_leds(leds)
    }

    fn get_leds(&mut self) -> Result<u8> {
        self.device.get_leds()
    }
}

impl<D: IndicatorDevice> Drop for SnapshotGuard<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore_once() {
            tracing::error!("Failed to restore LED state: {}", e);
        }
    }
}
