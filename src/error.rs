// SPDX-License-Identifier: GPL-2.0
//! Error types for the blink pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving the keyboard LEDs
#[derive(Error, Debug)]
pub enum MledError {
    /// Console device could not be opened
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// KDSETLED / KDGETLED failed
    #[error("LED ioctl failed: {0}")]
    Device(#[source] io::Error),

    /// Input stream could not be read
    #[error("Failed to read input: {0}")]
    Read(#[source] io::Error),

    /// Trace output could not be written
    #[error("Failed to write trace output: {0}")]
    Trace(#[source] io::Error),

    /// Signal handling could not be set up
    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] io::Error),

    /// Termination was requested while blinking
    #[error("Interrupted")]
    Interrupted,
}

impl MledError {
    /// Interrupts end the run cleanly and are not reported as failures
    pub fn is_interrupt(&self) -> bool {
        matches!(self, MledError::Interrupted)
    }
}

pub type Result<T> = std::result::Result<T, MledError>;
