// SPDX-License-Identifier: GPL-2.0
//! Recording device and delay for unit tests

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crate::device::IndicatorDevice;
use crate::error::{MledError, Result};
use crate::interrupt::Delay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Set(u8),
    Wait(Duration),
}

/// Shared, ordered record of LED writes and waits
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    /// Number of writes that lit at least one LED
    pub fn pulses(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Set(leds) if *leds != 0))
            .count()
    }

    pub fn total_wait(&self) -> Duration {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Wait(d) => Some(*d),
                Event::Set(_) => None,
            })
            .sum()
    }
}

pub struct MockDevice {
    log: Log,
    leds: u8,
    sets_left: Option<usize>,
}

impl MockDevice {
    pub fn new(leds: u8) -> (Self, Log) {
        let log = Log::default();
        let device = Self {
            log: log.clone(),
            leds,
            sets_left: None,
        };
        (device, log)
    }

    /// Device whose writes fail after `ok_sets` successful ones
    pub fn failing_after(leds: u8, ok_sets: usize) -> (Self, Log) {
        let (mut device, log) = Self::new(leds);
        device.sets_left = Some(ok_sets);
        (device, log)
    }
}

impl IndicatorDevice for MockDevice {
    fn set_leds(&mut self, leds: u8) -> Result<()> {
        if let Some(left) = self.sets_left.as_mut() {
            if *left == 0 {
                return Err(MledError::Device(io::Error::from_raw_os_error(libc::ENOTTY)));
            }
            *left -= 1;
        }
        self.leds = leds;
        self.log.push(Event::Set(leds));
        Ok(())
    }

    fn get_leds(&mut self) -> Result<u8> {
        Ok(self.leds)
    }
}

pub struct MockDelay {
    log: Log,
    waits_left: Option<usize>,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            waits_left: None,
        }
    }

    /// Delay that reports an interrupt after `waits` completed waits
    pub fn interrupted_after(log: &Log, waits: usize) -> Self {
        Self {
            log: log.clone(),
            waits_left: Some(waits),
        }
    }
}

impl Delay for MockDelay {
    fn delay(&mut self, duration: Duration) -> Result<()> {
        if let Some(left) = self.waits_left.as_mut() {
            if *left == 0 {
                return Err(MledError::Interrupted);
            }
            *left -= 1;
        }
        self.log.push(Event::Wait(duration));
        Ok(())
    }
}
