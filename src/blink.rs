// SPDX-License-Identifier: GPL-2.0
//! Blink engine: light an indicator for a while, then pause

use std::time::Duration;

use crate::device::{IndicatorDevice, LEDS_OFF};
use crate::error::Result;
use crate::interrupt::Delay;
use crate::morse::PULSE_PAUSE;

/// Owns the LED device and the delay source for the run
pub struct Blinker<D, W> {
    device: D,
    delay: W,
}

impl<D: IndicatorDevice, W: Delay> Blinker<D, W> {
    pub fn new(device: D, delay: W) -> Self {
        Self { device, delay }
    }

    /// Light `leds` for `on`, switch everything off, then wait one dot.
    ///
    /// The trailing pause is part of every pulse; callers add nothing
    /// between consecutive pulses.
    pub fn pulse(&mut self, leds: u8, on: Duration) -> Result<()> {
        self.device.set_leds(leds)?;
        self.delay.delay(on)?;
        self.device.set_leds(LEDS_OFF)?;
        self.delay.delay(PULSE_PAUSE)
    }

    /// Keep all indicators dark for `duration`
    pub fn rest(&mut self, duration: Duration) -> Result<()> {
        self.device.set_leds(LEDS_OFF)?;
        self.delay.delay(duration)
    }

    /// Wait without touching the LEDs
    pub fn pause(&mut self, duration: Duration) -> Result<()> {
        self.delay.delay(duration)
    }

    /// Give back the device, e.g. to restore a snapshot explicitly
    pub fn into_device(self) -> D {
        self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::LED_CAPS;
    use crate::error::MledError;
    use crate::mock::{Event, MockDelay, MockDevice};
    use crate::morse::{DASH, DOT};

    #[test]
    fn pulse_is_on_wait_off_wait() {
        let (device, log) = MockDevice::new(0);
        let mut blinker = Blinker::new(device, MockDelay::new(&log));

        blinker.pulse(LED_CAPS, DASH).unwrap();

        assert_eq!(
            log.events(),
            vec![
                Event::Set(LED_CAPS),
                Event::Wait(DASH),
                Event::Set(LEDS_OFF),
                Event::Wait(DOT),
            ]
        );
        assert_eq!(log.total_wait(), DASH + DOT);
    }

    #[test]
    fn rest_never_lights() {
        let (device, log) = MockDevice::new(LED_CAPS);
        let mut blinker = Blinker::new(device, MockDelay::new(&log));

        blinker.rest(DASH * 7).unwrap();

        assert_eq!(log.pulses(), 0);
        assert_eq!(log.events(), vec![Event::Set(LEDS_OFF), Event::Wait(DASH * 7)]);
    }

    #[test]
    fn device_failure_stops_pulse() {
        let (device, log) = MockDevice::failing_after(0, 1);
        let mut blinker = Blinker::new(device, MockDelay::new(&log));

        let err = blinker.pulse(LED_CAPS, DOT).unwrap_err();

        assert!(matches!(err, MledError::Device(_)));
        // Lit, waited, then the off write failed
        assert_eq!(log.events(), vec![Event::Set(LED_CAPS), Event::Wait(DOT)]);
    }

    #[test]
    fn interrupt_cuts_pulse_short() {
        let (device, log) = MockDevice::new(0);
        let mut blinker = Blinker::new(device, MockDelay::interrupted_after(&log, 0));

        let err = blinker.pulse(LED_CAPS, DASH).unwrap_err();

        assert!(err.is_interrupt());
        assert_eq!(log.events(), vec![Event::Set(LED_CAPS)]);
    }
}
