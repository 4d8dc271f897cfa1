// SPDX-License-Identifier: GPL-2.0
//! Cancellation token for SIGINT, SIGTERM, SIGHUP, SIGQUIT and SIGTSTP
//!
//! Every wait in the blink engine sleeps on the token's condition variable,
//! so a signal wakes the main flow immediately and it unwinds with
//! [`MledError::Interrupted`]. The main flow marks the token settled once the
//! LED snapshot is back in place.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nix::sys::signal::{SigSet, Signal};
use parking_lot::{Condvar, Mutex};

use crate::device::IndicatorDevice;
use crate::error::{MledError, Result};

/// Something that blocks for a given time
pub trait Delay {
    /// Block for `duration`, or fail with [`MledError::Interrupted`]
    fn delay(&mut self, duration: Duration) -> Result<()>;
}

#[derive(Debug, Default)]
struct State {
    requested: bool,
    settled: bool,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    cond: Condvar,
}

/// Shared interrupt flag with interruptible sleeping
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination and wake every sleeper
    pub fn trigger(&self) {
        let mut state = self.inner.state.lock();
        state.requested = true;
        self.inner.cond.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.state.lock().requested
    }

    /// Sleep for `duration` unless termination is requested first
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        let mut state = self.inner.state.lock();
        if !state.requested {
            self.inner
                .cond
                .wait_while_for(&mut state, |s| !s.requested, duration);
        }
        if state.requested {
            Err(MledError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Mark the LED state as restored
    pub fn settle(&self) {
        let mut state = self.inner.state.lock();
        state.settled = true;
        self.inner.cond.notify_all();
    }

    pub fn is_settled(&self) -> bool {
        self.inner.state.lock().settled
    }

    /// Wait up to `timeout` for [`settle`](Self::settle). Returns whether it happened.
    pub fn wait_settled(&self, timeout: Duration) -> bool {
        let mut state = self.inner.state.lock();
        if !state.settled {
            self.inner
                .cond
                .wait_while_for(&mut state, |s| !s.settled, timeout);
        }
        state.settled
    }
}

impl Delay for Interrupt {
    fn delay(&mut self, duration: Duration) -> Result<()> {
        self.sleep(duration)
    }
}

/// Exit status used when the LEDs cannot be restored (-1 as an unsigned byte)
pub const EXIT_FAILURE: u8 = 255;

/// Signals `ctrlc` does not cover; picked up by a `sigwait` thread instead
pub const STOP_SIGNALS: [Signal; 2] = [Signal::SIGQUIT, Signal::SIGTSTP];

impl Interrupt {
    /// Signal-side half of the shutdown handshake.
    ///
    /// Triggers the token and gives the main flow `grace` to restore the LEDs
    /// and settle. Runs `fallback` if it does not. Returns whether the
    /// fallback ran.
    pub fn terminate(&self, grace: Duration, fallback: &mut dyn FnMut()) -> bool {
        self.trigger();
        if self.wait_settled(grace) {
            return false;
        }
        tracing::debug!("Main flow did not settle in {:?}", grace);
        fallback();
        true
    }
}

/// Restore `saved` on behalf of a main flow that never settled.
///
/// Returns the process exit status to use.
pub fn restore_from_handler<D: IndicatorDevice + ?Sized>(device: &mut D, saved: u8) -> i32 {
    match device.set_leds(saved) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Failed to restore LED state: {}", e);
            i32::from(EXIT_FAILURE)
        }
    }
}

/// Route termination signals to `interrupt`.
///
/// SIGINT, SIGTERM and SIGHUP go through `ctrlc`. SIGQUIT and SIGTSTP are
/// blocked in the calling thread (and so in every thread spawned after it)
/// and collected by a dedicated `sigwait` thread. Call this from the main
/// thread before spawning anything else.
///
/// Either way the handler runs [`Interrupt::terminate`]; `fallback` is
/// expected to restore the LEDs itself and exit.
pub fn install<F>(interrupt: &Interrupt, grace: Duration, fallback: F) -> Result<()>
where
    F: FnMut() + Send + 'static,
{
    let fallback = Arc::new(Mutex::new(fallback));

    let mut stop_signals = SigSet::empty();
    for sig in STOP_SIGNALS {
        stop_signals.add(sig);
    }
    stop_signals
        .thread_block()
        .map_err(|e| MledError::Signal(io::Error::from(e)))?;

    let (int, fb) = (interrupt.clone(), Arc::clone(&fallback));
    ctrlc::set_handler(move || {
        tracing::debug!("Termination requested");
        int.terminate(grace, &mut *fb.lock());
    })
    .map_err(|e| MledError::Signal(io::Error::other(e)))?;

    let int = interrupt.clone();
    thread::Builder::new()
        .name("mled-signals".into())
        .spawn(move || loop {
            match stop_signals.wait() {
                Ok(sig) => {
                    tracing::debug!("Received {}", sig.as_str());
                    int.terminate(grace, &mut *fallback.lock());
                }
                Err(e) => {
                    tracing::warn!("sigwait failed: {}", e);
                    break;
                }
            }
        })
        .map_err(MledError::Signal)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{LED_CAPS, LED_NUM};
    use crate::mock::{Event, MockDevice};
    use std::time::Instant;

    #[test]
    fn sleep_completes_without_trigger() {
        let interrupt = Interrupt::new();
        let start = Instant::now();
        interrupt.sleep(Duration::from_millis(20)).unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn trigger_wakes_sleeper() {
        let interrupt = Interrupt::new();
        let remote = interrupt.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.trigger();
        });

        let start = Instant::now();
        let result = interrupt.sleep(Duration::from_secs(30));
        handle.join().unwrap();

        assert!(matches!(result, Err(MledError::Interrupted)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn sleep_after_trigger_fails_immediately() {
        let mut interrupt = Interrupt::new();
        interrupt.trigger();
        assert!(interrupt.is_triggered());
        assert!(interrupt.delay(Duration::from_secs(30)).is_err());
    }

    #[test]
    fn wait_settled_times_out() {
        let interrupt = Interrupt::new();
        assert!(!interrupt.wait_settled(Duration::from_millis(10)));
        interrupt.settle();
        assert!(interrupt.wait_settled(Duration::from_millis(10)));
    }

    #[test]
    fn terminate_skips_fallback_when_settled() {
        let interrupt = Interrupt::new();
        let main_flow = interrupt.clone();
        let handle = thread::spawn(move || {
            // Main flow wakes from its sleep, restores, settles
            assert!(main_flow.sleep(Duration::from_secs(30)).is_err());
            main_flow.settle();
        });

        let mut ran = false;
        let fell_back = interrupt.terminate(Duration::from_secs(5), &mut || ran = true);
        handle.join().unwrap();

        assert!(!fell_back);
        assert!(!ran);
        assert!(interrupt.is_triggered());
    }

    #[test]
    fn terminate_falls_back_when_main_flow_is_stuck() {
        let interrupt = Interrupt::new();
        let (mut device, log) = MockDevice::new(LED_CAPS);
        let mut status = None;

        let fell_back = interrupt.terminate(Duration::from_millis(20), &mut || {
            status = Some(restore_from_handler(&mut device, LED_NUM));
        });

        assert!(fell_back);
        assert_eq!(status, Some(0));
        assert_eq!(log.events(), vec![Event::Set(LED_NUM)]);
    }

    #[test]
    fn restore_from_handler_reports_failure() {
        let (mut device, log) = MockDevice::failing_after(LED_CAPS, 0);
        assert_eq!(restore_from_handler(&mut device, LED_NUM), 255);
        assert!(log.events().is_empty());
    }

    #[test]
    fn stop_signals_cover_quit_and_tstp() {
        assert!(STOP_SIGNALS.contains(&Signal::SIGQUIT));
        assert!(STOP_SIGNALS.contains(&Signal::SIGTSTP));
    }
}
