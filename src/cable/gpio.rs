//! GPIO bit-banging cable: four general-purpose lines wired straight to a
//! TAP header.
//!
//! The driver keeps no queue. Every TAP operation maps directly onto
//! blocking line writes and reads, in call order: TMS and TDI settle before
//! TCK pulses, and TCK is parked low before TDO is sampled.

use eh1::delay::DelayNs;

use crate::cable::{Cable, Param, PodSignals};
use crate::delay::Delay;
use crate::lines::{Level, LineController, LineProvider, PinMap, PinMapBuilder};
use crate::{CableError, Signal};

/// Consumer tag attached to the line request.
const CONSUMER: &str = "jtag-gpio";

/// Usage synopsis for connect-time parameters.
pub const USAGE: &str = "Usage: cable gpio tdi=<line> tdo=<line> tck=<line> tms=<line>";

/// Settle delay a fresh cable starts with, in microseconds.
const DEFAULT_PACING_US: u32 = 1000;

/// Lifecycle of a connected cable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Pins validated, no lines held.
    Connected,
    /// Lines requested (possibly running line-less); TAP traffic allowed.
    Active,
}

/// A JTAG cable bit-banged over four digital I/O lines.
///
/// `P` supplies the lines, `D` paces TDO sampling. Constructed by
/// [`GpioCable::connect`], torn down by [`Cable::done`] or drop.
pub struct GpioCable<P: LineProvider, D = Delay> {
    /// Accumulated pin assignments; later parameter lists merge into this.
    mapping: PinMapBuilder,
    pins: PinMap,
    provider: P,
    controller: LineController<P::Request>,
    state: State,
    /// Signals asserted by convention, independent of line state.
    signals: PodSignals,
    /// Levels last driven through `set_signal`; rewritten on every call.
    lastout: PodSignals,
    pacing_us: u32,
    pacer: D,
    on_disconnect: Option<Box<dyn FnOnce()>>,
}

impl<P: LineProvider> GpioCable<P> {
    /// Connect with the default sleep-backed pacer.
    pub fn connect(provider: P, params: &[Param]) -> Result<Self, CableError> {
        Self::connect_with_pacer(provider, Delay, params)
    }
}

impl<P: LineProvider, D: DelayNs> GpioCable<P, D> {
    /// Validate `params` and build the cable. No lines are touched yet.
    pub fn connect_with_pacer(provider: P, pacer: D, params: &[Param]) -> Result<Self, CableError> {
        let mut mapping = PinMapBuilder::default();
        apply(&mut mapping, params);
        let pins = match mapping.build() {
            Ok(pins) => pins,
            Err(e) => {
                log::error!("{USAGE}");
                return Err(e);
            }
        };
        log::info!("initializing gpio jtag cable");
        Ok(Self {
            mapping,
            pins,
            provider,
            controller: LineController::new(),
            state: State::Connected,
            signals: PodSignals::NONE,
            lastout: PodSignals::NONE,
            pacing_us: DEFAULT_PACING_US,
            pacer,
            on_disconnect: None,
        })
    }

    /// Re-apply parameters. Keys not present keep their current assignment.
    ///
    /// The new mapping is used the next time lines are requested; a request
    /// already held keeps the offsets it was built with.
    pub fn reconfigure(&mut self, params: &[Param]) -> Result<(), CableError> {
        apply(&mut self.mapping, params);
        self.pins = self.mapping.build()?;
        if self.controller.is_open() {
            log::warn!("pin mapping changed while lines are held; takes effect after re-init");
        }
        Ok(())
    }

    /// Register the chain-side notification fired by [`Cable::disconnect`].
    pub fn on_disconnect(&mut self, hook: Box<dyn FnOnce()>) {
        self.on_disconnect = Some(hook);
    }
}

fn apply(mapping: &mut PinMapBuilder, params: &[Param]) {
    for param in params {
        match *param {
            Param::Tdi(line) => mapping.set(Signal::Tdi, line),
            Param::Tdo(line) => mapping.set(Signal::Tdo, line),
            Param::Tms(line) => mapping.set(Signal::Tms, line),
            Param::Tck(line) => mapping.set(Signal::Tck, line),
            // the gpio cable has no use for transport hints
            _ => {}
        }
    }
}

impl<P: LineProvider, D: DelayNs> Cable for GpioCable<P, D> {
    fn init(&mut self) -> Result<(), CableError> {
        if self.state == State::Active {
            log::debug!("cable already initialized");
            return Ok(());
        }
        self.controller.open(&mut self.provider, CONSUMER, self.pins)?;
        // the reset line is asserted by wiring convention, not by the cable
        self.signals = PodSignals::TRST;
        self.state = State::Active;
        Ok(())
    }

    fn done(&mut self) {
        self.controller.close();
        self.state = State::Connected;
    }

    fn disconnect(&mut self) {
        if let Some(hook) = self.on_disconnect.take() {
            hook();
        }
        self.done();
    }

    fn clock(&mut self, tms: bool, tdi: bool, n: usize) {
        let _ = self.controller.set(Signal::Tms, Level::from(tms));
        let _ = self.controller.set(Signal::Tdi, Level::from(tdi));
        for _ in 0..n {
            let _ = self.controller.set(Signal::Tck, Level::Low);
            let _ = self.controller.set(Signal::Tck, Level::High);
            let _ = self.controller.set(Signal::Tck, Level::Low);
        }
    }

    fn get_tdo(&mut self) -> Result<bool, CableError> {
        let _ = self.controller.set(Signal::Tck, Level::Low);
        let _ = self.controller.set(Signal::Tdi, Level::Low);
        let _ = self.controller.set(Signal::Tms, Level::Low);
        self.lastout = self.lastout & !PodSignals::DRIVEN;

        self.pacer.delay_us(self.pacing_us);

        Ok(bool::from(self.controller.get(Signal::Tdo)?))
    }

    fn current_signals(&self) -> PodSignals {
        let mut sigs = self.signals & !PodSignals::DRIVEN;
        if self.lastout.tck() {
            sigs.set_tck(true);
        }
        if self.lastout.tdi() {
            sigs.set_tdi(true);
        }
        if self.lastout.tms() {
            sigs.set_tms(true);
        }
        sigs
    }

    fn set_signal(&mut self, mask: PodSignals, value: PodSignals) -> PodSignals {
        let prev = self.current_signals();

        // only the shifting triad can be driven through this call
        let mask = mask & PodSignals::DRIVEN;
        if mask.tms() {
            let _ = self.controller.set(Signal::Tms, Level::from(value.tms()));
        }
        if mask.tdi() {
            let _ = self.controller.set(Signal::Tdi, Level::from(value.tdi()));
        }
        if mask.tck() {
            let _ = self.controller.set(Signal::Tck, Level::from(value.tck()));
        }

        // replace, not merge: bits outside the mask drop out of the tracked
        // state entirely
        self.lastout = value & mask;

        prev
    }

    fn pacing_delay(&self) -> u32 {
        self.pacing_us
    }

    fn set_pacing_delay(&mut self, micros: u32) {
        self.pacing_us = micros;
    }

    fn help() -> &'static str {
        USAGE
    }
}

impl<P: LineProvider, D> Drop for GpioCable<P, D> {
    fn drop(&mut self) {
        self.controller.close();
    }
}
