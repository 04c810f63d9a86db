//! Digital-I/O capability consumed by the cable drivers.
//!
//! The traits mirror what a character-device gpio controller offers: reserve
//! a named set of lines with per-line direction and initial value, get and
//! set individual levels, release the reservation. The cable core only ever
//! sees these traits, so any line source can stand in for real hardware.

use crate::{CableError, Signal};

#[cfg(target_os = "linux")]
pub mod cdev;

/// Logic level of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> bool {
        matches!(level, Level::High)
    }
}

/// Requested direction of a line, with the initial level for outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output(Level),
}

/// One line of a reservation: physical offset plus direction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSetting {
    pub offset: u32,
    pub direction: Direction,
}

/// A held reservation of a set of lines. Dropping it releases the lines.
pub trait LineRequest {
    fn set_value(&mut self, offset: u32, level: Level) -> Result<(), CableError>;
    fn get_value(&mut self, offset: u32) -> Result<Level, CableError>;
}

/// Opens a digital-I/O controller and reserves lines on it.
pub trait LineProvider {
    type Request: LineRequest;

    /// Reserve `settings` as a single named request.
    ///
    /// [`CableError::ControllerUnavailable`] means the controller itself
    /// could not be opened; any other error means the request could not be
    /// built or submitted.
    fn request(
        &mut self,
        consumer: &str,
        settings: &[LineSetting],
    ) -> Result<Self::Request, CableError>;
}

/// Partially-assigned pin map collected from cable parameters.
///
/// Re-applying parameters overwrites only the keys supplied; a signal, once
/// assigned, never reverts to unset.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PinMapBuilder {
    tdi: Option<u32>,
    tck: Option<u32>,
    tms: Option<u32>,
    tdo: Option<u32>,
}

impl PinMapBuilder {
    pub fn set(&mut self, signal: Signal, offset: u32) {
        match signal {
            Signal::Tdi => self.tdi = Some(offset),
            Signal::Tck => self.tck = Some(offset),
            Signal::Tms => self.tms = Some(offset),
            Signal::Tdo => self.tdo = Some(offset),
        }
    }

    pub fn get(&self, signal: Signal) -> Option<u32> {
        match signal {
            Signal::Tdi => self.tdi,
            Signal::Tck => self.tck,
            Signal::Tms => self.tms,
            Signal::Tdo => self.tdo,
        }
    }

    /// All four signals must be assigned before a map can be built.
    pub fn build(&self) -> Result<PinMap, CableError> {
        match (self.tdi, self.tck, self.tms, self.tdo) {
            (Some(tdi), Some(tck), Some(tms), Some(tdo)) => Ok(PinMap { tdi, tck, tms, tdo }),
            _ => {
                let missing = Signal::REQUIRED
                    .into_iter()
                    .filter(|&signal| self.get(signal).is_none())
                    .collect();
                Err(CableError::MissingPins(missing))
            }
        }
    }
}

/// Validated logical-to-physical mapping for the four TAP signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    tdi: u32,
    tck: u32,
    tms: u32,
    tdo: u32,
}

impl PinMap {
    /// Physical line offset of `signal`.
    pub const fn line(&self, signal: Signal) -> u32 {
        match signal {
            Signal::Tdi => self.tdi,
            Signal::Tck => self.tck,
            Signal::Tms => self.tms,
            Signal::Tdo => self.tdo,
        }
    }

    /// Line settings for a reservation: TDO is the only input, every output
    /// starts low.
    pub fn settings(&self) -> [LineSetting; 4] {
        Signal::REQUIRED.map(|signal| LineSetting {
            offset: self.line(signal),
            direction: match signal {
                Signal::Tdo => Direction::Input,
                _ => Direction::Output(Level::Low),
            },
        })
    }
}

struct Active<R> {
    pins: PinMap,
    request: R,
}

/// Owns the single active line request for a cable and performs all of its
/// line I/O, translating logical signals to physical offsets.
pub struct LineController<R: LineRequest> {
    active: Option<Active<R>>,
}

impl<R: LineRequest> LineController<R> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Request the four mapped lines as one named reservation.
    ///
    /// An unavailable controller is tolerated: the cable keeps running with
    /// no request held, and every later line operation reports
    /// [`CableError::NoRequest`] instead.
    pub fn open<P>(
        &mut self,
        provider: &mut P,
        consumer: &str,
        pins: PinMap,
    ) -> Result<(), CableError>
    where
        P: LineProvider<Request = R>,
    {
        match provider.request(consumer, &pins.settings()) {
            Ok(request) => {
                log::debug!(
                    "requested lines tdi={} tck={} tms={} tdo={} as \"{consumer}\"",
                    pins.line(Signal::Tdi),
                    pins.line(Signal::Tck),
                    pins.line(Signal::Tms),
                    pins.line(Signal::Tdo),
                );
                self.active = Some(Active { pins, request });
                Ok(())
            }
            Err(CableError::ControllerUnavailable(reason)) => {
                log::warn!("gpio controller unavailable, continuing without lines: {reason}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Drop the request, releasing the lines. Releasing nothing is a no-op.
    pub fn close(&mut self) {
        if self.active.take().is_some() {
            log::debug!("released line request");
        }
    }

    /// Drive one mapped signal to `level`.
    pub fn set(&mut self, signal: Signal, level: Level) -> Result<(), CableError> {
        match self.active.as_mut() {
            Some(active) => active.request.set_value(active.pins.line(signal), level),
            None => Err(CableError::NoRequest),
        }
    }

    /// Sample one mapped signal.
    pub fn get(&mut self, signal: Signal) -> Result<Level, CableError> {
        match self.active.as_mut() {
            Some(active) => active.request.get_value(active.pins.line(signal)),
            None => Err(CableError::NoRequest),
        }
    }
}

impl<R: LineRequest> Default for LineController<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_overwrites_only_supplied_keys() {
        let mut builder = PinMapBuilder::default();
        builder.set(Signal::Tdi, 1);
        builder.set(Signal::Tck, 2);
        builder.set(Signal::Tms, 3);
        builder.set(Signal::Tdo, 4);
        builder.set(Signal::Tdi, 9);
        let pins = builder.build().unwrap();
        assert_eq!(pins.line(Signal::Tdi), 9);
        assert_eq!(pins.line(Signal::Tck), 2);
        assert_eq!(pins.line(Signal::Tms), 3);
        assert_eq!(pins.line(Signal::Tdo), 4);
    }

    #[test]
    fn build_lists_every_missing_signal() {
        let mut builder = PinMapBuilder::default();
        builder.set(Signal::Tck, 2);
        match builder.build() {
            Err(CableError::MissingPins(missing)) => {
                assert_eq!(missing, vec![Signal::Tdi, Signal::Tms, Signal::Tdo]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
