//! Cable driver interface: the operation table a JTAG cable exposes to the
//! chain layer, plus the signal-mask and parameter types it speaks.

use crate::CableError;
use crate::delay;

pub mod gpio;

/// Cable signal state as the chain layer sees it.
///
/// Bit positions follow the classic pod layout: the shifting triad in the
/// low bits, then the reset lines. TRST and SYSTEM_RESET exist only as
/// statically-asserted convention on cables without those wires.
#[bitfield_struct::bitfield(u8, order = Lsb)]
#[derive(PartialEq, Eq)]
pub struct PodSignals {
    pub tdi: bool,
    pub tck: bool,
    pub tms: bool,
    pub trst: bool,
    pub system_reset: bool,
    #[bits(3)]
    __: u8,
}

impl PodSignals {
    pub const NONE: Self = Self::new();
    pub const TDI: Self = Self::new().with_tdi(true);
    pub const TCK: Self = Self::new().with_tck(true);
    pub const TMS: Self = Self::new().with_tms(true);
    pub const TRST: Self = Self::new().with_trst(true);
    pub const SYSTEM_RESET: Self = Self::new().with_system_reset(true);
    /// The signals a cable drives while shifting.
    pub const DRIVEN: Self = Self::new().with_tdi(true).with_tck(true).with_tms(true);

    /// True if any bit of `other` is set in `self`.
    pub const fn intersects(self, other: Self) -> bool {
        self.into_bits() & other.into_bits() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.into_bits() == 0
    }
}

impl core::ops::BitAnd for PodSignals {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self::from_bits(self.into_bits() & rhs.into_bits())
    }
}

impl core::ops::BitOr for PodSignals {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self::from_bits(self.into_bits() | rhs.into_bits())
    }
}

impl core::ops::Not for PodSignals {
    type Output = Self;
    fn not(self) -> Self {
        Self::from_bits(!self.into_bits())
    }
}

/// Configuration parameters a cable accepts at connect time.
///
/// Pin assignments carry physical line offsets. Keys a driver does not
/// understand are ignored, so one parameter list can serve several drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    Tdi(u32),
    Tdo(u32),
    Tms(u32),
    Tck(u32),
    /// TCK frequency hint; not consumed by the gpio driver.
    Frequency(u32),
    /// Transport interface index; not consumed by the gpio driver.
    Interface(u32),
}

/// Operation table of a JTAG cable driver.
///
/// One method per operation the chain layer invokes. `set_frequency`,
/// `transfer`, `get_signal` and `flush` carry generic defaults that fit any
/// synchronous bit-banged cable; drivers with smarter hardware override
/// them.
pub trait Cable {
    /// Acquire the cable's I/O resources. Where the hardware itself is
    /// absent this may succeed in a degraded, line-less mode.
    fn init(&mut self) -> Result<(), CableError>;

    /// Release the cable's I/O resources. Safe to call repeatedly.
    fn done(&mut self);

    /// Notify the attached chain, then release the I/O resources.
    fn disconnect(&mut self);

    /// Drive TMS and TDI once, then pulse TCK low-high-low `n` times.
    ///
    /// TMS and TDI are stable before the first rising edge and held for the
    /// whole burst. Line failures are not reported; callers observe them
    /// later through TDO sampling.
    fn clock(&mut self, tms: bool, tdi: bool, n: usize);

    /// Park TCK, TDI and TMS low, wait one settle delay, then sample TDO.
    fn get_tdo(&mut self) -> Result<bool, CableError>;

    /// Combined view of statically-asserted and last-driven signals.
    fn current_signals(&self) -> PodSignals;

    /// Drive the signals of `mask` to the levels of `value`.
    ///
    /// Only TDI, TCK and TMS can be changed; other bits of `mask` are
    /// silently dropped. Returns the signal state from before the update.
    fn set_signal(&mut self, mask: PodSignals, value: PodSignals) -> PodSignals;

    /// Whether any bit of `sig` is currently asserted.
    fn get_signal(&self, sig: PodSignals) -> bool {
        self.current_signals().intersects(sig)
    }

    /// Settle delay between parking the lines and sampling TDO, in
    /// microseconds.
    fn pacing_delay(&self) -> u32;

    fn set_pacing_delay(&mut self, micros: u32);

    /// Pace TDO sampling to roughly `frequency_hz` by setting the settle
    /// delay to half a TCK period. Zero disables pacing.
    fn set_frequency(&mut self, frequency_hz: u32) {
        let micros = delay::half_period_us(frequency_hz);
        log::info!("pacing delay {micros}us for {frequency_hz}Hz");
        self.set_pacing_delay(micros);
    }

    /// Shift `tdi` through the chain one bit per clock, TMS held low.
    ///
    /// With `capture` set, TDO is sampled before each clock and the sampled
    /// bits are returned; otherwise the result is empty.
    fn transfer(&mut self, tdi: &[bool], capture: bool) -> Result<Vec<bool>, CableError> {
        let mut tdo = Vec::with_capacity(if capture { tdi.len() } else { 0 });
        for &bit in tdi {
            if capture {
                tdo.push(self.get_tdo()?);
            }
            self.clock(false, bit, 1);
        }
        Ok(tdo)
    }

    /// Push out any queued work. Synchronous cables have none.
    fn flush(&mut self) {}

    /// One-line usage synopsis for connect-time parameters.
    fn help() -> &'static str
    where
        Self: Sized;
}

#[cfg(test)]
mod test {
    use super::PodSignals;
    use crate::delay::half_period_us;

    #[test]
    fn pod_signal_bit_layout() {
        assert_eq!(PodSignals::TDI.into_bits(), 1);
        assert_eq!(PodSignals::TCK.into_bits(), 1 << 1);
        assert_eq!(PodSignals::TMS.into_bits(), 1 << 2);
        assert_eq!(PodSignals::TRST.into_bits(), 1 << 3);
        assert_eq!(PodSignals::SYSTEM_RESET.into_bits(), 1 << 4);
        assert_eq!(
            PodSignals::DRIVEN,
            PodSignals::TDI | PodSignals::TCK | PodSignals::TMS
        );
    }

    #[test]
    fn mask_ops_clear_and_keep_bits() {
        let sigs = PodSignals::TRST | PodSignals::TMS;
        assert_eq!(sigs & !PodSignals::DRIVEN, PodSignals::TRST);
        assert!(sigs.intersects(PodSignals::TMS));
        assert!((sigs & PodSignals::TDI).is_empty());
    }

    #[test]
    fn half_period_follows_frequency() {
        assert_eq!(half_period_us(100_000), 5);
        // one microsecond rounds down to no pacing at all
        assert_eq!(half_period_us(1_000_000), 0);
        assert_eq!(half_period_us(0), 0);
    }
}
