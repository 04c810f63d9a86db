//! Bit-banging JTAG cable driver over general-purpose digital I/O lines.
//!
//! The cable drives a JTAG Test Access Port through four plain digital I/O
//! lines (TCK, TMS, TDI, TDO), mapping logical TAP operations onto blocking
//! line reads and writes. Any line source works: the shipped backend talks
//! to the Linux GPIO character device, and tests run against an in-memory
//! provider.
//!
//! **Note:**
//! This is strictly a development and bring-up tool. Bit-banging issues one
//! blocking system call per signal edge, so throughput is orders of
//! magnitude below dedicated probe hardware.
//!
//! # Quickstart
//!
//! ```no_run
//! use jtag_gpio::cable::gpio::GpioCable;
//! use jtag_gpio::cable::{Cable, Param};
//! use jtag_gpio::lines::cdev::CdevProvider;
//!
//! let params = [Param::Tdi(17), Param::Tdo(18), Param::Tck(22), Param::Tms(27)];
//! let mut cable = GpioCable::connect(CdevProvider::default(), &params)?;
//! cable.init()?;
//! cable.clock(true, false, 5); // Test-Logic-Reset
//! # Ok::<(), jtag_gpio::CableError>(())
//! ```
//!
//! # Limitations
//!
//! * Direct digital-I/O lines only. USB and parallel-port transports are out
//!   of scope.
//! * One JTAG chain per cable instance.

#![forbid(unsafe_code)]

pub mod cable;
pub mod delay;
pub mod lines;

/// Logical TAP signals, in line-request order. TDO comes last since it is
/// the only input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Tdi,
    Tck,
    Tms,
    Tdo,
}

impl Signal {
    /// The four signals every cable must have mapped before lines can be
    /// requested.
    pub const REQUIRED: [Signal; 4] = [Signal::Tdi, Signal::Tck, Signal::Tms, Signal::Tdo];

    /// Parameter key naming this signal.
    pub const fn key(self) -> &'static str {
        match self {
            Signal::Tdi => "tdi",
            Signal::Tck => "tck",
            Signal::Tms => "tms",
            Signal::Tdo => "tdo",
        }
    }
}

fn missing_keys(missing: &[Signal]) -> String {
    missing
        .iter()
        .map(|signal| signal.key())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum CableError {
    /// One or more of the four required pin assignments was never supplied.
    /// Fatal to the connect attempt, not to the process.
    #[error("missing required gpio lines [{}]; {}", missing_keys(.0), crate::cable::gpio::USAGE)]
    MissingPins(Vec<Signal>),

    /// The gpio controller itself could not be opened.
    #[error("gpio controller unavailable: {0}")]
    ControllerUnavailable(String),

    /// Building or submitting the line request failed.
    #[error("line request failed: {0}")]
    Request(String),

    /// A single line read or write failed. Reported once, never retried.
    #[error("i/o on gpio line {0} failed: {1}")]
    LineIo(u32, String),

    /// A line operation ran with no active line request held.
    #[error("no active line request")]
    NoRequest,
}
