//! Read the IDCODE of the first device on the chain through a bit-banged
//! gpio cable.
//!
//! Wire the TAP header to free lines of /dev/gpiochip0 and pass their
//! offsets:
//!
//! ```bash
//! RUST_LOG=info cargo run --example idcode -- 17 18 22 27
//! ```
//!
//! The four arguments are the tdi, tdo, tck and tms line offsets.

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run()
}

#[cfg(target_os = "linux")]
fn run() -> anyhow::Result<()> {
    use jtag_gpio::cable::gpio::GpioCable;
    use jtag_gpio::cable::{Cable, Param};
    use jtag_gpio::lines::cdev::CdevProvider;

    let offsets: Vec<u32> = std::env::args()
        .skip(1)
        .map(|arg| arg.parse())
        .collect::<Result<_, _>>()?;
    anyhow::ensure!(offsets.len() == 4, "expected: idcode <tdi> <tdo> <tck> <tms>");

    let params = [
        Param::Tdi(offsets[0]),
        Param::Tdo(offsets[1]),
        Param::Tck(offsets[2]),
        Param::Tms(offsets[3]),
    ];
    let mut cable = GpioCable::connect(CdevProvider::default(), &params)?;
    cable.init()?;

    // Test-Logic-Reset, then walk to Shift-DR: idle, select-dr, capture-dr,
    // shift-dr.
    cable.clock(true, false, 5);
    for tms in [false, true, false, false] {
        cable.clock(tms, false, 1);
    }

    // In reset every IDCODE-capable device preloads DR with its id; shift
    // out the first 32 bits, LSB first.
    let bits = cable.transfer(&vec![false; 32], true)?;
    let idcode = bits
        .iter()
        .rev()
        .fold(0u32, |acc, &bit| (acc << 1) | bit as u32);
    if idcode == 0 || idcode == u32::MAX {
        println!("no device responded (tdo stuck at {})", idcode & 1);
    } else {
        println!("idcode: {idcode:#010x}");
    }

    cable.disconnect();
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run() -> anyhow::Result<()> {
    anyhow::bail!("the gpio cable needs the linux gpio character device");
}
