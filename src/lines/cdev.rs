//! Linux GPIO character-device backend.

use std::path::PathBuf;

use gpiocdev::line::Value;
use gpiocdev::request::Request;

use super::{Direction, Level, LineProvider, LineRequest, LineSetting};
use crate::CableError;

/// Character device of the first gpio controller.
pub const DEFAULT_CHIP: &str = "/dev/gpiochip0";

/// Line provider backed by one `/dev/gpiochipN` device.
pub struct CdevProvider {
    path: PathBuf,
}

impl CdevProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for CdevProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CHIP)
    }
}

impl LineProvider for CdevProvider {
    type Request = CdevLines;

    fn request(
        &mut self,
        consumer: &str,
        settings: &[LineSetting],
    ) -> Result<CdevLines, CableError> {
        // Probing the chip separately keeps "no controller at all" apart
        // from a failed line reservation.
        gpiocdev::chip::Chip::from_path(self.path.clone())
            .map_err(|e| CableError::ControllerUnavailable(e.to_string()))?;

        let mut builder = Request::builder();
        builder.on_chip(self.path.clone()).with_consumer(consumer);
        for setting in settings {
            builder.with_line(setting.offset);
            match setting.direction {
                Direction::Input => builder.as_input(),
                Direction::Output(level) => builder.as_output(value_of(level)),
            };
        }
        let request = builder
            .request()
            .map_err(|e| CableError::Request(e.to_string()))?;
        Ok(CdevLines { request })
    }
}

/// An active reservation; the kernel releases the lines when it drops.
pub struct CdevLines {
    request: Request,
}

impl LineRequest for CdevLines {
    fn set_value(&mut self, offset: u32, level: Level) -> Result<(), CableError> {
        self.request
            .set_value(offset, value_of(level))
            .map(|_| ())
            .map_err(|e| CableError::LineIo(offset, e.to_string()))
    }

    fn get_value(&mut self, offset: u32) -> Result<Level, CableError> {
        let value = self
            .request
            .value(offset)
            .map_err(|e| CableError::LineIo(offset, e.to_string()))?;
        Ok(Level::from(value == Value::Active))
    }
}

fn value_of(level: Level) -> Value {
    match level {
        Level::High => Value::Active,
        Level::Low => Value::Inactive,
    }
}
