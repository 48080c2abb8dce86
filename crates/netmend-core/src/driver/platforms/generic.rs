//! Rule-free driver for unrecognized indentation-structured configs

use crate::driver::{Driver, Platform};
use crate::error::Result;

pub(super) fn driver() -> Result<Driver> {
    Ok(Driver::indented(Platform::Generic))
}
