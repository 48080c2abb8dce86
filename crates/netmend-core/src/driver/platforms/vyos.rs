//! VyOS rule table
//!
//! VyOS shares the Junos statement grammar: flat `set`/`delete` lines, with
//! braced saved configs converted to flat form before parsing.

use crate::driver::{Driver, Platform};
use crate::error::Result;

pub(super) fn driver() -> Result<Driver> {
    Ok(Driver::flat(Platform::Vyos))
}
