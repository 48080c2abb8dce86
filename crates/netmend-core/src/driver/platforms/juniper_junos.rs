//! Juniper Junos rule table
//!
//! Junos configuration is handled in the flat `set`/`delete` form; braced
//! input is converted to flat statements before parsing. Negation swaps the
//! `set ` declaration prefix for `delete `.

use crate::driver::{Driver, Platform};
use crate::error::Result;

pub(super) fn driver() -> Result<Driver> {
    Ok(Driver::flat(Platform::JuniperJunos))
}
