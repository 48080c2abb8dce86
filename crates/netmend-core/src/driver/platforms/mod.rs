//! Per-platform rule tables
//!
//! One module per supported operating system, each building the declarative
//! [`Driver`] bundle for that platform. The tables are data; all behavior
//! lives in the engine.

mod arista_eos;
mod callbacks;
mod cisco_ios;
mod cisco_nxos;
mod cisco_xr;
mod fortios;
mod generic;
mod juniper_junos;
mod vyos;

use super::{Driver, Platform};
use crate::error::Result;

/// Build the driver for a platform
///
/// # Errors
/// Returns [`crate::Error::InvalidRule`] if a rule table carries a malformed
/// pattern; only reachable while editing the tables themselves.
pub(crate) fn build(platform: Platform) -> Result<Driver> {
    match platform {
        Platform::AristaEos => arista_eos::driver(),
        Platform::CiscoIos => cisco_ios::driver(),
        Platform::CiscoNxos => cisco_nxos::driver(),
        Platform::CiscoXr => cisco_xr::driver(),
        Platform::Fortios => fortios::driver(),
        Platform::Generic => generic::driver(),
        Platform::JuniperJunos => juniper_junos::driver(),
        Platform::Vyos => vyos::driver(),
    }
}
