//! Text-to-tree parsing
//!
//! Dispatches on the driver's config style: indentation-structured text goes
//! through the [`indented`] parser, Junos-style statement text through the
//! [`flat`] parser. Post-load callbacks run here, after either parser.

mod flat;
mod indented;

use crate::driver::{ConfigStyle, Driver};
use crate::error::Result;
use crate::tree::node::ConfigNode;
use tracing::debug;

/// Parse configuration text into an existing root node
pub(crate) fn parse_into(driver: &Driver, text: &str, root: &mut ConfigNode) -> Result<()> {
    debug!(
        platform = %driver.platform,
        bytes = text.len(),
        "parsing configuration"
    );
    match driver.style {
        ConfigStyle::Indented => indented::parse(driver, text, root)?,
        ConfigStyle::Flat => flat::parse(text, root)?,
    }
    for callback in &driver.post_load_callbacks {
        callback(root);
    }
    debug!(
        platform = %driver.platform,
        nodes = root.all_children().count(),
        "parsed configuration"
    );
    Ok(())
}
