//! Fortinet FortiOS rule table
//!
//! FortiOS blocks are delimited by `config`/`end` and `edit`/`next` markers
//! rather than reliable indentation; indent-adjust rules give the markers a
//! virtual indent and a post-load callback drops the terminator leaves.

use super::callbacks;
use crate::driver::{Driver, IndentAdjustRule, Platform};
use crate::error::Result;
use crate::match_rule::MatchRule;

pub(super) fn driver() -> Result<Driver> {
    let mut driver = Driver::indented(Platform::Fortios);
    driver.indentation = 4;
    driver.negation_prefix = "unset ".to_string();
    // `set <field> <value>` negates to `unset <field> ...`, not `unset set`
    driver.declaration_prefix = "set ".to_string();

    driver.indent_adjust = vec![
        IndentAdjustRule::new(r"^\s*config ", r"^\s*end$")?,
        IndentAdjustRule::new(r"^\s*edit ", r"^\s*next$")?,
    ];

    // Any `set <field> ...` inside a config block is idempotent per field;
    // the platform hook requires the field token to match on both sides.
    driver.idempotent_commands = vec![vec![
        MatchRule::startswith("config "),
        MatchRule::startswith("set "),
    ]];

    driver.post_load_callbacks = vec![callbacks::strip_block_terminators];

    Ok(driver)
}
