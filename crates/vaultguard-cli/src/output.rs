//! Terminal rendering for command results.
//!
//! Results go to stdout; policy violations go to stderr.

use std::fmt::Display;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;

fn mark(ok: bool) -> ColoredString {
    if ok { "✓".green() } else { "✗".red() }
}

pub fn success(msg: impl Display) {
    println!("{} {msg}", mark(true));
}

/// Report a rule the input broke.
pub fn violation(msg: impl Display) {
    eprintln!("{} {msg}", mark(false));
}

pub fn field(label: &str, value: impl Display) {
    println!("{}: {value}", label.dimmed());
}

/// One line of a rule checklist; unmet rules are dimmed.
pub fn rule(met: bool, label: &str) {
    let label = if met { label.normal() } else { label.dimmed() };
    println!("{} {label}", mark(met));
}

pub fn json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
