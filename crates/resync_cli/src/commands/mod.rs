//! CLI command implementations.

pub mod inventory;
pub mod read;

/// Splits a `LEFT=RIGHT` mapping argument.
pub fn parse_mapping(arg: &str) -> Result<(&str, &str), String> {
    match arg.split_once('=') {
        Some((left, right)) if !left.is_empty() && !right.is_empty() => Ok((left, right)),
        _ => Err(format!("invalid mapping {arg:?}, expected LEFT=RIGHT")),
    }
}
