//! City extraction from purchase addresses.
//!
//! Addresses look like `"917 1st St, Dallas, TX 75001"`: street, city, then
//! `"ST zip"`. The city label is `"Dallas (TX)"`.

use sales_core::{Error, Result};

/// Parse the `"Name (ST)"` city label from a purchase address.
pub fn parse_city(address: &str) -> Result<String> {
    let segments: Vec<&str> = address.split(',').collect();
    if segments.len() < 3 {
        return Err(Error::data_integrity(format!(
            "address '{address}' has {} segments, expected at least 3",
            segments.len()
        )));
    }

    let name = segments[1].trim();
    if name.is_empty() {
        return Err(Error::data_integrity(format!(
            "address '{address}' has no city name"
        )));
    }

    // The state segment starts with a space, so the state is the first
    // non-empty token.
    let state = segments[2].split_whitespace().next().ok_or_else(|| {
        Error::data_integrity(format!("address '{address}' has no state"))
    })?;

    Ok(format!("{name} ({state})"))
}
