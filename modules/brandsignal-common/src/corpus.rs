//! Parsing and structural validation of item sequences.
//!
//! A corpus that is not a sequence of item records must fail the whole batch;
//! aggregate statistics over a half-read corpus would be silently wrong.

use std::collections::HashSet;

use crate::error::BrandSignalError;
use crate::types::Item;

/// Parse a JSON array of item records.
pub fn parse_items(json: &str) -> Result<Vec<Item>, BrandSignalError> {
    serde_json::from_str::<Vec<Item>>(json)
        .map_err(|e| BrandSignalError::InvalidCorpus(e.to_string()))
}

/// Check the invariants every stored corpus must satisfy: non-empty unique
/// ids and in-range bot scores.
pub fn validate_corpus(items: &[Item]) -> Result<(), BrandSignalError> {
    let mut seen = HashSet::with_capacity(items.len());
    for (pos, item) in items.iter().enumerate() {
        if item.id.trim().is_empty() {
            return Err(BrandSignalError::EmptyId(pos));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(BrandSignalError::DuplicateId(item.id.clone()));
        }
        if !(0.0..=1.0).contains(&item.bot_score) {
            return Err(BrandSignalError::InvalidCorpus(format!(
                "item {} has bot_score {} outside [0, 1]",
                item.id, item.bot_score
            )));
        }
    }
    Ok(())
}
