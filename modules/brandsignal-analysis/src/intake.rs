//! Intake: decide which incoming items are new and relevant.

use std::collections::HashSet;

use tracing::debug;

use brandsignal_common::config::IntakeConfig;
use brandsignal_common::Item;

/// Bodies that mean the author removed the content.
const REMOVED_BODIES: [&str; 2] = ["[deleted]", "[removed]"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IntakeStats {
    pub received: usize,
    pub already_processed: usize,
    pub duplicate_in_batch: usize,
    pub off_topic: usize,
    pub accepted: usize,
}

/// Filter the incoming batch down to items that have never been processed
/// and mention the tracked brand.
///
/// `known_ids` are the ids of the stored corpus. Within the batch the first
/// occurrence of an id wins.
pub fn admit(
    incoming: Vec<Item>,
    known_ids: &HashSet<&str>,
    config: &IntakeConfig,
) -> (Vec<Item>, IntakeStats) {
    let brand_terms: Vec<String> = config
        .brand_terms
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut stats = IntakeStats {
        received: incoming.len(),
        ..Default::default()
    };
    let mut seen: HashSet<String> = HashSet::new();
    let mut admitted = Vec::with_capacity(incoming.len());

    for mut item in incoming {
        if known_ids.contains(item.id.as_str()) {
            stats.already_processed += 1;
            continue;
        }
        if !seen.insert(item.id.clone()) {
            stats.duplicate_in_batch += 1;
            continue;
        }
        if !mentions_brand(&item, &brand_terms) {
            debug!(id = item.id.as_str(), "Dropping item that does not mention the brand");
            stats.off_topic += 1;
            continue;
        }
        if REMOVED_BODIES.contains(&item.body.trim()) {
            item.body.clear();
        }
        admitted.push(item);
    }

    stats.accepted = admitted.len();
    (admitted, stats)
}

fn mentions_brand(item: &Item, lowered_terms: &[String]) -> bool {
    if lowered_terms.is_empty() {
        return true;
    }
    let text = item.analysis_text().to_lowercase();
    lowered_terms.iter().any(|term| text.contains(term.as_str()))
}
