//! One scheduled batch run over a fully materialized corpus snapshot.
//!
//! intake → tag + classify (new items) → score (new items against the whole
//! corpus) → burst detection (whole corpus) → report.
//!
//! Stored items are read-only comparison context. Only newly admitted items
//! are tagged and scored, so a run costs (new items × corpus size) similarity
//! comparisons rather than a full pairwise rescan.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::info;

use brandsignal_common::{validate_corpus, BrandSignalError, Burst, FileConfig, Item};

use crate::aggregate::{build_report, CorpusReport};
use crate::bot_score::{score_item, ComparisonCorpus};
use crate::burst::{apply_burst_flags, detect_bursts};
use crate::direction::detect_direction;
use crate::intake::{admit, IntakeStats};
use crate::narrative::{detect_platform_from, tag_narratives};

/// Stats from a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub intake: IntakeStats,
    pub corpus_size: usize,
    pub items_scored: usize,
    pub bursts_detected: usize,
    pub items_newly_flagged: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} already_processed={} duplicate_in_batch={} off_topic={} scored={} corpus_size={} bursts={} newly_flagged={}",
            self.intake.received,
            self.intake.already_processed,
            self.intake.duplicate_in_batch,
            self.intake.off_topic,
            self.items_scored,
            self.corpus_size,
            self.bursts_detected,
            self.items_newly_flagged,
        )
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// Stored items followed by the newly admitted ones.
    pub items: Vec<Item>,
    pub bursts: Vec<Burst>,
    pub report: CorpusReport,
    pub stats: RunStats,
}

/// Apply narrative tags, platform of origin, and stance to a new item.
pub fn classify(item: &mut Item) {
    let text = item.analysis_text();
    item.narratives = tag_narratives(&text);
    item.platform_from = detect_platform_from(&text);
    item.direction = detect_direction(&text, &item.narratives);
}

/// Run one batch. Fails only when the input is structurally invalid.
pub fn run_batch(
    existing: Vec<Item>,
    incoming: Vec<Item>,
    config: &FileConfig,
    now: DateTime<Utc>,
) -> Result<BatchOutcome, BrandSignalError> {
    validate_corpus(&existing)?;
    if let Some(pos) = incoming.iter().position(|i| i.id.trim().is_empty()) {
        return Err(BrandSignalError::EmptyId(pos));
    }

    let known_ids: HashSet<&str> = existing.iter().map(|i| i.id.as_str()).collect();
    let (mut admitted, intake) = admit(incoming, &known_ids, &config.intake);
    drop(known_ids);

    for item in &mut admitted {
        classify(item);
    }

    let first_new = existing.len();
    let mut items = existing;
    items.extend(admitted);

    let comparison = ComparisonCorpus::build(&items);
    for item in &mut items[first_new..] {
        let assessment = score_item(item, &comparison);
        item.bot_score = assessment.score;
        item.bot_signals = assessment.signals;
    }

    let bursts = detect_bursts(&items);
    let items_newly_flagged = apply_burst_flags(&mut items, &bursts);
    let report = build_report(&items, &bursts, now, &config.report);

    let stats = RunStats {
        items_scored: items.len() - first_new,
        corpus_size: items.len(),
        bursts_detected: bursts.len(),
        items_newly_flagged,
        intake,
    };
    info!("Batch run complete. {stats}");

    Ok(BatchOutcome {
        items,
        bursts,
        report,
        stats,
    })
}
