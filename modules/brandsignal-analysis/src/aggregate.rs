//! Roll-up counts over the full corpus for reporting.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

use brandsignal_common::config::ReportConfig;
use brandsignal_common::{Burst, Direction, Item, Narrative, PlatformFrom};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeCount {
    pub narrative: Narrative,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    pub last_updated: DateTime<Utc>,
    pub total_items: usize,
    pub items_this_week: usize,
    pub high_bot_suspicion_count: usize,
    pub by_source: BTreeMap<String, usize>,
    /// Descending by count; ties keep vocabulary order.
    pub by_narrative: Vec<NarrativeCount>,
    pub by_platform_from: BTreeMap<PlatformFrom, usize>,
    /// Keyed by `YYYY-MM`, serialized newest month first.
    #[serde(serialize_with = "newest_first")]
    pub by_month: BTreeMap<String, usize>,
    pub by_direction: BTreeMap<Direction, usize>,
    #[serde(serialize_with = "newest_first")]
    pub by_direction_by_month: BTreeMap<String, BTreeMap<Direction, usize>>,
    pub detected_bursts: Vec<Burst>,
}

fn newest_first<S, V>(months: &BTreeMap<String, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(months.iter().rev())
}

fn empty_directions() -> BTreeMap<Direction, usize> {
    Direction::ALL.iter().map(|d| (*d, 0)).collect()
}

/// Build the report. Items without a parseable timestamp count toward totals
/// but not toward any time bucket.
pub fn build_report(
    items: &[Item],
    bursts: &[Burst],
    now: DateTime<Utc>,
    config: &ReportConfig,
) -> CorpusReport {
    let recent_cutoff = now - Duration::days(config.recent_window_days);

    let mut by_source = BTreeMap::new();
    let mut narrative_counts: BTreeMap<Narrative, usize> = BTreeMap::new();
    let mut by_platform_from = BTreeMap::new();
    let mut by_month = BTreeMap::new();
    let mut by_direction = empty_directions();
    let mut by_direction_by_month: BTreeMap<String, BTreeMap<Direction, usize>> = BTreeMap::new();
    let mut items_this_week = 0;
    let mut high_bot_suspicion_count = 0;

    for item in items {
        *by_source.entry(item.source.to_string()).or_insert(0) += 1;
        for narrative in &item.narratives {
            *narrative_counts.entry(*narrative).or_insert(0) += 1;
        }
        *by_platform_from.entry(item.platform_from).or_insert(0) += 1;
        *by_direction.entry(item.direction).or_insert(0) += 1;

        if item.bot_score >= config.high_suspicion_threshold {
            high_bot_suspicion_count += 1;
        }

        if let Some(at) = item.parsed_timestamp() {
            let month = at.format("%Y-%m").to_string();
            *by_month.entry(month.clone()).or_insert(0) += 1;
            *by_direction_by_month
                .entry(month)
                .or_insert_with(empty_directions)
                .entry(item.direction)
                .or_insert(0) += 1;
            if at >= recent_cutoff {
                items_this_week += 1;
            }
        }
    }

    let mut by_narrative: Vec<NarrativeCount> = narrative_counts
        .into_iter()
        .map(|(narrative, count)| NarrativeCount { narrative, count })
        .collect();
    // Stable sort keeps the BTreeMap's vocabulary order among equal counts.
    by_narrative.sort_by(|a, b| b.count.cmp(&a.count));

    CorpusReport {
        last_updated: now,
        total_items: items.len(),
        items_this_week,
        high_bot_suspicion_count,
        by_source,
        by_narrative,
        by_platform_from,
        by_month,
        by_direction,
        by_direction_by_month,
        detected_bursts: bursts.to_vec(),
    }
}
