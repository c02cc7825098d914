//! Campaign burst detection.
//!
//! A burst is 3+ high-suspicion items sharing a narrative label whose
//! timestamps fall inside one 72-hour window. Each narrative reports at most
//! one burst per run: the earliest qualifying window. A denser window that
//! starts later in the same narrative is not reported.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use brandsignal_common::{Burst, Item, Narrative};

pub const BURST_WINDOW_HOURS: i64 = 72;
pub const BURST_MIN_ITEMS: usize = 3;
pub const BURST_SUSPICION_THRESHOLD: f64 = 0.4;

/// An item eligible for burst analysis, with its parsed timestamp.
#[derive(Clone, Copy)]
struct Candidate<'a> {
    at: DateTime<Utc>,
    item: &'a Item,
}

/// Find bursts over the full corpus. Pure; see [`apply_burst_flags`] for the
/// write-back.
pub fn detect_bursts(items: &[Item]) -> Vec<Burst> {
    let mut candidates: Vec<Candidate> = items
        .iter()
        .filter(|item| !item.narratives.is_empty())
        .filter(|item| item.bot_score >= BURST_SUSPICION_THRESHOLD)
        .filter_map(|item| item.parsed_timestamp().map(|at| Candidate { at, item }))
        .collect();

    // Id breaks timestamp ties so member order never depends on corpus order.
    candidates.sort_by(|a, b| a.at.cmp(&b.at).then_with(|| a.item.id.cmp(&b.item.id)));

    let narratives: BTreeSet<Narrative> = candidates
        .iter()
        .flat_map(|c| c.item.narratives.iter().copied())
        .collect();

    let bursts: Vec<Burst> = narratives
        .into_iter()
        .filter_map(|narrative| earliest_burst(narrative, &candidates))
        .collect();

    for burst in &bursts {
        info!(
            narrative = %burst.narrative,
            count = burst.count,
            hours_span = burst.hours_span,
            start = %burst.start,
            "Campaign burst detected"
        );
    }

    bursts
}

fn earliest_burst(narrative: Narrative, candidates: &[Candidate]) -> Option<Burst> {
    let subset: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.item.narratives.contains(&narrative))
        .copied()
        .collect();
    if subset.len() < BURST_MIN_ITEMS {
        return None;
    }

    let window = Duration::hours(BURST_WINDOW_HOURS);
    for anchor in &subset {
        let start = anchor.at;
        let limit = start + window;
        let members: Vec<&Candidate> = subset
            .iter()
            .filter(|c| c.at >= start && c.at <= limit)
            .collect();
        if members.len() < BURST_MIN_ITEMS {
            continue;
        }

        let end = members.iter().map(|c| c.at).max().unwrap_or(start);
        let hours_span = ((end - start).num_seconds() as f64 / 3600.0 * 10.0).round() / 10.0;
        return Some(Burst {
            narrative,
            member_ids: members.iter().map(|c| c.item.id.clone()).collect(),
            start,
            end,
            count: members.len(),
            hours_span,
        });
    }

    None
}

/// Set `campaign_burst` on every burst member. Flags are never cleared, so an
/// item stays marked once any run has placed it in a burst. Returns how many
/// items were newly flagged.
pub fn apply_burst_flags(items: &mut [Item], bursts: &[Burst]) -> usize {
    let members: HashSet<&str> = bursts
        .iter()
        .flat_map(|b| b.member_ids.iter().map(String::as_str))
        .collect();

    let mut newly_flagged = 0;
    for item in items.iter_mut() {
        if !item.campaign_burst && members.contains(item.id.as_str()) {
            item.campaign_burst = true;
            newly_flagged += 1;
        }
    }
    newly_flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandsignal_common::Source;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn suspicious(id: &str, hours: i64, narratives: &[Narrative]) -> Item {
        let mut item = Item::new(id, Source::Reddit);
        item.narratives = narratives.iter().copied().collect();
        item.bot_score = 0.5;
        item.timestamp = Some((base() + Duration::hours(hours)).to_rfc3339());
        item
    }

    #[test]
    fn four_items_within_window_form_one_burst() {
        let items: Vec<Item> = [0, 10, 40, 70]
            .iter()
            .enumerate()
            .map(|(n, h)| suspicious(&format!("reddit_{n}"), *h, &[Narrative::Royalties]))
            .collect();

        let bursts = detect_bursts(&items);
        assert_eq!(bursts.len(), 1);
        let burst = &bursts[0];
        assert_eq!(burst.narrative, Narrative::Royalties);
        assert_eq!(burst.count, 4);
        assert_eq!(burst.start, base());
        assert_eq!(burst.end, base() + Duration::hours(70));
        assert_eq!(burst.hours_span, 70.0);
    }

    #[test]
    fn window_end_is_inclusive() {
        let items = vec![
            suspicious("a", 0, &[Narrative::Quality]),
            suspicious("b", 1, &[Narrative::Quality]),
            suspicious("c", 72, &[Narrative::Quality]),
        ];
        assert_eq!(detect_bursts(&items)[0].count, 3);

        let mut late = items.clone();
        late[2].timestamp = Some((base() + Duration::hours(72) + Duration::seconds(1)).to_rfc3339());
        assert!(detect_bursts(&late).is_empty());
    }

    #[test]
    fn ineligible_items_are_not_candidates() {
        let mut low_score = suspicious("low", 1, &[Narrative::Quality]);
        low_score.bot_score = 0.39;
        let mut undated = suspicious("undated", 2, &[Narrative::Quality]);
        undated.timestamp = Some("not a date".into());
        let untagged = suspicious("untagged", 3, &[]);

        let items = vec![
            suspicious("a", 0, &[Narrative::Quality]),
            suspicious("b", 4, &[Narrative::Quality]),
            low_score,
            undated,
            untagged,
        ];
        assert!(detect_bursts(&items).is_empty());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut items: Vec<Item> = (0..3)
            .map(|n| suspicious(&format!("r{n}"), n, &[Narrative::Degoogle]))
            .collect();
        for item in &mut items {
            item.bot_score = 0.4;
        }
        assert_eq!(detect_bursts(&items).len(), 1);
    }

    #[test]
    fn earliest_qualifying_window_wins() {
        let mut items: Vec<Item> = [0, 10, 20]
            .iter()
            .map(|h| suspicious(&format!("early_{h}"), *h, &[Narrative::AntiSpotify]))
            .collect();
        items.extend(
            [200, 201, 202, 203, 204]
                .iter()
                .map(|h| suspicious(&format!("late_{h}"), *h, &[Narrative::AntiSpotify])),
        );

        let bursts = detect_bursts(&items);
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].count, 3);
        assert!(bursts[0].member_ids.iter().all(|id| id.starts_with("early_")));
    }

    #[test]
    fn window_slides_past_sparse_start() {
        let items = vec![
            suspicious("a", 0, &[Narrative::ProIndie]),
            suspicious("b", 100, &[Narrative::ProIndie]),
            suspicious("c", 110, &[Narrative::ProIndie]),
            suspicious("d", 150, &[Narrative::ProIndie]),
        ];
        let bursts = detect_bursts(&items);
        assert_eq!(bursts.len(), 1);
        assert_eq!(bursts[0].member_ids, vec!["b", "c", "d"]);
        assert_eq!(bursts[0].hours_span, 50.0);
    }

    #[test]
    fn narratives_are_independent_and_may_share_members() {
        let both = [Narrative::Royalties, Narrative::SwitchRecommendation];
        let items = vec![
            suspicious("a", 0, &both),
            suspicious("b", 5, &both),
            suspicious("c", 6, &[Narrative::Royalties]),
            suspicious("d", 7, &[Narrative::SwitchRecommendation]),
        ];
        let bursts = detect_bursts(&items);
        assert_eq!(bursts.len(), 2);
        for burst in &bursts {
            assert_eq!(burst.count, 3);
            assert!(burst.member_ids.contains(&"a".to_string()));
        }
    }

    #[test]
    fn membership_does_not_depend_on_corpus_order() {
        let mut items = vec![
            suspicious("a", 30, &[Narrative::Quality, Narrative::Degoogle]),
            suspicious("b", 0, &[Narrative::Quality]),
            suspicious("c", 30, &[Narrative::Degoogle, Narrative::Quality]),
            suspicious("d", 12, &[Narrative::Degoogle]),
        ];
        let forward = detect_bursts(&items);
        items.reverse();
        assert_eq!(forward, detect_bursts(&items));
    }

    #[test]
    fn no_burst_spans_more_than_window() {
        let items: Vec<Item> = (0..20)
            .map(|n| suspicious(&format!("r{n}"), n * 17, &[Narrative::BoycottIsrael]))
            .collect();
        for burst in detect_bursts(&items) {
            assert!(burst.count >= BURST_MIN_ITEMS);
            assert!(burst.end - burst.start <= Duration::hours(BURST_WINDOW_HOURS));
        }
    }

    #[test]
    fn empty_corpus_has_no_bursts() {
        assert!(detect_bursts(&[]).is_empty());
    }

    #[test]
    fn flags_are_written_back_and_never_cleared() {
        let mut items = vec![
            suspicious("a", 0, &[Narrative::Quality]),
            suspicious("b", 1, &[Narrative::Quality]),
            suspicious("c", 2, &[Narrative::Quality]),
            suspicious("d", 500, &[Narrative::Quality]),
        ];
        items[3].campaign_burst = true;

        let bursts = detect_bursts(&items);
        assert_eq!(apply_burst_flags(&mut items, &bursts), 3);
        assert!(items.iter().all(|i| i.campaign_burst));
        assert_eq!(apply_burst_flags(&mut items, &bursts), 0);
    }
}
