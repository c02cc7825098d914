//! Bot suspicion scoring.
//!
//! Scores an item 0.0 (looks human) to 1.0 (looks automated) from additive,
//! non-negative heuristic signals. Every check reports an explicit outcome so
//! a signal that could not be evaluated is distinguishable from one that was
//! evaluated and stayed quiet.

use std::sync::LazyLock;

use chrono::Timelike;
use regex::Regex;
use tracing::debug;

use brandsignal_common::{parse_timestamp, BotSignal, Item};

use crate::similarity;

/// Posting hours (UTC, inclusive) typical of scheduled bots.
pub const ODD_HOURS: std::ops::RangeInclusive<u32> = 2..=6;

/// Near-duplicate check only runs on comparison text longer than this.
pub const MIN_COMPARISON_CHARS: usize = 50;

/// Only the first this-many characters of each text are compared.
pub const COMPARISON_PREFIX_CHARS: usize = 300;

pub const SIMILARITY_THRESHOLD: f64 = 0.75;

/// Similar items needed to call it a copy-paste campaign.
pub const COPY_PASTE_MIN_MATCHES: usize = 3;

static CAPITALIZED_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+[A-Z][a-z]+\d{3,}$").unwrap());
static NUMERIC_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6,}$").unwrap());

/// Score contribution of each signal.
pub fn weight(signal: BotSignal) -> f64 {
    match signal {
        BotSignal::VeryNewAccount => 0.35,
        BotSignal::NewAccount => 0.20,
        BotSignal::VeryLowKarma => 0.25,
        BotSignal::LowKarma => 0.15,
        BotSignal::NewAndLowKarma => 0.10,
        BotSignal::OddHourPost => 0.08,
        BotSignal::CopyPasteCampaign => 0.35,
        BotSignal::SimilarToOtherPosts => 0.15,
        BotSignal::UsernamePattern => 0.10,
        BotSignal::NumericUsernameSuffix => 0.08,
    }
}

// ---------------------------------------------------------------------------
// Check outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    AccountAge,
    Karma,
    NewAndLowKarma,
    PostingHour,
    NearDuplicate,
    Username,
}

/// Why a check could not be evaluated for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inapplicable {
    /// The item's source never exposes account age or karma.
    SourceWithoutIdentity,
    MissingAccountAge,
    MissingKarma,
    MissingTimestamp,
    UnparseableTimestamp,
    TextTooShort,
    NoAuthor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fired(BotSignal),
    Clear,
    NotApplicable(Inapplicable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub check: Check,
    pub outcome: Outcome,
}

impl CheckResult {
    fn new(check: Check, outcome: Outcome) -> Self {
        Self { check, outcome }
    }
}

/// Final score plus the trail that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct BotAssessment {
    /// Clamped to 1.0, rounded to 3 decimals.
    pub score: f64,
    /// Fired signals in check order.
    pub signals: Vec<BotSignal>,
    pub checks: Vec<CheckResult>,
}

impl BotAssessment {
    fn from_checks(checks: Vec<CheckResult>) -> Self {
        let signals: Vec<BotSignal> = checks
            .iter()
            .filter_map(|c| match c.outcome {
                Outcome::Fired(signal) => Some(signal),
                _ => None,
            })
            .collect();
        let raw: f64 = signals.iter().map(|s| weight(*s)).sum();
        let score = (raw.min(1.0) * 1000.0).round() / 1000.0;
        Self {
            score,
            signals,
            checks,
        }
    }

    pub fn outcome(&self, check: Check) -> Option<Outcome> {
        self.checks
            .iter()
            .find(|c| c.check == check)
            .map(|c| c.outcome)
    }
}

// ---------------------------------------------------------------------------
// Comparison corpus
// ---------------------------------------------------------------------------

struct ComparisonEntry {
    id: String,
    prefix: Vec<char>,
}

/// Truncated comparison text of every item in a corpus snapshot, built once
/// per run and shared by every item scored in that run.
pub struct ComparisonCorpus {
    entries: Vec<ComparisonEntry>,
}

impl ComparisonCorpus {
    pub fn build(items: &[Item]) -> Self {
        let entries = items
            .iter()
            .filter_map(|item| {
                let text = item.comparison_text();
                if text.trim().is_empty() {
                    return None;
                }
                Some(ComparisonEntry {
                    id: item.id.clone(),
                    prefix: text.chars().take(COMPARISON_PREFIX_CHARS).collect(),
                })
            })
            .collect();
        Self { entries }
    }

    /// Number of entries other than `id` whose prefix is similar to `prefix`.
    pub fn count_similar(&self, id: &str, prefix: &[char]) -> usize {
        self.entries
            .iter()
            .filter(|e| e.id != id)
            .filter(|e| similarity::exceeds(prefix, &e.prefix, SIMILARITY_THRESHOLD))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score one item against a corpus snapshot that includes the item itself.
pub fn score_item(item: &Item, corpus: &ComparisonCorpus) -> BotAssessment {
    let mut checks = Vec::with_capacity(6);
    checks.extend(check_identity(item));
    checks.push(CheckResult::new(Check::PostingHour, check_posting_hour(item)));
    checks.push(CheckResult::new(
        Check::NearDuplicate,
        check_near_duplicate(item, corpus),
    ));
    checks.push(CheckResult::new(Check::Username, check_username(&item.author)));

    let assessment = BotAssessment::from_checks(checks);
    debug!(
        id = item.id.as_str(),
        score = assessment.score,
        signals = assessment.signals.len(),
        "Scored item"
    );
    assessment
}

/// Convenience for one-off scoring: builds the comparison corpus from `items`.
pub fn score_against(item: &Item, items: &[Item]) -> BotAssessment {
    score_item(item, &ComparisonCorpus::build(items))
}

fn check_identity(item: &Item) -> [CheckResult; 3] {
    if !item.source.carries_author_metadata() {
        let skipped = Outcome::NotApplicable(Inapplicable::SourceWithoutIdentity);
        return [
            CheckResult::new(Check::AccountAge, skipped),
            CheckResult::new(Check::Karma, skipped),
            CheckResult::new(Check::NewAndLowKarma, skipped),
        ];
    }

    let age = match item.author_age_days {
        None => Outcome::NotApplicable(Inapplicable::MissingAccountAge),
        Some(days) if days < 30 => Outcome::Fired(BotSignal::VeryNewAccount),
        Some(days) if days < 90 => Outcome::Fired(BotSignal::NewAccount),
        Some(_) => Outcome::Clear,
    };

    let karma = match item.author_karma {
        None => Outcome::NotApplicable(Inapplicable::MissingKarma),
        Some(k) if k < 10 => Outcome::Fired(BotSignal::VeryLowKarma),
        Some(k) if k < 100 => Outcome::Fired(BotSignal::LowKarma),
        Some(_) => Outcome::Clear,
    };

    let combo = match (item.author_age_days, item.author_karma) {
        (None, _) => Outcome::NotApplicable(Inapplicable::MissingAccountAge),
        (_, None) => Outcome::NotApplicable(Inapplicable::MissingKarma),
        (Some(days), Some(k)) if days < 90 && k < 50 => Outcome::Fired(BotSignal::NewAndLowKarma),
        _ => Outcome::Clear,
    };

    [
        CheckResult::new(Check::AccountAge, age),
        CheckResult::new(Check::Karma, karma),
        CheckResult::new(Check::NewAndLowKarma, combo),
    ]
}

fn check_posting_hour(item: &Item) -> Outcome {
    let Some(raw) = item.timestamp.as_deref().filter(|s| !s.is_empty()) else {
        return Outcome::NotApplicable(Inapplicable::MissingTimestamp);
    };
    match parse_timestamp(raw) {
        None => Outcome::NotApplicable(Inapplicable::UnparseableTimestamp),
        Some(dt) if ODD_HOURS.contains(&dt.hour()) => Outcome::Fired(BotSignal::OddHourPost),
        Some(_) => Outcome::Clear,
    }
}

fn check_near_duplicate(item: &Item, corpus: &ComparisonCorpus) -> Outcome {
    let text = item.comparison_text();
    if text.trim().is_empty() || text.chars().count() <= MIN_COMPARISON_CHARS {
        return Outcome::NotApplicable(Inapplicable::TextTooShort);
    }
    let prefix: Vec<char> = text.chars().take(COMPARISON_PREFIX_CHARS).collect();
    match corpus.count_similar(&item.id, &prefix) {
        0 => Outcome::Clear,
        n if n >= COPY_PASTE_MIN_MATCHES => Outcome::Fired(BotSignal::CopyPasteCampaign),
        _ => Outcome::Fired(BotSignal::SimilarToOtherPosts),
    }
}

/// Name-pattern signals. The capitalized-pair pattern is tested first and
/// wins when both match.
fn check_username(author: &str) -> Outcome {
    if author.is_empty() {
        return Outcome::NotApplicable(Inapplicable::NoAuthor);
    }
    if CAPITALIZED_PAIR_RE.is_match(author) {
        Outcome::Fired(BotSignal::UsernamePattern)
    } else if NUMERIC_SUFFIX_RE.is_match(author) {
        Outcome::Fired(BotSignal::NumericUsernameSuffix)
    } else {
        Outcome::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandsignal_common::Source;

    const CAMPAIGN_TEXT: &str =
        "Switch to Qobuz today, it pays artists far more than any other streaming service out there";

    fn reddit_item(id: &str) -> Item {
        let mut item = Item::new(id, Source::Reddit);
        item.author = "quiet_listener".into();
        item.timestamp = Some("2024-05-01T14:00:00+00:00".into());
        item
    }

    fn with_text(id: &str, body: &str) -> Item {
        let mut item = reddit_item(id);
        item.body = body.into();
        item
    }

    #[test]
    fn very_new_low_karma_account() {
        let mut item = reddit_item("reddit_1");
        item.author_age_days = Some(5);
        item.author_karma = Some(2);

        let result = score_against(&item, std::slice::from_ref(&item));
        assert_eq!(
            result.signals,
            vec![
                BotSignal::VeryNewAccount,
                BotSignal::VeryLowKarma,
                BotSignal::NewAndLowKarma
            ]
        );
        assert_eq!(result.score, 0.7);
    }

    #[test]
    fn odd_hour_adds_to_identity_signals() {
        let mut item = reddit_item("reddit_1");
        item.author_age_days = Some(5);
        item.author_karma = Some(2);
        item.timestamp = Some("2024-05-01T04:00:00+00:00".into());

        let result = score_against(&item, std::slice::from_ref(&item));
        assert_eq!(result.signals.last(), Some(&BotSignal::OddHourPost));
        assert_eq!(result.score, 0.78);
    }

    #[test]
    fn mid_range_account_gets_lower_tiers() {
        let mut item = reddit_item("reddit_1");
        item.author_age_days = Some(60);
        item.author_karma = Some(75);

        let result = score_against(&item, &[]);
        assert_eq!(result.signals, vec![BotSignal::NewAccount, BotSignal::LowKarma]);
        assert_eq!(result.score, 0.35);
        assert_eq!(result.outcome(Check::NewAndLowKarma), Some(Outcome::Clear));
    }

    #[test]
    fn identity_boundaries() {
        let mut item = reddit_item("reddit_1");
        item.author_age_days = Some(30);
        item.author_karma = Some(10);
        let result = score_against(&item, &[]);
        assert_eq!(
            result.signals,
            vec![BotSignal::NewAccount, BotSignal::LowKarma, BotSignal::NewAndLowKarma]
        );

        item.author_age_days = Some(90);
        item.author_karma = Some(100);
        assert!(score_against(&item, &[]).signals.is_empty());
    }

    #[test]
    fn identity_signals_skip_sources_without_metadata() {
        let mut item = reddit_item("news_1");
        item.source = Source::News;
        item.author_age_days = Some(1);
        item.author_karma = Some(0);

        let result = score_against(&item, &[]);
        assert!(result.signals.is_empty());
        assert_eq!(
            result.outcome(Check::AccountAge),
            Some(Outcome::NotApplicable(Inapplicable::SourceWithoutIdentity))
        );
    }

    #[test]
    fn missing_metadata_is_neutral_not_penalized() {
        let mut item = reddit_item("reddit_1");
        item.author_karma = Some(3);

        let result = score_against(&item, &[]);
        assert_eq!(result.signals, vec![BotSignal::VeryLowKarma]);
        assert_eq!(
            result.outcome(Check::AccountAge),
            Some(Outcome::NotApplicable(Inapplicable::MissingAccountAge))
        );
        assert_eq!(
            result.outcome(Check::NewAndLowKarma),
            Some(Outcome::NotApplicable(Inapplicable::MissingAccountAge))
        );
    }

    #[test]
    fn unparseable_timestamp_only_skips_hour_check() {
        let mut item = reddit_item("reddit_1");
        item.author_age_days = Some(5);
        item.timestamp = Some("last tuesday".into());

        let result = score_against(&item, &[]);
        assert_eq!(result.signals, vec![BotSignal::VeryNewAccount]);
        assert_eq!(
            result.outcome(Check::PostingHour),
            Some(Outcome::NotApplicable(Inapplicable::UnparseableTimestamp))
        );

        item.timestamp = None;
        assert_eq!(
            score_against(&item, &[]).outcome(Check::PostingHour),
            Some(Outcome::NotApplicable(Inapplicable::MissingTimestamp))
        );
    }

    #[test]
    fn odd_hour_window_is_inclusive() {
        for (ts, fired) in [
            ("2024-05-01T01:59:59Z", false),
            ("2024-05-01T02:00:00Z", true),
            ("2024-05-01T06:59:00Z", true),
            ("2024-05-01T07:00:00Z", false),
        ] {
            let mut item = reddit_item("reddit_1");
            item.timestamp = Some(ts.into());
            let outcome = score_against(&item, &[]).outcome(Check::PostingHour);
            assert_eq!(outcome == Some(Outcome::Fired(BotSignal::OddHourPost)), fired, "{ts}");
        }
    }

    #[test]
    fn one_similar_item_is_lower_tier() {
        let item = with_text("reddit_1", CAMPAIGN_TEXT);
        let corpus = vec![item.clone(), with_text("reddit_2", CAMPAIGN_TEXT)];

        let result = score_against(&item, &corpus);
        assert_eq!(result.signals, vec![BotSignal::SimilarToOtherPosts]);
        assert_eq!(result.score, 0.15);
    }

    #[test]
    fn three_similar_items_is_copy_paste_campaign() {
        let item = with_text("reddit_1", CAMPAIGN_TEXT);
        let mut corpus = vec![item.clone()];
        for n in 2..=4 {
            corpus.push(with_text(&format!("reddit_{n}"), CAMPAIGN_TEXT));
        }

        let result = score_against(&item, &corpus);
        assert_eq!(result.signals, vec![BotSignal::CopyPasteCampaign]);
        assert_eq!(result.score, 0.35);
    }

    #[test]
    fn self_is_excluded_from_similarity() {
        let item = with_text("reddit_1", CAMPAIGN_TEXT);
        let result = score_against(&item, std::slice::from_ref(&item));
        assert_eq!(result.outcome(Check::NearDuplicate), Some(Outcome::Clear));
    }

    #[test]
    fn short_text_skips_similarity() {
        let item = with_text("reddit_1", "switch to qobuz");
        let corpus = vec![item.clone(), with_text("reddit_2", "switch to qobuz")];
        assert_eq!(
            score_against(&item, &corpus).outcome(Check::NearDuplicate),
            Some(Outcome::NotApplicable(Inapplicable::TextTooShort))
        );
    }

    #[test]
    fn length_gate_counts_characters_not_bytes() {
        // Comparison text is body + " " + empty title.
        let at_limit = "é".repeat(49);
        let item = with_text("reddit_1", &at_limit);
        let corpus = vec![item.clone(), with_text("reddit_2", &at_limit)];
        assert_eq!(
            score_against(&item, &corpus).outcome(Check::NearDuplicate),
            Some(Outcome::NotApplicable(Inapplicable::TextTooShort))
        );

        let over_limit = "é".repeat(50);
        let item = with_text("reddit_1", &over_limit);
        let corpus = vec![item.clone(), with_text("reddit_2", &over_limit)];
        assert_eq!(
            score_against(&item, &corpus).outcome(Check::NearDuplicate),
            Some(Outcome::Fired(BotSignal::SimilarToOtherPosts))
        );
    }

    #[test]
    fn only_the_leading_prefix_is_compared() {
        let shared = "Qobuz pays artists more. ".repeat(12);
        assert_eq!(shared.chars().count(), COMPARISON_PREFIX_CHARS);

        let item = with_text("reddit_1", &format!("{shared}{}", "x".repeat(200)));
        let other = with_text("reddit_2", &format!("{shared}{}", "y".repeat(200)));
        let result = score_against(&item, &[item.clone(), other]);
        assert_eq!(result.signals, vec![BotSignal::SimilarToOtherPosts]);
    }

    #[test]
    fn capitalized_pair_wins_over_numeric_suffix() {
        // Matches both patterns; only the first one counts.
        assert_eq!(
            check_username("JohnSmith123456"),
            Outcome::Fired(BotSignal::UsernamePattern)
        );
        assert_eq!(
            check_username("listener_8812345"),
            Outcome::Fired(BotSignal::NumericUsernameSuffix)
        );
        assert_eq!(check_username("JohnSmith12"), Outcome::Clear);
        assert_eq!(check_username("johnsmith123"), Outcome::Clear);
        assert_eq!(
            check_username(""),
            Outcome::NotApplicable(Inapplicable::NoAuthor)
        );
    }

    #[test]
    fn username_signals_apply_to_any_source() {
        let mut item = reddit_item("news_1");
        item.source = Source::News;
        item.author = "MariaGarcia2024".into();
        assert_eq!(score_against(&item, &[]).signals, vec![BotSignal::UsernamePattern]);
    }

    #[test]
    fn score_is_clamped_to_one() {
        let mut item = with_text("reddit_1", CAMPAIGN_TEXT);
        item.author = "JohnSmith123456".into();
        item.author_age_days = Some(1);
        item.author_karma = Some(1);
        item.timestamp = Some("2024-05-01T03:00:00Z".into());
        let mut corpus = vec![item.clone()];
        for n in 2..=4 {
            corpus.push(with_text(&format!("reddit_{n}"), CAMPAIGN_TEXT));
        }

        let result = score_against(&item, &corpus);
        assert_eq!(result.signals.len(), 6);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn result_does_not_depend_on_corpus_order() {
        let mut item = with_text("reddit_1", CAMPAIGN_TEXT);
        item.author_age_days = Some(45);
        let mut corpus = vec![
            item.clone(),
            with_text("reddit_2", CAMPAIGN_TEXT),
            with_text("reddit_3", "Completely unrelated text about vinyl record cleaning fluids and brushes"),
        ];
        let forward = score_against(&item, &corpus);
        corpus.reverse();
        assert_eq!(forward, score_against(&item, &corpus));
    }
}
