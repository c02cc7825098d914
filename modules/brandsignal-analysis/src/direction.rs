use std::collections::BTreeSet;

use brandsignal_common::{Direction, Narrative};

use crate::narrative::any_keyword;

pub const CRITICISM_KEYWORDS: &[&str] = &[
    "not working",
    "broken",
    "bug",
    "crash",
    "issue",
    "problem",
    "complaint",
    "cancel",
    "refund",
    "leaving qobuz",
    "switched from qobuz",
    "worse than",
    "qobuz sucks",
    "disappointed",
    "poor customer",
    "missing album",
    "missing artist",
    "catalog gap",
    "no support",
    "customer service",
    "billing",
    "overpriced",
    "price hike",
    "too expensive",
    "app is bad",
    "app is terrible",
    "qobuz lacks",
];

pub const PRO_KEYWORDS: &[&str] = &[
    "switch to qobuz",
    "switched to qobuz",
    "switching to qobuz",
    "recommend qobuz",
    "qobuz is better",
    "moved to qobuz",
    "love qobuz",
    "qobuz over",
    "best streaming",
    "from spotify to qobuz",
];

/// Classify stance toward the brand.
///
/// A pro signal overrides criticism: "switched to Qobuz, the app has a bug"
/// is pro. A switch-recommendation narrative counts as a pro signal even
/// without a pro keyword.
pub fn detect_direction(text: &str, narratives: &BTreeSet<Narrative>) -> Direction {
    let lower = text.to_lowercase();
    let is_critical = any_keyword(&lower, CRITICISM_KEYWORDS);
    let is_pro = any_keyword(&lower, PRO_KEYWORDS)
        || narratives.contains(&Narrative::SwitchRecommendation);

    if is_critical && !is_pro {
        Direction::Critical
    } else if is_pro {
        Direction::Pro
    } else {
        Direction::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criticism_alone_is_critical() {
        let d = detect_direction("Qobuz billing charged me twice", &BTreeSet::new());
        assert_eq!(d, Direction::Critical);
    }

    #[test]
    fn pro_keyword_beats_criticism() {
        let d = detect_direction(
            "I love Qobuz even though the app has a bug or two",
            &BTreeSet::new(),
        );
        assert_eq!(d, Direction::Pro);
    }

    #[test]
    fn switch_narrative_counts_as_pro() {
        let narratives = BTreeSet::from([Narrative::SwitchRecommendation]);
        let d = detect_direction("the search is broken", &narratives);
        assert_eq!(d, Direction::Pro);
    }

    #[test]
    fn other_narratives_do_not_make_it_pro() {
        let narratives = BTreeSet::from([Narrative::Quality, Narrative::Royalties]);
        assert_eq!(detect_direction("the catalog is fine", &narratives), Direction::Neutral);
    }

    #[test]
    fn empty_text_is_neutral() {
        assert_eq!(detect_direction("", &BTreeSet::new()), Direction::Neutral);
    }
}
