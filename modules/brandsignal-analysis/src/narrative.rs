//! Keyword tagging: narrative labels and the platform an author is leaving.
//!
//! Both tables are fixed lookup data. Matching is case-insensitive substring
//! search; any keyword hit applies the label.

use std::collections::BTreeSet;

use brandsignal_common::{Narrative, PlatformFrom};

/// Narrative label → keywords. Order is the tagging priority order.
pub const NARRATIVE_RULES: &[(Narrative, &[&str])] = &[
    (
        Narrative::Royalties,
        &[
            "pays artists",
            "royalties",
            "5x more",
            "five times",
            "fair pay",
            "artist pay",
            "artist payment",
            "pays musicians",
            "revenue share",
            "pays more",
            "better for artists",
            "artist compensation",
            "sustainable",
            "redistributed royalties",
            "streaming payouts",
            "per stream",
            "pays labels",
            "music economy",
        ],
    ),
    (
        Narrative::Quality,
        &[
            "lossless",
            "hi-fi",
            "hifi",
            "high fidelity",
            "24-bit",
            "24bit",
            "flac",
            "wav",
            "sound quality",
            "audiophile",
            "high resolution",
            "hi-res",
            "hires",
            "studio quality",
            "cd quality",
            "master quality",
            "mqa",
            "320kbps",
            "high quality audio",
            "better audio",
            "superior sound",
            "better sound",
            "quality streaming",
            "no compression",
        ],
    ),
    (
        Narrative::AntiCeo,
        &[
            "daniel ek",
            "weapons",
            "drone",
            "700m",
            "investment",
            "military",
            "arms",
            "defense",
            "ek invested",
            "spotify ceo",
            "arms manufacturer",
            "embargo",
            "surveillance",
            "spotify founder",
            "war",
            "palantir",
            "anduril",
            "shield ai",
            "silicon valley",
            "tech billionaire",
        ],
    ),
    (
        Narrative::BoycottIsrael,
        &[
            "boycott",
            "israel",
            "bds",
            "apartheid",
            "palestinian",
            "genocide",
            "occupation",
            "zionist",
            "free palestine",
            "decolonize",
            "ethnic cleansing",
            "war crimes",
            "idf",
            "gaza",
            "west bank",
            "settler",
        ],
    ),
    (
        Narrative::Degoogle,
        &[
            "degoogle",
            "de-google",
            "privacy",
            "big tech",
            "surveillance capitalism",
            "data collection",
            "tracking",
            "algorithmic",
            "algorithm",
            "independent",
            "no ads",
            "ad-free",
            "deamazon",
            "big streaming",
            "corporate streaming",
            "monopoly",
            "antitrust",
            "walled garden",
        ],
    ),
    (
        Narrative::AntiSpotify,
        &[
            "quit spotify",
            "leave spotify",
            "death to spotify",
            "delete spotify",
            "cancel spotify",
            "drop spotify",
            "dump spotify",
            "ditch spotify",
            "boycott spotify",
            "fuck spotify",
            "f spotify",
            "hate spotify",
            "spotify is garbage",
            "spotify is trash",
            "spotify sucks",
            "moving away from spotify",
            "leaving spotify",
            "switched from spotify",
            "no longer use spotify",
            "unsubscribed from spotify",
        ],
    ),
    (
        Narrative::ProIndie,
        &[
            "independent artists",
            "indie artists",
            "diy",
            "direct pay",
            "small artists",
            "unsigned artists",
            "local artists",
            "emerging artists",
            "new artists",
            "artist first",
            "support artists",
            "music community",
            "grassroots",
            "authentic music",
            "curated music",
            "editorial team",
            "music experts",
            "music lovers",
            "music enthusiasts",
        ],
    ),
    (
        Narrative::SwitchRecommendation,
        &[
            "switch to qobuz",
            "switched to qobuz",
            "switching to qobuz",
            "try qobuz",
            "recommend qobuz",
            "moved to qobuz",
            "move to qobuz",
            "check out qobuz",
            "qobuz is better",
            "qobuz over spotify",
            "qobuz instead",
            "spotify to qobuz",
            "amazon to qobuz",
            "apple music to qobuz",
            "youtube to qobuz",
            "tidal to qobuz",
            "from spotify",
            "spotify alternative",
            "alternative to spotify",
            "switched because",
        ],
    ),
];

/// Platform → keywords. First platform with a hit wins, so order matters.
pub const PLATFORM_FROM_RULES: &[(PlatformFrom, &[&str])] = &[
    (
        PlatformFrom::Spotify,
        &[
            "spotify",
            "from spotify",
            "quit spotify",
            "leave spotify",
            "spotify premium",
            "spotify free",
            "spotify podcast",
        ],
    ),
    (
        PlatformFrom::Amazon,
        &[
            "amazon music",
            "amazon unlimited",
            "from amazon",
            "quit amazon",
            "leave amazon",
            "amazon prime music",
        ],
    ),
    (
        PlatformFrom::Apple,
        &[
            "apple music",
            "from apple",
            "quit apple music",
            "leave apple music",
            "itunes",
            "apple one",
        ],
    ),
    (
        PlatformFrom::Youtube,
        &[
            "youtube music",
            "youtube premium",
            "from youtube",
            "quit youtube music",
            "leave youtube music",
            "yt music",
            "ytm",
        ],
    ),
    (
        PlatformFrom::Tidal,
        &["tidal", "from tidal", "quit tidal", "leave tidal", "jay-z streaming"],
    ),
    (
        PlatformFrom::Deezer,
        &["deezer", "from deezer", "quit deezer", "leave deezer"],
    ),
];

/// True if any keyword occurs in the already-lowercased text.
pub(crate) fn any_keyword(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| lower.contains(kw))
}

/// Return every narrative label whose keyword list hits the text.
pub fn tag_narratives(text: &str) -> BTreeSet<Narrative> {
    if text.is_empty() {
        return BTreeSet::new();
    }
    let lower = text.to_lowercase();
    NARRATIVE_RULES
        .iter()
        .filter(|(_, keywords)| any_keyword(&lower, keywords))
        .map(|(narrative, _)| *narrative)
        .collect()
}

/// Detect which platform the author is switching from, or `Generic`.
pub fn detect_platform_from(text: &str) -> PlatformFrom {
    let lower = text.to_lowercase();
    PLATFORM_FROM_RULES
        .iter()
        .find(|(_, keywords)| any_keyword(&lower, keywords))
        .map(|(platform, _)| *platform)
        .unwrap_or_default()
}
