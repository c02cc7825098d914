use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// --- Vocabulary ---

/// Controlled-vocabulary narrative labels.
///
/// Declaration order is the tagging priority order and the order labels are
/// serialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Narrative {
    Royalties,
    Quality,
    AntiCeo,
    BoycottIsrael,
    Degoogle,
    AntiSpotify,
    ProIndie,
    SwitchRecommendation,
}

impl Narrative {
    pub const ALL: [Narrative; 8] = [
        Narrative::Royalties,
        Narrative::Quality,
        Narrative::AntiCeo,
        Narrative::BoycottIsrael,
        Narrative::Degoogle,
        Narrative::AntiSpotify,
        Narrative::ProIndie,
        Narrative::SwitchRecommendation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Narrative::Royalties => "royalties",
            Narrative::Quality => "quality",
            Narrative::AntiCeo => "anti-ceo",
            Narrative::BoycottIsrael => "boycott-israel",
            Narrative::Degoogle => "degoogle",
            Narrative::AntiSpotify => "anti-spotify",
            Narrative::ProIndie => "pro-indie",
            Narrative::SwitchRecommendation => "switch-recommendation",
        }
    }
}

impl std::fmt::Display for Narrative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The service an item's author says they are leaving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformFrom {
    Spotify,
    Amazon,
    Apple,
    Youtube,
    Tidal,
    Deezer,
    #[default]
    Generic,
}

impl std::fmt::Display for PlatformFrom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformFrom::Spotify => write!(f, "spotify"),
            PlatformFrom::Amazon => write!(f, "amazon"),
            PlatformFrom::Apple => write!(f, "apple"),
            PlatformFrom::Youtube => write!(f, "youtube"),
            PlatformFrom::Tidal => write!(f, "tidal"),
            PlatformFrom::Deezer => write!(f, "deezer"),
            PlatformFrom::Generic => write!(f, "generic"),
        }
    }
}

/// Stance toward the tracked brand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Pro,
    Critical,
    #[default]
    Neutral,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Pro, Direction::Critical, Direction::Neutral];
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Pro => write!(f, "pro"),
            Direction::Critical => write!(f, "critical"),
            Direction::Neutral => write!(f, "neutral"),
        }
    }
}

/// Named heuristic rule that contributed to an item's bot suspicion score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotSignal {
    VeryNewAccount,
    NewAccount,
    VeryLowKarma,
    LowKarma,
    NewAndLowKarma,
    OddHourPost,
    CopyPasteCampaign,
    SimilarToOtherPosts,
    UsernamePattern,
    NumericUsernameSuffix,
}

impl std::fmt::Display for BotSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotSignal::VeryNewAccount => write!(f, "very_new_account"),
            BotSignal::NewAccount => write!(f, "new_account"),
            BotSignal::VeryLowKarma => write!(f, "very_low_karma"),
            BotSignal::LowKarma => write!(f, "low_karma"),
            BotSignal::NewAndLowKarma => write!(f, "new_and_low_karma"),
            BotSignal::OddHourPost => write!(f, "odd_hour_post"),
            BotSignal::CopyPasteCampaign => write!(f, "copy_paste_campaign"),
            BotSignal::SimilarToOtherPosts => write!(f, "similar_to_other_posts"),
            BotSignal::UsernamePattern => write!(f, "username_pattern"),
            BotSignal::NumericUsernameSuffix => write!(f, "numeric_username_suffix"),
        }
    }
}

// --- Source ---

/// Where an item was collected from. Unrecognized values round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Reddit,
    News,
    Twitter,
    Other(String),
}

impl Source {
    /// Only sources that expose account age and karma get identity signals.
    pub fn carries_author_metadata(&self) -> bool {
        matches!(self, Source::Reddit)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Source::Reddit => "reddit",
            Source::News => "news",
            Source::Twitter => "twitter",
            Source::Other(s) => s,
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Other("unknown".to_string())
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        match value.as_str() {
            "reddit" => Source::Reddit,
            "news" => Source::News,
            "twitter" => Source::Twitter,
            _ => Source::Other(value),
        }
    }
}

impl From<Source> for String {
    fn from(value: Source) -> Self {
        match value {
            Source::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Item ---

/// One collected post, comment, or article about the tracked brand.
///
/// Field names match the persisted record layout. Fields the analysis does not
/// own (subreddit, upvote counts, originals kept by translation) are carried
/// in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub source: Source,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "text", default, deserialize_with = "nullable")]
    pub body: String,
    #[serde(default, deserialize_with = "nullable")]
    pub author: String,
    #[serde(default)]
    pub author_age_days: Option<i64>,
    #[serde(default)]
    pub author_karma: Option<i64>,
    #[serde(rename = "date", default)]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub narratives: BTreeSet<Narrative>,
    #[serde(default, deserialize_with = "nullable")]
    pub platform_from: PlatformFrom,
    #[serde(default, deserialize_with = "nullable")]
    pub direction: Direction,
    #[serde(default, deserialize_with = "nullable")]
    pub bot_score: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub bot_signals: Vec<BotSignal>,
    #[serde(default, deserialize_with = "nullable")]
    pub campaign_burst: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Item {
    /// A bare, unenriched item as handed over by a collector.
    pub fn new(id: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            source,
            kind: String::new(),
            title: String::new(),
            body: String::new(),
            author: String::new(),
            author_age_days: None,
            author_karma: None,
            timestamp: None,
            url: None,
            language: None,
            narratives: BTreeSet::new(),
            platform_from: PlatformFrom::Generic,
            direction: Direction::Neutral,
            bot_score: 0.0,
            bot_signals: Vec::new(),
            campaign_burst: false,
            extra: serde_json::Map::new(),
        }
    }

    /// Title followed by body. Used for tagging and stance.
    pub fn analysis_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }

    /// Body followed by title. Used for near-duplicate comparison.
    pub fn comparison_text(&self) -> String {
        format!("{} {}", self.body, self.title)
    }

    /// The item's timestamp, if present and parseable.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_timestamp)
    }
}

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339 (with `Z` or a numeric offset) and naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` values, which are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Burst ---

/// A cluster of same-narrative, elevated-suspicion items inside one window.
///
/// Recomputed every run from the full corpus; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Burst {
    pub narrative: Narrative,
    pub member_ids: Vec<String>,
    pub start: DateTime<Utc>,
    /// Latest member timestamp, not the window bound.
    pub end: DateTime<Utc>,
    pub count: usize,
    pub hours_span: f64,
}
