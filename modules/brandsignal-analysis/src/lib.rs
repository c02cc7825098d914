pub mod aggregate;
pub mod bot_score;
pub mod burst;
pub mod direction;
pub mod intake;
pub mod narrative;
pub mod pipeline;
pub mod similarity;

pub use aggregate::{build_report, CorpusReport};
pub use bot_score::{score_item, BotAssessment, ComparisonCorpus};
pub use burst::{apply_burst_flags, detect_bursts};
pub use direction::detect_direction;
pub use narrative::{detect_platform_from, tag_narratives};
pub use pipeline::{classify, run_batch, BatchOutcome, RunStats};
