pub mod config;
pub mod corpus;
pub mod error;
pub mod types;

pub use config::FileConfig;
pub use corpus::{parse_items, validate_corpus};
pub use error::BrandSignalError;
pub use types::*;
