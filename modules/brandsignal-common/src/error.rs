use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrandSignalError {
    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error("Item at position {0} has an empty id")]
    EmptyId(usize),

    #[error("Duplicate item id in corpus: {0}")]
    DuplicateId(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
