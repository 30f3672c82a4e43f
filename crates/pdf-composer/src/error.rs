use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Document is encrypted")]
    Encrypted,

    #[error("Document has no pages")]
    NoPages,

    #[error("Failed to serialize document: {0}")]
    Save(String),

    #[error("{0}")]
    Other(String),
}
