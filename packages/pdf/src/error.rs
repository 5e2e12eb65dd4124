use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Unsupported /Rotate value {0}")]
    InvalidRotation(i64),

    #[error("Page {index} has no usable /MediaBox")]
    MissingMediaBox { index: usize },
}
