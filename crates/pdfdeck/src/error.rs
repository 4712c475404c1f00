use std::path::PathBuf;

use thiserror::Error;

/// Result type for deck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while loading, building or navigating a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying document could not be opened
    #[error("Failed to load {}: {reason}", path.display())]
    DocumentLoad { path: PathBuf, reason: String },

    /// The document has no slide pages to present
    #[error("Document has no pages")]
    EmptyDocument,

    /// The page sequence cannot produce a consistent slide graph
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A requested slide position is outside the deck
    #[error("Invalid position: slide {slide}, overlay {overlay}")]
    InvalidPosition { slide: isize, overlay: isize },

    /// A page source was asked for a page it does not have
    #[error("Page {0} is out of range")]
    PageOutOfRange(usize),

    /// The renderer failed to produce an image
    #[error("Render failed: {0}")]
    Render(String),

    /// PDF object model error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Non-fatal problems found while resolving a page's links and media.
///
/// A diagnostic always concerns a single annotation; the rest of the page
/// and the rest of the deck are unaffected. Pages are stored 0-based and
/// shown 1-based.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A jump annotation points outside the document. `destination` is the
    /// 1-based page number as written in the document.
    #[error("page {}: invalid link target {destination}", page + 1)]
    InvalidLinkTarget { page: usize, destination: i64 },

    /// A movie file resolves outside the document's directory
    #[error(
        "page {}: external videos are only accepted in the document folder ({})",
        page + 1,
        path.display()
    )]
    MediaPathRejected { page: usize, path: PathBuf },

    /// An annotation kind the presenter does not act on
    #[error("page {}: unsupported annotation ({kind})", page + 1)]
    UnsupportedAnnotation { page: usize, kind: String },
}

impl Diagnostic {
    pub fn page(&self) -> usize {
        match self {
            Self::InvalidLinkTarget { page, .. }
            | Self::MediaPathRejected { page, .. }
            | Self::UnsupportedAnnotation { page, .. } => *page,
        }
    }
}
