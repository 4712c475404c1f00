//! The boundary between the deck core and a paginated document.
//!
//! A [`PageSource`] exposes page metadata and annotations; a [`PageRenderer`]
//! rasterizes a region of a page. The two are separate so that a document
//! backend can be used for structure alone while rasterization stays with the
//! presentation surface.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::geometry::{Rect, Size};

/// Bitmap produced by a renderer.
pub type Image = image::RgbaImage;

/// An annotation as delivered by the page source.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// Page-space rectangle, possibly with negative extents
    pub region: Rect,
    pub kind: AnnotationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationKind {
    /// Jump to a page of the same document (1-based)
    Goto { page: i64 },
    /// Any other link action (URI, launch, named action...)
    Action { name: String },
    /// Movie referencing a file, relative to the document
    Movie { url: String },
    /// Embedded file
    FileAttachment {
        name: String,
        mime: Option<String>,
        data: Arc<[u8]>,
    },
    Other { subtype: String },
}

impl AnnotationKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Goto { .. } => "goto",
            Self::Action { name } => name,
            Self::Movie { .. } => "movie",
            Self::FileAttachment { .. } => "file-attachment",
            Self::Other { subtype } => subtype,
        }
    }
}

/// Read access to a loaded document.
pub trait PageSource {
    fn page_count(&self) -> usize;

    fn page_label(&self, index: usize) -> Result<String>;

    fn page_size(&self, index: usize) -> Result<Size>;

    /// Link annotations of a page.
    fn page_links(&self, index: usize) -> Result<Vec<Annotation>>;

    /// Media annotations (movies, attachments) of a page.
    fn page_media(&self, index: usize) -> Result<Vec<Annotation>>;

    /// Directory external media must live under.
    fn base_dir(&self) -> &Path;
}

/// Rasterizes a page region at a given resolution.
pub trait PageRenderer {
    /// `region` is in page space; `dpi` applies to both axes.
    fn render(&self, page: usize, region: Rect, dpi: f64) -> Result<Image>;
}
