//! Core of a dual-screen PDF slide presenter.
//!
//! A [`SlideGraph`] turns the flat page sequence of a document into logical
//! slides, overlays and notes. A [`Navigator`] walks that graph on behalf of
//! the operator, and an [`ImageCache`] serves rendered pages to the presenter
//! and audience surfaces.

pub mod error;
pub mod geometry;
pub mod graph;
pub mod image_cache;
pub mod layout_mode;
pub mod navigator;
pub mod pdf;
pub mod source;
pub mod timer;

#[cfg(test)]
mod testing;

use std::path::Path;

pub use error::{Diagnostic, Error, Result};
pub use geometry::{Rect, Size};
pub use graph::{
    Link, Media, MediaSource, NotePage, OverlayGroup, PageNode, PrevPolicy, Resolved, SlideGraph,
};
pub use image_cache::ImageCache;
pub use layout_mode::LayoutMode;
pub use navigator::{Color, Escape, Movement, Navigator, Surfaces, BLACK, WHITE};
pub use pdf::PdfDocument;
pub use source::{Annotation, AnnotationKind, Image, PageRenderer, PageSource};
pub use timer::Timer;

/// Open a PDF and build its slide graph, with the layout mode taken from the
/// file name.
pub fn open(path: &Path) -> Result<(PdfDocument, SlideGraph)> {
    let document = PdfDocument::open(path)?;
    let mode = LayoutMode::from_path(path);
    let graph = SlideGraph::build(&document, mode)?;
    Ok((document, graph))
}
