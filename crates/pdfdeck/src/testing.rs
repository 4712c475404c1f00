//! In-memory page source and renderer shared by the unit tests.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::source::{Annotation, AnnotationKind, Image, PageRenderer, PageSource};

pub struct FakePage {
    pub label: String,
    pub size: Size,
    pub links: Vec<Annotation>,
    pub media: Vec<Annotation>,
}

pub struct FakeSource {
    pub pages: Vec<FakePage>,
    pub base_dir: PathBuf,
    pub link_calls: Cell<usize>,
}

impl FakeSource {
    /// One 800x600 page per label.
    pub fn with_labels(labels: &[&str]) -> Self {
        let pages = labels
            .iter()
            .map(|label| FakePage {
                label: label.to_string(),
                size: Size::new(800.0, 600.0),
                links: Vec::new(),
                media: Vec::new(),
            })
            .collect();
        Self {
            pages,
            base_dir: PathBuf::from("/talks/deck"),
            link_calls: Cell::new(0),
        }
    }

    /// Pages labelled "1", "2", ... like a document without page labels.
    pub fn numbered(count: usize) -> Self {
        let labels: Vec<String> = (1..=count).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        Self::with_labels(&refs)
    }

    pub fn add_goto(&mut self, page: usize, region: Rect, destination: i64) {
        self.pages[page].links.push(Annotation {
            region,
            kind: AnnotationKind::Goto { page: destination },
        });
    }

    fn page(&self, index: usize) -> Result<&FakePage> {
        self.pages.get(index).ok_or(Error::PageOutOfRange(index))
    }
}

impl PageSource for FakeSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_label(&self, index: usize) -> Result<String> {
        Ok(self.page(index)?.label.clone())
    }

    fn page_size(&self, index: usize) -> Result<Size> {
        Ok(self.page(index)?.size)
    }

    fn page_links(&self, index: usize) -> Result<Vec<Annotation>> {
        self.link_calls.set(self.link_calls.get() + 1);
        Ok(self.page(index)?.links.clone())
    }

    fn page_media(&self, index: usize) -> Result<Vec<Annotation>> {
        Ok(self.page(index)?.media.clone())
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Renders blank images and remembers what it was asked for.
#[derive(Default)]
pub struct CountingRenderer {
    pub calls: Cell<usize>,
    pub last: Cell<Option<(usize, Rect, f64)>>,
}

impl PageRenderer for CountingRenderer {
    fn render(&self, page: usize, region: Rect, dpi: f64) -> Result<Image> {
        self.calls.set(self.calls.get() + 1);
        self.last.set(Some((page, region, dpi)));
        let scale = dpi / 72.0;
        let width = (region.width * scale).round().max(1.0) as u32;
        let height = (region.height * scale).round().max(1.0) as u32;
        Ok(Image::new(width, height))
    }
}
