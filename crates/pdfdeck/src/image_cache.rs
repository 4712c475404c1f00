use std::collections::HashMap;
use std::sync::Arc;

use log::{trace, warn};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::graph::SlideGraph;
use crate::source::{Image, PageRenderer};

/// Renders wider than this are not cached.
pub const DEFAULT_MAX_CACHED_WIDTH: u32 = 1024;

type CacheKey = (u32, u32, bool);

/// Memoizes rendered page images per page and target size.
///
/// Small renders (thumbnails, previews, the presenter view) are requested on
/// every redraw and are kept. Large renders go straight to the renderer.
pub struct ImageCache<R> {
    renderer: R,
    max_cached_width: u32,
    entries: HashMap<usize, HashMap<CacheKey, Arc<Image>>>,
}

impl<R: PageRenderer> ImageCache<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_max_cached_width(renderer, DEFAULT_MAX_CACHED_WIDTH)
    }

    pub fn with_max_cached_width(renderer: R, max_cached_width: u32) -> Self {
        Self {
            renderer,
            max_cached_width,
            entries: HashMap::new(),
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn max_cached_width(&self) -> u32 {
        self.max_cached_width
    }

    /// Number of cached images across all pages.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Image of a page (or of its notes) fitted into `width` x `height`.
    ///
    /// Returns `Ok(None)` when notes are requested for a page without any.
    pub fn get_image(
        &mut self,
        graph: &SlideGraph,
        page: usize,
        width: u32,
        height: u32,
        want_note: bool,
    ) -> Result<Option<Arc<Image>>> {
        if width > self.max_cached_width {
            return Ok(self
                .render(graph, page, width, height, want_note)?
                .map(Arc::new));
        }

        let key = (width, height, want_note);
        if let Some(image) = self.entries.get(&page).and_then(|m| m.get(&key)) {
            trace!("cache hit: page {} at {width}x{height}", page + 1);
            return Ok(Some(Arc::clone(image)));
        }

        trace!("cache miss: page {} at {width}x{height}", page + 1);
        let Some(image) = self.render(graph, page, width, height, want_note)? else {
            return Ok(None);
        };
        let image = Arc::new(image);
        self.entries
            .entry(page)
            .or_default()
            .insert(key, Arc::clone(&image));
        Ok(Some(image))
    }

    fn render(
        &self,
        graph: &SlideGraph,
        page: usize,
        width: u32,
        height: u32,
        want_note: bool,
    ) -> Result<Option<Image>> {
        let node = graph.node(page).ok_or(Error::PageOutOfRange(page))?;

        let (target, region) = if !want_note {
            (page, node.body_region())
        } else if let Some(note) = node.note_page() {
            (note.index, Rect::from_size(note.size))
        } else if let Some(region) = node.note_region() {
            (page, region)
        } else {
            return Ok(None);
        };

        if region.is_empty() {
            warn!("Page {} has an empty region, nothing to render", target + 1);
            return Ok(None);
        }

        // Same scale on both axes so the page is never distorted.
        let scale = (width as f64 / region.width).min(height as f64 / region.height);
        let dpi = 72.0 * scale;
        self.renderer.render(target, region, dpi).map(Some)
    }
}
