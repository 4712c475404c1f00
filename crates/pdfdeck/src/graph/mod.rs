pub mod links;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::layout_mode::LayoutMode;
use crate::source::PageSource;

pub use links::{Link, Media, MediaSource, Resolved};

/// Label reserved for inline note pages.
pub const NOTE_LABEL: &str = "0";

/// A physical page supplying the notes of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NotePage {
    pub index: usize,
    pub size: Size,
}

/// One physical page of the deck.
#[derive(Debug)]
pub struct PageNode {
    index: usize,
    label: String,
    logical_index: usize,
    overlay_position: usize,
    body_region: Rect,
    note_region: Option<Rect>,
    note_page: Option<NotePage>,
    prev_group: Option<usize>,
    next_group: Option<usize>,
    links: OnceLock<Resolved<Link>>,
    media: OnceLock<Resolved<Media>>,
}

impl PageNode {
    /// Physical page index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn logical_index(&self) -> usize {
        self.logical_index
    }

    /// The overlay group this page belongs to. Groups are indexed by logical
    /// slide, so this is the same value as [`PageNode::logical_index`].
    pub fn overlay(&self) -> usize {
        self.logical_index
    }

    pub fn overlay_position(&self) -> usize {
        self.overlay_position
    }

    pub fn body_region(&self) -> Rect {
        self.body_region
    }

    pub fn note_region(&self) -> Option<Rect> {
        self.note_region
    }

    pub fn note_page(&self) -> Option<NotePage> {
        self.note_page
    }

    pub fn has_note(&self) -> bool {
        self.note_region.is_some() || self.note_page.is_some()
    }

    pub fn prev_group(&self) -> Option<usize> {
        self.prev_group
    }

    pub fn next_group(&self) -> Option<usize> {
        self.next_group
    }

    pub fn links_resolved(&self) -> bool {
        self.links.get().is_some()
    }

    pub fn media_resolved(&self) -> bool {
        self.media.get().is_some()
    }
}

/// The pages showing successive reveal states of one logical slide.
#[derive(Debug, Clone)]
pub struct OverlayGroup {
    members: Vec<usize>,
}

impl OverlayGroup {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Physical page indices, in overlay order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.members.get(position).copied()
    }

    pub fn first(&self) -> usize {
        self.members[0]
    }

    pub fn last(&self) -> usize {
        self.members[self.members.len() - 1]
    }
}

/// Where skip-backward lands when the current page is not the first overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrevPolicy {
    /// Rewind to the first overlay of the current slide
    #[default]
    RewindGroup,
    /// Go straight to the first overlay of the previous slide
    PreviousGroup,
}

impl PrevPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RewindGroup => "rewind-group",
            Self::PreviousGroup => "previous-group",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rewind-group" => Some(Self::RewindGroup),
            "previous-group" => Some(Self::PreviousGroup),
            _ => None,
        }
    }
}

/// Logical slide structure derived from a flat page sequence.
///
/// Built once; afterwards only the memoized links and media of each page
/// change, and those are computed idempotently.
#[derive(Debug)]
pub struct SlideGraph {
    mode: LayoutMode,
    pages: Vec<Option<PageNode>>,
    groups: Vec<OverlayGroup>,
    layout: Vec<usize>,
    base_dir: PathBuf,
}

impl SlideGraph {
    /// Build the graph in a single pass over the source's pages.
    ///
    /// Consecutive pages with the same label form one overlay group. With
    /// note-label scanning, a page labelled [`NOTE_LABEL`] becomes the note
    /// page of the page before it and leaves a `None` slot in `pages`. In
    /// end-notes mode only the first half of the document is walked; the page
    /// half a document further on is the note page.
    pub fn build(source: &impl PageSource, mode: LayoutMode) -> Result<Self> {
        let total = source.page_count();
        if total == 0 {
            return Err(Error::EmptyDocument);
        }

        let slide_pages = if mode == LayoutMode::EndNotes {
            if total % 2 != 0 {
                warn!("End-notes document has an odd page count ({total}); ignoring the last page");
            }
            total / 2
        } else {
            total
        };
        if slide_pages == 0 {
            return Err(Error::EmptyDocument);
        }

        let scan_notes = mode.scans_note_label();
        let mut pages: Vec<Option<PageNode>> = Vec::with_capacity(slide_pages);
        let mut groups: Vec<OverlayGroup> = Vec::new();
        let mut layout: Vec<usize> = Vec::new();
        let mut previous: Option<usize> = None;

        for index in 0..slide_pages {
            let label = source.page_label(index)?;

            if scan_notes && label == NOTE_LABEL {
                let Some(owner) = previous.and_then(|p| pages[p].as_mut()) else {
                    return Err(Error::MalformedDocument(format!(
                        "note page {} has no preceding slide",
                        index + 1
                    )));
                };
                if owner.note_page.is_some() {
                    debug!(
                        "Page {} replaces the note page of page {}",
                        index + 1,
                        owner.index + 1
                    );
                }
                owner.note_page = Some(NotePage {
                    index,
                    size: source.page_size(index)?,
                });
                pages.push(None);
                continue;
            }

            let extends = previous
                .and_then(|p| pages[p].as_ref())
                .filter(|p| !p.label.is_empty() && p.label == label)
                .map(|p| p.logical_index);

            let (logical_index, overlay_position) = match extends {
                Some(group) => {
                    let position = groups[group].members.len();
                    groups[group].members.push(index);
                    (group, position)
                }
                None => {
                    let group = groups.len();
                    if let Some(last) = groups.last() {
                        for &member in &last.members {
                            if let Some(node) = pages[member].as_mut() {
                                node.next_group = Some(group);
                            }
                        }
                    }
                    groups.push(OverlayGroup {
                        members: vec![index],
                    });
                    layout.push(index);
                    (group, 0)
                }
            };

            let size = source.page_size(index)?;
            let (body_region, note_region) = mode.regions(size);

            let note_page = if mode == LayoutMode::EndNotes {
                let paired = index + slide_pages;
                if paired >= total {
                    return Err(Error::MalformedDocument(format!(
                        "note page {} for page {} is past the end of the document",
                        paired + 1,
                        index + 1
                    )));
                }
                Some(NotePage {
                    index: paired,
                    size: source.page_size(paired)?,
                })
            } else {
                None
            };

            pages.push(Some(PageNode {
                index,
                label,
                logical_index,
                overlay_position,
                body_region,
                note_region,
                note_page,
                prev_group: logical_index.checked_sub(1),
                next_group: None,
                links: OnceLock::new(),
                media: OnceLock::new(),
            }));
            previous = Some(index);
        }

        debug!(
            "Built {} slides from {} pages ({} layout)",
            layout.len(),
            total,
            mode
        );

        Ok(Self {
            mode,
            pages,
            groups,
            layout,
            base_dir: source.base_dir().to_path_buf(),
        })
    }

    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// One slot per walked physical page; `None` where a note page was absorbed.
    pub fn pages(&self) -> &[Option<PageNode>] {
        &self.pages
    }

    /// First page of every logical slide.
    pub fn layout(&self) -> &[usize] {
        &self.layout
    }

    pub fn groups(&self) -> &[OverlayGroup] {
        &self.groups
    }

    pub fn slide_count(&self) -> usize {
        self.layout.len()
    }

    pub fn node(&self, page: usize) -> Option<&PageNode> {
        self.pages.get(page).and_then(Option::as_ref)
    }

    pub fn slide(&self, logical_index: usize) -> Option<&OverlayGroup> {
        self.groups.get(logical_index)
    }

    /// The overlay group a page belongs to.
    pub fn group_of(&self, page: usize) -> Option<&OverlayGroup> {
        self.node(page).and_then(|n| self.groups.get(n.logical_index))
    }

    /// The node shown for a physical page: the page itself, or for an
    /// absorbed note page the slide it annotates.
    pub fn node_for_page(&self, page: usize) -> Option<&PageNode> {
        self.pages
            .get(..=page)?
            .iter()
            .rev()
            .find_map(Option::as_ref)
    }

    pub fn next_overlay(&self, page: usize) -> Option<usize> {
        let node = self.node(page)?;
        self.groups[node.logical_index].get(node.overlay_position + 1)
    }

    pub fn prev_overlay(&self, page: usize) -> Option<usize> {
        let node = self.node(page)?;
        let position = node.overlay_position.checked_sub(1)?;
        self.groups[node.logical_index].get(position)
    }

    pub fn first_of_group(&self, page: usize) -> Option<usize> {
        self.group_of(page).map(OverlayGroup::first)
    }

    /// The page after `page`: its next overlay unless `skip_overlay`, else
    /// the first overlay of the next slide.
    pub fn next_page(&self, page: usize, skip_overlay: bool) -> Option<usize> {
        if !skip_overlay {
            if let Some(next) = self.next_overlay(page) {
                return Some(next);
            }
        }
        let group = self.node(page)?.next_group?;
        Some(self.groups[group].first())
    }

    /// The page before `page`.
    ///
    /// Without `skip_overlay` this is the previous overlay when there is one.
    /// Otherwise a page past the first overlay goes back according to
    /// `policy`, and a first overlay goes to the previous slide's first page.
    pub fn prev_page(&self, page: usize, skip_overlay: bool, policy: PrevPolicy) -> Option<usize> {
        if !skip_overlay {
            if let Some(prev) = self.prev_overlay(page) {
                return Some(prev);
            }
        }
        let node = self.node(page)?;
        if node.overlay_position > 0 && policy == PrevPolicy::RewindGroup {
            return Some(self.groups[node.logical_index].first());
        }
        let group = node.prev_group?;
        Some(self.groups[group].first())
    }

    /// Resolved jump links of a page, computed on first access.
    pub fn links(&self, page: usize, source: &impl PageSource) -> Result<&Resolved<Link>> {
        let node = self.node(page).ok_or(Error::PageOutOfRange(page))?;
        if let Some(resolved) = node.links.get() {
            return Ok(resolved);
        }
        let annotations = source.page_links(page)?;
        let resolved = links::resolve_links(page, &annotations, self);
        Ok(node.links.get_or_init(|| resolved))
    }

    /// Playable media of a page, computed on first access.
    pub fn media(&self, page: usize, source: &impl PageSource) -> Result<&Resolved<Media>> {
        let node = self.node(page).ok_or(Error::PageOutOfRange(page))?;
        if let Some(resolved) = node.media.get() {
            return Ok(resolved);
        }
        let annotations = source.page_media(page)?;
        let resolved = links::resolve_media(page, &annotations, &self.base_dir);
        Ok(node.media.get_or_init(|| resolved))
    }

    /// First link of `page` whose region contains the page-space point.
    pub fn link_at(
        &self,
        page: usize,
        x: f64,
        y: f64,
        source: &impl PageSource,
    ) -> Result<Option<&Link>> {
        Ok(self
            .links(page, source)?
            .items()
            .iter()
            .find(|l| l.region.contains(x, y)))
    }
}
