pub mod completion;
pub mod config;
pub mod inspect;
pub mod rehearse;

use pdfdeck::{PageNode, SlideGraph};

/// Where the notes of a page come from, for display.
pub fn note_source(graph: &SlideGraph, node: &PageNode) -> Option<String> {
    if let Some(note) = node.note_page() {
        return Some(format!("page {}", note.index + 1));
    }
    node.note_region()
        .map(|_| format!("{} region", graph.mode().name()))
}
