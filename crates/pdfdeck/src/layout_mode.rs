use std::path::Path;

use serde::Serialize;

use crate::geometry::{Rect, Size};

/// How speaker notes are laid out in the document.
///
/// Selected once from the file name suffix; nothing else influences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// No split; pages labelled with the note label are searched instead
    None,
    RightNotes,
    LeftNotes,
    BottomNotes,
    TopNotes,
    /// The second half of the document holds the notes, page for page
    EndNotes,
    /// Note pages follow the slide they annotate
    InlineNotes,
}

const SUFFIXES: &[(&str, LayoutMode)] = &[
    (".right.pdf", LayoutMode::RightNotes),
    (".left.pdf", LayoutMode::LeftNotes),
    (".bottom.pdf", LayoutMode::BottomNotes),
    (".top.pdf", LayoutMode::TopNotes),
    (".end.pdf", LayoutMode::EndNotes),
    (".notes.pdf", LayoutMode::InlineNotes),
];

impl LayoutMode {
    pub fn from_path(path: &Path) -> Self {
        path.file_name()
            .map(|name| Self::from_file_name(&name.to_string_lossy()))
            .unwrap_or(Self::None)
    }

    /// Suffix matching is case-insensitive (`talk.END.pdf` is end-notes too).
    pub fn from_file_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| lower.ends_with(suffix))
            .map(|&(_, mode)| mode)
            .unwrap_or(Self::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RightNotes => "right-notes",
            Self::LeftNotes => "left-notes",
            Self::BottomNotes => "bottom-notes",
            Self::TopNotes => "top-notes",
            Self::EndNotes => "end-notes",
            Self::InlineNotes => "inline-notes",
        }
    }

    /// Whether each page is split in two halves.
    pub fn is_split(&self) -> bool {
        matches!(
            self,
            Self::RightNotes | Self::LeftNotes | Self::BottomNotes | Self::TopNotes
        )
    }

    /// Whether pages carrying the note label are absorbed as note pages.
    pub fn scans_note_label(&self) -> bool {
        matches!(self, Self::None | Self::InlineNotes)
    }

    /// Body and note regions of a page of the given size.
    pub fn regions(&self, size: Size) -> (Rect, Option<Rect>) {
        let (w, h) = (size.width, size.height);
        match self {
            Self::RightNotes => {
                let half = w / 2.0;
                (
                    Rect::new(0.0, 0.0, half, h),
                    Some(Rect::new(half, 0.0, half, h)),
                )
            }
            Self::LeftNotes => {
                let half = w / 2.0;
                (
                    Rect::new(half, 0.0, half, h),
                    Some(Rect::new(0.0, 0.0, half, h)),
                )
            }
            Self::BottomNotes => {
                let half = h / 2.0;
                (
                    Rect::new(0.0, 0.0, w, half),
                    Some(Rect::new(0.0, half, w, half)),
                )
            }
            Self::TopNotes => {
                let half = h / 2.0;
                (
                    Rect::new(0.0, half, w, half),
                    Some(Rect::new(0.0, 0.0, w, half)),
                )
            }
            Self::None | Self::EndNotes | Self::InlineNotes => (Rect::from_size(size), None),
        }
    }
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
