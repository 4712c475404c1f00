use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use log::{trace, warn};
use serde::Serialize;

use super::SlideGraph;
use crate::error::Diagnostic;
use crate::geometry::Rect;
use crate::source::{Annotation, AnnotationKind};

/// A clickable region jumping to another page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// Normalized page-space region
    pub region: Rect,
    /// Physical index of the target page
    pub target: usize,
}

/// A playable video placed on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub region: Rect,
    pub source: MediaSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// Absolute path inside the document's directory
    File(PathBuf),
    Embedded {
        name: String,
        mime: Option<String>,
        data: Arc<[u8]>,
    },
}

/// The outcome of resolving one page's annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    items: Vec<T>,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Resolved<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

pub(super) fn resolve_links(
    page: usize,
    annotations: &[Annotation],
    graph: &SlideGraph,
) -> Resolved<Link> {
    let mut resolved = Resolved::new();
    let page_count = graph.pages().len();

    for annotation in annotations {
        match &annotation.kind {
            AnnotationKind::Goto { page: destination } => {
                // Destinations are 1-based in the document.
                let target = destination
                    .checked_sub(1)
                    .and_then(|index| usize::try_from(index).ok())
                    .filter(|&index| index < page_count)
                    .and_then(|index| graph.node_for_page(index));
                let Some(target) = target else {
                    resolved.report(Diagnostic::InvalidLinkTarget {
                        page,
                        destination: *destination,
                    });
                    continue;
                };
                resolved.items.push(Link {
                    region: annotation.region.normalized(),
                    target: target.index(),
                });
            }
            AnnotationKind::Action { name } => {
                trace!("page {}: ignoring {name} action link", page + 1);
            }
            AnnotationKind::Movie { .. }
            | AnnotationKind::FileAttachment { .. }
            | AnnotationKind::Other { .. } => {
                resolved.report(Diagnostic::UnsupportedAnnotation {
                    page,
                    kind: annotation.kind.name().to_string(),
                });
            }
        }
    }

    resolved
}

pub(super) fn resolve_media(
    page: usize,
    annotations: &[Annotation],
    base_dir: &Path,
) -> Resolved<Media> {
    let mut resolved = Resolved::new();
    let base_dir = lexical_normalize(base_dir);

    for annotation in annotations {
        let region = annotation.region.normalized();
        match &annotation.kind {
            AnnotationKind::Movie { url } => {
                let local = match url_scheme(url) {
                    None => url.as_str(),
                    Some(scheme) if scheme.eq_ignore_ascii_case("file") => {
                        url[scheme.len() + 1..].trim_start_matches("//")
                    }
                    Some(_) => {
                        resolved.report(Diagnostic::MediaPathRejected {
                            page,
                            path: PathBuf::from(url),
                        });
                        continue;
                    }
                };
                let path = lexical_normalize(&base_dir.join(local));
                if !path.starts_with(&base_dir) {
                    resolved.report(Diagnostic::MediaPathRejected { page, path });
                    continue;
                }
                resolved.items.push(Media {
                    region,
                    source: MediaSource::File(path),
                });
            }
            AnnotationKind::FileAttachment { name, mime, data } => {
                if !is_video(mime.as_deref()) {
                    trace!("page {}: attachment {name} is not a video", page + 1);
                    continue;
                }
                resolved.items.push(Media {
                    region,
                    source: MediaSource::Embedded {
                        name: name.clone(),
                        mime: mime.clone(),
                        data: Arc::clone(data),
                    },
                });
            }
            AnnotationKind::Goto { .. }
            | AnnotationKind::Action { .. }
            | AnnotationKind::Other { .. } => {}
        }
    }

    resolved
}

/// Scheme of a URL such as `http://host/a.mp4`. Single letters are drive
/// names, not schemes.
fn url_scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.split_once(':')?;
    let mut chars = scheme.chars();
    let valid = scheme.len() > 1
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

fn is_video(mime: Option<&str>) -> bool {
    mime.is_none_or(|m| m.starts_with("video/"))
}

/// Resolve `.` and `..` without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_mode::LayoutMode;
    use crate::testing::FakeSource;

    fn movie(url: &str) -> Annotation {
        Annotation {
            region: Rect::new(10.0, 10.0, 100.0, 50.0),
            kind: AnnotationKind::Movie {
                url: url.to_string(),
            },
        }
    }

    #[test]
    fn test_out_of_range_link_is_discarded() {
        let mut source = FakeSource::numbered(6);
        source.add_goto(0, Rect::new(0.0, 0.0, 10.0, 10.0), 11);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.links(0, &source).unwrap();
        assert!(resolved.items().is_empty());
        assert_eq!(
            resolved.diagnostics(),
            &[Diagnostic::InvalidLinkTarget {
                page: 0,
                destination: 11
            }]
        );
    }

    #[test]
    fn test_bad_link_does_not_hide_good_ones() {
        let mut source = FakeSource::numbered(6);
        source.add_goto(0, Rect::new(0.0, 0.0, 10.0, 10.0), 0);
        source.add_goto(0, Rect::new(20.0, 0.0, 10.0, 10.0), 4);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.links(0, &source).unwrap();
        assert_eq!(resolved.items().len(), 1);
        assert_eq!(resolved.items()[0].target, 3);
        assert_eq!(resolved.diagnostics().len(), 1);
    }

    #[test]
    fn test_links_target_physical_overlays() {
        let mut source = FakeSource::with_labels(&["1", "2", "2", "2"]);
        source.add_goto(0, Rect::new(0.0, 0.0, 10.0, 10.0), 3);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let link = &graph.links(0, &source).unwrap().items()[0];
        assert_eq!(link.target, 2);
        assert_eq!(graph.node(link.target).unwrap().overlay_position(), 1);
    }

    #[test]
    fn test_link_region_is_normalized() {
        let mut source = FakeSource::numbered(2);
        source.add_goto(0, Rect::new(50.0, 80.0, -20.0, -30.0), 2);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let link = &graph.links(0, &source).unwrap().items()[0];
        assert_eq!(link.region, Rect::new(30.0, 50.0, 20.0, 30.0));
    }

    #[test]
    fn test_links_are_memoized() {
        let mut source = FakeSource::numbered(3);
        source.add_goto(1, Rect::new(0.0, 0.0, 10.0, 10.0), 1);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        assert!(!graph.node(1).unwrap().links_resolved());
        graph.links(1, &source).unwrap();
        graph.links(1, &source).unwrap();
        assert!(graph.node(1).unwrap().links_resolved());
        assert_eq!(source.link_calls.get(), 1);
    }

    #[test]
    fn test_link_to_absorbed_note_page_lands_on_its_slide() {
        let mut source = FakeSource::with_labels(&["1", "0", "2"]);
        source.add_goto(2, Rect::new(0.0, 0.0, 10.0, 10.0), 2);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let link = &graph.links(2, &source).unwrap().items()[0];
        assert_eq!(link.target, 0);
    }

    #[test]
    fn test_non_jump_annotations_are_skipped() {
        let mut source = FakeSource::numbered(2);
        source.pages[0].links.push(Annotation {
            region: Rect::new(0.0, 0.0, 1.0, 1.0),
            kind: AnnotationKind::Action {
                name: "URI".to_string(),
            },
        });
        source.pages[0].links.push(Annotation {
            region: Rect::new(0.0, 0.0, 1.0, 1.0),
            kind: AnnotationKind::Other {
                subtype: "Widget".to_string(),
            },
        });
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.links(0, &source).unwrap();
        assert!(resolved.items().is_empty());
        assert_eq!(
            resolved.diagnostics(),
            &[Diagnostic::UnsupportedAnnotation {
                page: 0,
                kind: "Widget".to_string()
            }]
        );
    }

    #[test]
    fn test_link_at() {
        let mut source = FakeSource::numbered(3);
        source.add_goto(0, Rect::new(0.0, 0.0, 100.0, 100.0), 2);
        source.add_goto(0, Rect::new(200.0, 0.0, 100.0, 100.0), 3);
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let hit = graph.link_at(0, 250.0, 50.0, &source).unwrap();
        assert_eq!(hit.map(|l| l.target), Some(2));
        assert!(graph.link_at(0, 150.0, 50.0, &source).unwrap().is_none());
    }

    #[test]
    fn test_media_inside_base_dir() {
        let mut source = FakeSource::numbered(1);
        source.pages[0].media.push(movie("videos/./demo.mp4"));
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.media(0, &source).unwrap();
        assert_eq!(
            resolved.items()[0].source,
            MediaSource::File(PathBuf::from("/talks/deck/videos/demo.mp4"))
        );
        assert!(resolved.diagnostics().is_empty());
    }

    #[test]
    fn test_media_path_traversal_is_rejected() {
        let mut source = FakeSource::numbered(1);
        source.pages[0].media.push(movie("../../etc/secret.mp4"));
        source.pages[0].media.push(movie("/tmp/elsewhere.mp4"));
        source.pages[0].media.push(movie("clip.mp4"));
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.media(0, &source).unwrap();
        assert_eq!(resolved.items().len(), 1);
        assert_eq!(resolved.diagnostics().len(), 2);
        assert!(matches!(
            &resolved.diagnostics()[0],
            Diagnostic::MediaPathRejected { path, .. } if path == Path::new("/etc/secret.mp4")
        ));
    }

    #[test]
    fn test_media_urls_with_a_scheme() {
        let mut source = FakeSource::numbered(1);
        source.pages[0].media.push(movie("http://example.org/demo.mp4"));
        source.pages[0].media.push(movie("file:///etc/secret.mp4"));
        source.pages[0].media.push(movie("file:///talks/deck/demo.mp4"));
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.media(0, &source).unwrap();
        assert_eq!(
            resolved.items().iter().map(|m| &m.source).collect::<Vec<_>>(),
            vec![&MediaSource::File(PathBuf::from("/talks/deck/demo.mp4"))]
        );
        assert_eq!(
            resolved.diagnostics(),
            &[
                Diagnostic::MediaPathRejected {
                    page: 0,
                    path: PathBuf::from("http://example.org/demo.mp4"),
                },
                Diagnostic::MediaPathRejected {
                    page: 0,
                    path: PathBuf::from("/etc/secret.mp4"),
                },
            ]
        );
    }

    #[test]
    fn test_url_scheme() {
        assert_eq!(url_scheme("https://host/a.mp4"), Some("https"));
        assert_eq!(url_scheme("file:clip.mp4"), Some("file"));
        assert_eq!(url_scheme("C:/videos/a.mp4"), None);
        assert_eq!(url_scheme("clips/a.mp4"), None);
        assert_eq!(url_scheme("1x:a.mp4"), None);
    }

    #[test]
    fn test_embedded_media_mime_filter() {
        let mut source = FakeSource::numbered(1);
        for mime in [Some("video/mp4"), None, Some("application/pdf")] {
            source.pages[0].media.push(Annotation {
                region: Rect::new(0.0, 0.0, 10.0, 10.0),
                kind: AnnotationKind::FileAttachment {
                    name: "clip".to_string(),
                    mime: mime.map(str::to_string),
                    data: Arc::from(vec![1u8, 2, 3]),
                },
            });
        }
        let graph = SlideGraph::build(&source, LayoutMode::None).unwrap();

        let resolved = graph.media(0, &source).unwrap();
        assert_eq!(resolved.items().len(), 2);
        assert!(resolved.diagnostics().is_empty());
    }
}
