//! `lopdf`-backed page source.

pub mod labels;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, trace};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use crate::source::{Annotation, AnnotationKind, PageSource};
use labels::{LabelRange, NumberStyle};

/// US Letter, used when a page declares no box at all.
const DEFAULT_PAGE_SIZE: Size = Size {
    width: 612.0,
    height: 792.0,
};

/// Bound on reference chains and tree depth in malformed files.
const MAX_DEPTH: usize = 32;

/// A PDF file opened for structure: labels, sizes and annotations.
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    page_numbers: HashMap<ObjectId, usize>,
    labels: Vec<String>,
    base_dir: PathBuf,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::load(path).map_err(|e| Error::DocumentLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let base_dir = std::path::absolute(parent)?;
        debug!("Opened {} ({} pages)", path.display(), doc.get_pages().len());
        Ok(Self::from_document(doc, base_dir))
    }

    /// Wrap an already parsed document.
    pub fn from_document(doc: Document, base_dir: PathBuf) -> Self {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let page_numbers = pages.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut document = Self {
            doc,
            pages,
            page_numbers,
            labels: Vec::new(),
            base_dir,
        };
        let ranges = document.label_ranges();
        document.labels = (0..document.pages.len())
            .map(|page| labels::label_for(&ranges, page))
            .collect();
        document
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary> {
        let id = *self.pages.get(index).ok_or(Error::PageOutOfRange(index))?;
        Ok(self.doc.get_dictionary(id)?)
    }

    /// Visible page box in PDF user space.
    fn page_box(&self, index: usize) -> Result<Rect> {
        let page = self.page_dict(index)?;
        for key in [b"CropBox".as_slice(), b"MediaBox".as_slice()] {
            if let Some([x1, y1, x2, y2]) = self.inherited(page, key).and_then(|o| self.quad(o)) {
                return Ok(Rect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs()));
            }
        }
        Ok(Rect::from_size(DEFAULT_PAGE_SIZE))
    }

    fn annotations(&self, index: usize) -> Result<Vec<Annotation>> {
        let page = self.page_dict(index)?;
        let page_box = self.page_box(index)?;
        let top = page_box.y + page_box.height;

        let Some(Object::Array(entries)) = self.get(page, b"Annots") else {
            return Ok(Vec::new());
        };

        let mut annotations = Vec::new();
        for entry in entries {
            let Some(annot) = self.dict(entry) else {
                continue;
            };
            let Some([x1, y1, x2, y2]) = self.get(annot, b"Rect").and_then(|o| self.quad(o)) else {
                trace!("page {}: annotation without /Rect", index + 1);
                continue;
            };
            let Some(kind) = self.classify(annot) else {
                continue;
            };
            // Flip to a top-left origin; extents keep their sign.
            let region = Rect::new(x1 - page_box.x, top - y1, x2 - x1, y1 - y2);
            annotations.push(Annotation { region, kind });
        }
        Ok(annotations)
    }

    fn classify(&self, annot: &Dictionary) -> Option<AnnotationKind> {
        let subtype = self.get(annot, b"Subtype").and_then(name_bytes)?;
        match subtype {
            b"Link" => self.link_kind(annot),
            b"Movie" => self.movie_kind(annot),
            b"FileAttachment" => self.attachment_kind(annot),
            b"Sound" | b"Screen" | b"RichMedia" => Some(AnnotationKind::Other {
                subtype: String::from_utf8_lossy(subtype).into_owned(),
            }),
            _ => None,
        }
    }

    fn link_kind(&self, annot: &Dictionary) -> Option<AnnotationKind> {
        if let Some(dest) = self.get(annot, b"Dest") {
            let page = self.destination_page(dest, 0).unwrap_or(0);
            return Some(AnnotationKind::Goto { page });
        }
        let action = self.get(annot, b"A").and_then(|o| self.dict(o))?;
        let kind = self.get(action, b"S").and_then(name_bytes)?;
        if kind == b"GoTo" {
            let page = self
                .get(action, b"D")
                .and_then(|d| self.destination_page(d, 0))
                .unwrap_or(0);
            return Some(AnnotationKind::Goto { page });
        }
        Some(AnnotationKind::Action {
            name: String::from_utf8_lossy(kind).into_owned(),
        })
    }

    fn movie_kind(&self, annot: &Dictionary) -> Option<AnnotationKind> {
        let movie = self.get(annot, b"Movie").and_then(|o| self.dict(o))?;
        let url = self.get(movie, b"F").and_then(|spec| self.file_name(spec))?;
        Some(AnnotationKind::Movie { url })
    }

    fn attachment_kind(&self, annot: &Dictionary) -> Option<AnnotationKind> {
        let spec = self.get(annot, b"FS")?;
        let name = self
            .file_name(spec)
            .unwrap_or_else(|| "attachment".to_string());
        let embedded = self
            .dict(spec)
            .and_then(|spec| self.get(spec, b"EF"))
            .and_then(|o| self.dict(o))?;
        let stream = [b"UF".as_slice(), b"F".as_slice()]
            .into_iter()
            .find_map(|key| match self.get(embedded, key) {
                Some(Object::Stream(stream)) => Some(stream),
                _ => None,
            })?;

        // movie15 puts the type in the description: "Media File (video/mp4)".
        let mime = self
            .get(&stream.dict, b"Subtype")
            .and_then(name_bytes)
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .or_else(|| {
                self.get(annot, b"Contents")
                    .and_then(string_bytes)
                    .and_then(|c| mime_from_description(&decode_text(c)))
            });

        Some(AnnotationKind::FileAttachment {
            name,
            mime,
            data: Arc::from(stream_data(stream)),
        })
    }

    /// 1-based page number of a destination.
    fn destination_page(&self, dest: &Object, depth: usize) -> Option<i64> {
        if depth > MAX_DEPTH {
            return None;
        }
        match self.resolve(dest)? {
            Object::Array(items) => match items.first()? {
                Object::Reference(id) => self.page_numbers.get(id).map(|i| *i as i64 + 1),
                Object::Integer(i) => i.checked_add(1),
                _ => None,
            },
            Object::Name(name) | Object::String(name, _) => self
                .named_destination(name)
                .and_then(|d| self.destination_page(d, depth + 1)),
            Object::Dictionary(d) => self
                .get(d, b"D")
                .and_then(|d| self.destination_page(d, depth + 1)),
            _ => None,
        }
    }

    fn named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.doc.catalog().ok()?;
        if let Some(dests) = self.get(catalog, b"Dests").and_then(|o| self.dict(o)) {
            if let Some(dest) = self.get(dests, name) {
                return Some(dest);
            }
        }
        let names = self.get(catalog, b"Names").and_then(|o| self.dict(o))?;
        let tree = self.get(names, b"Dests")?;
        self.name_tree_lookup(tree, name, 0)
    }

    fn name_tree_lookup<'a>(
        &'a self,
        node: &'a Object,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_DEPTH {
            return None;
        }
        let node = self.dict(node)?;
        if let Some(Object::Array(pairs)) = self.get(node, b"Names") {
            for pair in pairs.chunks_exact(2) {
                if self.resolve(&pair[0]).and_then(string_bytes) == Some(name) {
                    return self.resolve(&pair[1]);
                }
            }
        }
        if let Some(Object::Array(kids)) = self.get(node, b"Kids") {
            for kid in kids {
                if let Some(found) = self.name_tree_lookup(kid, name, depth + 1) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn label_ranges(&self) -> Vec<LabelRange> {
        let Some(tree) = self
            .doc
            .catalog()
            .ok()
            .and_then(|catalog| self.get(catalog, b"PageLabels"))
        else {
            return Vec::new();
        };

        let mut entries = Vec::new();
        self.collect_numbers(tree, &mut entries, 0);
        let mut ranges: Vec<LabelRange> = entries
            .into_iter()
            .filter_map(|(start, dict)| {
                let start = usize::try_from(start).ok()?;
                Some(LabelRange {
                    start,
                    style: self
                        .get(dict, b"S")
                        .and_then(name_bytes)
                        .and_then(NumberStyle::from_name),
                    prefix: self
                        .get(dict, b"P")
                        .and_then(string_bytes)
                        .map(decode_text)
                        .unwrap_or_default(),
                    first: self.get(dict, b"St").and_then(integer).unwrap_or(1),
                })
            })
            .collect();
        ranges.sort_by_key(|r| r.start);
        ranges
    }

    /// Flatten a number tree into (key, value) pairs.
    fn collect_numbers<'a>(
        &'a self,
        node: &'a Object,
        out: &mut Vec<(i64, &'a Dictionary)>,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        let Some(node) = self.dict(node) else {
            return;
        };
        if let Some(Object::Array(nums)) = self.get(node, b"Nums") {
            for pair in nums.chunks_exact(2) {
                let key = self.resolve(&pair[0]).and_then(integer);
                let value = self.dict(&pair[1]);
                if let (Some(key), Some(value)) = (key, value) {
                    out.push((key, value));
                }
            }
        }
        if let Some(Object::Array(kids)) = self.get(node, b"Kids") {
            for kid in kids {
                self.collect_numbers(kid, out, depth + 1);
            }
        }
    }

    /// Follow a reference chain to the object it designates.
    fn resolve<'a>(&'a self, mut object: &'a Object) -> Option<&'a Object> {
        for _ in 0..MAX_DEPTH {
            let Object::Reference(id) = object else {
                return Some(object);
            };
            object = self.doc.get_object(*id).ok()?;
        }
        None
    }

    fn get<'a>(&'a self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        self.resolve(dict.get(key).ok()?)
    }

    fn dict<'a>(&'a self, object: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(object)? {
            Object::Dictionary(dict) => Some(dict),
            Object::Stream(stream) => Some(&stream.dict),
            _ => None,
        }
    }

    /// A key looked up on the page, then on its ancestors.
    fn inherited<'a>(&'a self, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
        let mut node = page;
        for _ in 0..MAX_DEPTH {
            if let Some(value) = self.get(node, key) {
                return Some(value);
            }
            node = self.get(node, b"Parent").and_then(|o| self.dict(o))?;
        }
        None
    }

    fn quad(&self, object: &Object) -> Option<[f64; 4]> {
        let Object::Array(items) = self.resolve(object)? else {
            return None;
        };
        let values: Vec<f64> = items
            .iter()
            .filter_map(|o| self.resolve(o).and_then(number))
            .collect();
        values.try_into().ok()
    }

    fn file_name(&self, spec: &Object) -> Option<String> {
        match self.resolve(spec)? {
            Object::String(bytes, _) => Some(decode_text(bytes)),
            Object::Dictionary(dict) => [b"UF".as_slice(), b"F".as_slice()]
                .into_iter()
                .find_map(|key| self.get(dict, key).and_then(string_bytes))
                .map(decode_text),
            _ => None,
        }
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_label(&self, index: usize) -> Result<String> {
        self.labels
            .get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index))
    }

    fn page_size(&self, index: usize) -> Result<Size> {
        Ok(self.page_box(index)?.size())
    }

    fn page_links(&self, index: usize) -> Result<Vec<Annotation>> {
        let mut annotations = self.annotations(index)?;
        annotations.retain(|a| !is_media(&a.kind));
        Ok(annotations)
    }

    fn page_media(&self, index: usize) -> Result<Vec<Annotation>> {
        let mut annotations = self.annotations(index)?;
        annotations.retain(|a| is_media(&a.kind));
        Ok(annotations)
    }

    fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn is_media(kind: &AnnotationKind) -> bool {
    matches!(
        kind,
        AnnotationKind::Movie { .. } | AnnotationKind::FileAttachment { .. }
    )
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn integer(object: &Object) -> Option<i64> {
    match object {
        Object::Integer(i) => Some(*i),
        _ => None,
    }
}

fn name_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Name(name) => Some(name),
        _ => None,
    }
}

fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) | Object::Name(bytes) => Some(bytes),
        _ => None,
    }
}

fn stream_data(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// PDF text string: UTF-16BE with a byte order mark, else treated as UTF-8.
fn decode_text(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn mime_from_description(text: &str) -> Option<String> {
    let open = text.rfind('(')?;
    let close = open + text[open..].find(')')?;
    let inner = text[open + 1..close].trim();
    inner.contains('/').then(|| inner.to_string())
}
