use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document has no pages")]
    Empty,
    #[error("document id '{0}' is not usable as a file name")]
    InvalidId(String),
    #[error("duplicate page id '{0}'")]
    DuplicatePageId(String),
    #[error("failed to read document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tag selecting how a page is laid out. Unknown tags still load so that a
/// newer document never breaks an older reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Cover,
    Editorial,
    Article,
    Notice,
    Gallery,
    Events,
    Classifieds,
    BackCover,
    #[serde(other)]
    Unknown,
}

impl PageKind {
    pub fn label(&self) -> &'static str {
        match self {
            PageKind::Cover => "Cover",
            PageKind::Editorial => "Editorial",
            PageKind::Article => "Article",
            PageKind::Notice => "Notice",
            PageKind::Gallery => "Gallery",
            PageKind::Events => "Events",
            PageKind::Classifieds => "Classifieds",
            PageKind::BackCover => "Back cover",
            PageKind::Unknown => "Page",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PageKind,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl Page {
    pub fn new(id: impl Into<String>, kind: PageKind, content: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            kind,
            content,
        }
    }

    /// String field from the opaque content payload, if present.
    pub fn text_field(&self, key: &str) -> Option<&str> {
        self.content.get(key).and_then(|v| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.text_field("title")
    }

    /// Title for panels and thumbnails, falling back to the kind label.
    pub fn display_title(&self) -> String {
        self.title()
            .map(str::to_string)
            .unwrap_or_else(|| self.kind.label().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub page_index: usize,
    pub title: String,
    pub kind: PageKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentSerde {
    id: String,
    #[serde(default)]
    title: String,
    pages: Vec<Page>,
}

/// Ordered, non-empty sequence of pages. Fixed once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    id: String,
    title: String,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        pages: Vec<Page>,
    ) -> Result<Self, DocumentError> {
        let id = id.into();
        if !is_file_stem(&id) {
            return Err(DocumentError::InvalidId(id));
        }
        if pages.is_empty() {
            return Err(DocumentError::Empty);
        }

        let mut seen = HashSet::new();
        for page in &pages {
            if !seen.insert(page.id.as_str()) {
                return Err(DocumentError::DuplicatePageId(page.id.clone()));
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            pages,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let raw: DocumentSerde = serde_json::from_str(json)?;
        Self::new(raw.id, raw.title, raw.pages)
    }

    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    // Never true for a constructed document; kept for clippy's len_without_is_empty.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Entries for the table of contents: every page that carries a title,
    /// plus the cover even when untitled.
    pub fn toc_entries(&self) -> Vec<TocEntry> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| page.title().is_some() || page.kind == PageKind::Cover)
            .map(|(page_index, page)| TocEntry {
                page_index,
                title: page.display_title(),
                kind: page.kind,
            })
            .collect()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, DocumentError> {
        let raw = DocumentSerde {
            id: self.id.clone(),
            title: self.title.clone(),
            pages: self.pages.clone(),
        };
        Ok(serde_json::to_vec_pretty(&raw)?)
    }
}

/// True when `id` can name a file directly inside a directory.
pub fn is_file_stem(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SAMPLE: &str = r#"{
        "id": "mag-2024-03",
        "title": "Residencial Aurora",
        "pages": [
            {"id": "p1", "type": "cover", "content": {"subtitle": "March"}},
            {"id": "p2", "type": "article", "content": {"title": "Pool reopening", "body": "..."}},
            {"id": "p3", "type": "hologram", "content": {}}
        ]
    }"#;

    #[test]
    fn parses_pages_in_order() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        assert_eq!(doc.id(), "mag-2024-03");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.page(1).unwrap().kind, PageKind::Article);
        assert_eq!(doc.page(2).unwrap().kind, PageKind::Unknown);
    }

    #[test]
    fn rejects_empty_documents() {
        let err = Document::from_json_str(r#"{"id": "x", "pages": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Empty));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let pages = vec![
            Page::new("a", PageKind::Article, json!({})),
            Page::new("a", PageKind::Notice, json!({})),
        ];
        let err = Document::new("x", "", pages).unwrap_err();
        assert!(matches!(err, DocumentError::DuplicatePageId(id) if id == "a"));
    }

    #[test]
    fn rejects_ids_that_leave_the_directory() {
        for id in ["../escaped", "nested/issue", "..", "", "dos\\path"] {
            let pages = vec![Page::new("a", PageKind::Cover, json!({}))];
            let err = Document::new(id, "", pages).unwrap_err();
            assert!(matches!(err, DocumentError::InvalidId(ref bad) if bad == id));
        }

        let json = r#"{"id": "../escaped", "pages": [{"id": "a", "type": "cover"}]}"#;
        assert!(matches!(
            Document::from_json_str(json),
            Err(DocumentError::InvalidId(_))
        ));
        assert!(is_file_stem("mag..2024"));
    }

    #[test]
    fn toc_lists_cover_and_titled_pages() {
        let doc = Document::from_json_str(SAMPLE).unwrap();
        let toc = doc.toc_entries();
        assert_eq!(toc.len(), 2);
        assert_eq!(toc[0].title, "Cover");
        assert_eq!(toc[1].page_index, 1);
        assert_eq!(toc[1].title, "Pool reopening");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Document::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
