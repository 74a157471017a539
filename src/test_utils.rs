//! Fakes shared by unit and integration tests.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use ratatui::{Terminal, backend::TestBackend};
use serde_json::json;

use crate::document::{Document, Page, PageKind};
use crate::main_app::{App, TerminalHost};
use crate::viewer::{HostError, ListenerId, ListenerKind, ListenerSet, ViewerConfig, ViewerHost};

#[derive(Debug, Default)]
pub struct FakeHost {
    pub flags: HashSet<String>,
    pub listeners: ListenerSet,
    pub fullscreen: bool,
    pub reject_fullscreen: bool,
    pub fail_flag_writes: bool,
}

impl ViewerHost for FakeHost {
    fn request_fullscreen(&mut self) -> Result<(), HostError> {
        if self.reject_fullscreen {
            return Err(HostError::FullscreenRejected(
                "permission denied".to_string(),
            ));
        }
        self.fullscreen = true;
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<(), HostError> {
        self.fullscreen = false;
        Ok(())
    }

    fn read_flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    fn write_flag(&mut self, key: &str) -> Result<(), HostError> {
        if self.fail_flag_writes {
            return Err(HostError::Storage {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        self.flags.insert(key.to_string());
        Ok(())
    }

    fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        self.listeners.add(kind)
    }

    fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

/// A document with `pages` pages named "Page 1", "Page 2", ... The first
/// page is a cover.
pub fn sample_document(pages: usize) -> Document {
    let pages = (0..pages)
        .map(|i| {
            let kind = if i == 0 {
                PageKind::Cover
            } else {
                PageKind::Article
            };
            Page::new(
                format!("page-{}", i + 1),
                kind,
                json!({
                    "title": format!("Page {}", i + 1),
                    "body": format!("Body of page {}", i + 1),
                }),
            )
        })
        .collect();

    Document::new("sample", "Sample Magazine", pages).expect("sample document has pages")
}

pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
    let backend = TestBackend::new(width, height);
    Terminal::new(backend).expect("test backend never fails")
}

/// App over [`sample_document`] with an in-memory host, so tests never touch
/// the real settings file.
pub fn create_test_app(pages: usize, width: u16, export_dir: &Path, now: Instant) -> App {
    App::new(
        sample_document(pages),
        ViewerConfig::default(),
        TerminalHost::in_memory(width),
        export_dir.to_path_buf(),
        now,
    )
    .expect("sample app mounts")
}

/// Terminal buffer as one string per row.
pub fn buffer_lines(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect())
        .collect()
}
