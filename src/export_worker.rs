use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{error, info};

use crate::document::{Document, is_file_stem};
use crate::viewer::{DocumentExporter, ExportError};

/// Exports the loaded document as a pretty-printed JSON snapshot.
pub struct SnapshotExporter {
    document: Arc<Document>,
}

impl SnapshotExporter {
    pub fn new(document: Arc<Document>) -> Self {
        Self { document }
    }
}

impl DocumentExporter for SnapshotExporter {
    fn export(&self, document_id: &str) -> Result<Vec<u8>, ExportError> {
        if document_id != self.document.id() {
            return Err(ExportError::Service(format!(
                "unknown document '{document_id}'"
            )));
        }
        self.document
            .to_json_bytes()
            .map_err(|e| ExportError::Service(e.to_string()))
    }
}

pub fn export_path(out_dir: &Path, document_id: &str) -> PathBuf {
    out_dir.join(format!("{document_id}.export.json"))
}

/// Writes beside the target first so a reader never sees a half-written
/// export.
fn write_export(out_dir: &Path, document_id: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
    if !is_file_stem(document_id) {
        return Err(ExportError::Service(format!(
            "document id '{document_id}' is not usable as a file name"
        )));
    }
    let path = export_path(out_dir, document_id);
    let partial = out_dir.join(format!(".{document_id}.export.json.partial"));
    fs::write(&partial, bytes)?;
    if let Err(e) = fs::rename(&partial, &path) {
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }
    Ok(path)
}

/// One export running on its own thread. Poll with [`ExportJob::poll`].
pub struct ExportJob {
    rx: Receiver<Result<PathBuf, ExportError>>,
}

impl ExportJob {
    pub fn spawn(
        exporter: Box<dyn DocumentExporter>,
        document_id: String,
        out_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = exporter
                .export(&document_id)
                .and_then(|bytes| write_export(&out_dir, &document_id, &bytes));
            match &result {
                Ok(path) => info!("Export written to {}", path.display()),
                Err(e) => error!("Export of {document_id} failed: {e}"),
            }
            // The app may have quit already.
            let _ = tx.send(result);
        });

        Self { rx }
    }

    /// The finished result, once. `None` while still running.
    pub fn poll(&self) -> Option<Result<PathBuf, ExportError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExportError::Service(
                "export worker stopped unexpectedly".to_string(),
            ))),
        }
    }

    /// Blocks until the worker reports.
    pub fn wait(self) -> Result<PathBuf, ExportError> {
        self.rx.recv().unwrap_or_else(|_| {
            Err(ExportError::Service(
                "export worker stopped unexpectedly".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_document;
    use tempfile::TempDir;

    #[test]
    fn writes_snapshot_next_to_output_dir() {
        let dir = TempDir::new().unwrap();
        let document = Arc::new(sample_document(2));
        let job = ExportJob::spawn(
            Box::new(SnapshotExporter::new(document.clone())),
            "sample".to_string(),
            dir.path().to_path_buf(),
        );

        let path = job.wait().unwrap();
        assert_eq!(path, export_path(dir.path(), "sample"));
        let written = Document::load(&path).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written.title(), document.title());
    }

    struct FixedExporter;

    impl DocumentExporter for FixedExporter {
        fn export(&self, _document_id: &str) -> Result<Vec<u8>, ExportError> {
            Ok(b"{}".to_vec())
        }
    }

    #[test]
    fn id_with_parent_component_stays_inside_output_dir() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("docs");
        fs::create_dir(&out_dir).unwrap();

        let job = ExportJob::spawn(
            Box::new(FixedExporter),
            "../escaped".to_string(),
            out_dir.clone(),
        );

        assert!(matches!(job.wait(), Err(ExportError::Service(_))));
        assert!(!dir.path().join("escaped.export.json").exists());
        assert_eq!(fs::read_dir(&out_dir).unwrap().count(), 0);
    }

    #[test]
    fn finished_export_leaves_no_partial_file() {
        let dir = TempDir::new().unwrap();
        let job = ExportJob::spawn(
            Box::new(FixedExporter),
            "sample".to_string(),
            dir.path().to_path_buf(),
        );

        let path = job.wait().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"{}");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("sample.export.json")]);
    }

    #[test]
    fn unknown_document_is_a_service_error() {
        let exporter = SnapshotExporter::new(Arc::new(sample_document(1)));
        let err = exporter.export("other").unwrap_err();
        assert!(matches!(err, ExportError::Service(_)));
    }

    #[test]
    fn missing_output_dir_is_an_io_error() {
        let job = ExportJob::spawn(
            Box::new(SnapshotExporter::new(Arc::new(sample_document(1)))),
            "sample".to_string(),
            PathBuf::from("/definitely/not/here"),
        );
        assert!(matches!(job.wait(), Err(ExportError::Io(_))));
    }
}
