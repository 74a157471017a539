use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export service failed: {0}")]
    Service(String),
    #[error("could not save export: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a downloadable rendition of a document. The viewer only tracks
/// whether a request is running; the work happens elsewhere.
pub trait DocumentExporter: Send {
    fn export(&self, document_id: &str) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportButton {
    #[default]
    Idle,
    InFlight {
        document_id: String,
    },
}

impl ExportButton {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ExportButton::InFlight { .. })
    }

    /// Returns false when an export is already running.
    pub fn begin(&mut self, document_id: &str) -> bool {
        if self.is_in_flight() {
            return false;
        }
        *self = ExportButton::InFlight {
            document_id: document_id.to_string(),
        };
        true
    }

    /// Back to idle; returns the message to show the reader.
    pub fn finish<T>(&mut self, result: &Result<T, ExportError>) -> String {
        let document_id = match std::mem::take(self) {
            ExportButton::InFlight { document_id } => document_id,
            ExportButton::Idle => String::new(),
        };
        match result {
            Ok(_) => format!("Exported {document_id}"),
            Err(e) => format!("Export failed: {e}"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportButton::Idle => "Export",
            ExportButton::InFlight { .. } => "Exporting…",
        }
    }
}
