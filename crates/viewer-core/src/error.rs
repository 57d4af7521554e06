use pdf_engine::PdfEngineError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The engine could not open the document (corrupt, unreadable,
    /// unsupported).
    #[error("failed to open {path}: {source}")]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: PdfEngineError,
    },

    /// The selected entry is not an existing regular `.pdf` file.
    #[error("not a PDF file: {0}")]
    InvalidSelection(PathBuf),

    /// Rasterizing a page of an already open document failed.
    #[error("failed to render page {page}: {source}")]
    RenderFailure {
        page: u32,
        #[source]
        source: PdfEngineError,
    },
}

pub type ViewerResult<T> = Result<T, ViewerError>;
