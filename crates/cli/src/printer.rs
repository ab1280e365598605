//! Print facilities for the terminal.

use rx_core::{PrescriptionError, PrescriptionResult, PrintFacility};
use std::path::PathBuf;

/// Prints the document to standard output.
pub struct StdoutPrinter;

impl PrintFacility for StdoutPrinter {
    fn print(&self, document: &str) {
        print!("{}", document);
    }
}

/// Writes the document to a file the user asked for, replacing any previous content.
///
/// Unlike the print facility, a failed write is an error for the caller.
pub struct FilePrinter {
    path: PathBuf,
}

impl FilePrinter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the document, reporting failure to the caller.
    ///
    /// # Errors
    ///
    /// Returns `PrescriptionError::FileWrite` if the file cannot be written.
    pub fn write(&self, document: &str) -> PrescriptionResult<()> {
        std::fs::write(&self.path, document).map_err(PrescriptionError::FileWrite)?;
        tracing::info!("prescription written to {}", self.path.display());
        Ok(())
    }
}
