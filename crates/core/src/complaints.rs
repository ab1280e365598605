//! Complaint selector.

use crate::constants::COMMON_COMPLAINTS;
use crate::{PrescriptionError, PrescriptionResult};

/// Selected complaints from a fixed vocabulary plus free-text notes.
///
/// Selection keeps insertion order so rendering is stable; membership is what matters.
#[derive(Debug, Clone)]
pub struct ComplaintSet {
    vocabulary: Vec<String>,
    selected: Vec<String>,
    notes: String,
}

impl ComplaintSet {
    pub fn new(vocabulary: Vec<String>) -> Self {
        Self {
            vocabulary,
            selected: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_selected(&self, label: &str) -> bool {
        let label = label.trim();
        self.selected.iter().any(|c| c == label)
    }

    /// Flip membership of `label`, returning whether it is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `PrescriptionError::InvalidInput` if `label` is not part of the vocabulary.
    pub fn toggle(&mut self, label: &str) -> PrescriptionResult<bool> {
        let label = label.trim();
        let Some(known) = self.vocabulary.iter().find(|c| c.as_str() == label) else {
            return Err(PrescriptionError::InvalidInput(format!(
                "unknown complaint '{}'",
                label
            )));
        };

        if let Some(pos) = self.selected.iter().position(|c| c == known) {
            self.selected.remove(pos);
            Ok(false)
        } else {
            self.selected.push(known.clone());
            Ok(true)
        }
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }
}

impl Default for ComplaintSet {
    fn default() -> Self {
        Self::new(COMMON_COMPLAINTS.iter().map(|c| c.to_string()).collect())
    }
}
