//! Print preview of a prescription draft.
//!
//! Renders a draft into a fixed plain-text clinical layout suitable for a terminal, a text file or
//! a printer. Rendering depends only on the draft and the renderer's branding, so rendering the
//! same draft twice yields byte-identical output.

use crate::constants::NOT_AVAILABLE;
use crate::draft::PrescriptionDraft;
use std::fmt::Write as _;

/// Width of the rendered page in characters.
const PAGE_WIDTH: usize = 72;

/// Host facility that prints a rendered prescription.
///
/// Printing is fire-and-forget: nothing is reported back to the authoring flow.
pub trait PrintFacility {
    fn print(&self, document: &str);
}

#[derive(Debug, Clone, Default)]
pub struct PreviewRenderer {
    branding: Option<String>,
}

impl PreviewRenderer {
    pub fn new(branding: Option<String>) -> Self {
        Self { branding }
    }

    pub fn from_config(cfg: &crate::CoreConfig) -> Self {
        Self::new(cfg.branding().map(str::to_string))
    }

    pub fn render(&self, draft: &PrescriptionDraft) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_document(&mut out, draft);
        out
    }

    fn write_document(&self, out: &mut String, draft: &PrescriptionDraft) -> std::fmt::Result {
        let doctor = draft.doctor();
        let heavy_rule = "=".repeat(PAGE_WIDTH);
        let light_rule = "-".repeat(PAGE_WIDTH);

        // Header
        writeln!(out, "{}", doctor.name)?;
        let credentials = join_present(&[
            doctor.specialization.as_str(),
            &prefixed("Reg: ", &doctor.registration_id),
        ]);
        if !credentials.is_empty() {
            writeln!(out, "{}", credentials)?;
        }
        let contact = join_present(&[doctor.address.as_str(), doctor.phone.as_str()]);
        if !contact.is_empty() {
            writeln!(out, "{}", contact)?;
        }
        if let Some(logo) = doctor.logo_ref.as_deref().filter(|l| !l.trim().is_empty()) {
            writeln!(out, "Logo: {}", logo)?;
        }
        writeln!(out, "{:>width$}", format!("Date: {}", draft.created_date()), width = PAGE_WIDTH)?;
        writeln!(out, "{}", heavy_rule)?;

        // Vitals and complaints
        writeln!(out, "Patient Vitals & Complaints")?;
        let vitals = draft.vitals();
        writeln!(
            out,
            "BP: {:<20} Sugar: {:<16} Weight: {}",
            or_na(&vitals.blood_pressure),
            or_na(&vitals.sugar),
            or_na(&vitals.weight)
        )?;
        let complaints = draft.complaints();
        if complaints.selected.is_empty() {
            writeln!(out, "Complaints: None selected")?;
        } else {
            writeln!(out, "Complaints: {}", complaints.selected.join(", "))?;
        }
        if !complaints.notes.trim().is_empty() {
            writeln!(out, "Notes: {}", complaints.notes.trim())?;
        }
        writeln!(out, "{}", light_rule)?;

        // Medicines
        writeln!(out, "Rx - Medications")?;
        let name_width = draft
            .medicines()
            .iter()
            .map(|m| m.name.chars().count())
            .chain(std::iter::once("Medicine".len()))
            .max()
            .unwrap_or(0)
            + 4;
        writeln!(
            out,
            "{:<name_width$}{:^7}{}",
            "Medicine",
            "Qty",
            "Dosage & Timing",
            name_width = name_width
        )?;
        for (index, medicine) in draft.medicines().iter().enumerate() {
            let numbered = format!("{}. {}", index + 1, medicine.name);
            writeln!(
                out,
                "{:<name_width$}{:^7}{}, {}",
                numbered,
                medicine.quantity.as_str(),
                medicine.dosage,
                medicine.preview_label(),
                name_width = name_width
            )?;
        }
        writeln!(out, "{}", light_rule)?;

        // Advice and footer
        writeln!(out, "Advice:")?;
        let advice = draft.advice_notes().trim();
        if advice.is_empty() {
            writeln!(out, "  No specific advice given.")?;
        } else {
            for line in advice.lines() {
                writeln!(out, "  {}", line)?;
            }
        }
        writeln!(out)?;
        writeln!(out, "Follow-up: Visit after ______ days.")?;
        writeln!(out)?;
        writeln!(out, "{:>width$}", "Doctor's Signature", width = PAGE_WIDTH)?;
        writeln!(out, "{:>width$}", "Thank you for visiting.", width = PAGE_WIDTH)?;
        if let Some(branding) = self.branding.as_deref() {
            writeln!(out, "Powered by {}", branding)?;
        }

        Ok(())
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_AVAILABLE
    } else {
        value
    }
}

fn prefixed(prefix: &str, value: &str) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        format!("{}{}", prefix, value.trim())
    }
}

fn join_present(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
