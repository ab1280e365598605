//! Medicine list editor.
//!
//! An ordered list of medicine rows. Rows are appended with defaults, edited field by field and
//! removed by position or by the stable [`MedicineId`] handed out when the row was added, so a
//! caller holding an id is never confused by earlier rows shifting down.

use crate::finalize::ClinicApi;
use crate::PrescriptionError;
use serde::{Deserialize, Serialize};

/// Strength of a single dose.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum DosageStrength {
    #[default]
    #[serde(rename = "1 tab")]
    OneTab,
    #[serde(rename = "2 tabs")]
    TwoTabs,
    #[serde(rename = "3 tabs")]
    ThreeTabs,
    #[serde(rename = "1 ml")]
    OneMl,
    #[serde(rename = "2 ml")]
    TwoMl,
}

impl DosageStrength {
    pub const ALL: [DosageStrength; 5] = [
        DosageStrength::OneTab,
        DosageStrength::TwoTabs,
        DosageStrength::ThreeTabs,
        DosageStrength::OneMl,
        DosageStrength::TwoMl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DosageStrength::OneTab => "1 tab",
            DosageStrength::TwoTabs => "2 tabs",
            DosageStrength::ThreeTabs => "3 tabs",
            DosageStrength::OneMl => "1 ml",
            DosageStrength::TwoMl => "2 ml",
        }
    }
}

impl std::fmt::Display for DosageStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DosageStrength {
    type Err = PrescriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        DosageStrength::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PrescriptionError::InvalidInput(format!("unknown dosage '{}'", s)))
    }
}

/// Whether a medicine is taken before or after food. Exactly one always applies.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum MealRelation {
    Before,
    #[default]
    After,
}

impl MealRelation {
    pub fn as_str(self) -> &'static str {
        match self {
            MealRelation::Before => "before",
            MealRelation::After => "after",
        }
    }

    pub fn food_phrase(self) -> &'static str {
        match self {
            MealRelation::Before => "Before Food",
            MealRelation::After => "After Food",
        }
    }
}

impl std::fmt::Display for MealRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MealRelation {
    type Err = PrescriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(MealRelation::Before),
            "after" => Ok(MealRelation::After),
            other => Err(PrescriptionError::InvalidInput(format!(
                "meal relation must be 'before' or 'after' (got '{}')",
                other
            ))),
        }
    }
}

/// Time-of-day and meal relation for a medicine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub morning: bool,
    #[serde(default)]
    pub afternoon: bool,
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub meal_relation: MealRelation,
}

/// Free-text quantity as typed into the form.
///
/// Accepts either a JSON/YAML number or a string when deserialised; it is only interpreted as an
/// integer when the finalize payload is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(String);

impl Quantity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Quantity(n.to_string()),
            Raw::Float(n) => Quantity(n.to_string()),
            Raw::Text(s) => Quantity(s),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineEntry {
    pub name: String,
    pub quantity: Quantity,
    pub dosage: DosageStrength,
    pub schedule: Schedule,
}

impl MedicineEntry {
    /// Rows whose name is blank after trimming are dropped at submission.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A scalar field edit for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicineField {
    Name(String),
    Quantity(Quantity),
    Dosage(DosageStrength),
}

/// An edit of one row's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleUpdate {
    Morning(bool),
    Afternoon(bool),
    Night(bool),
    Meal(MealRelation),
}

/// Stable identifier of a row within one [`MedicineList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MedicineId(u64);

impl std::fmt::Display for MedicineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MedicineList {
    rows: Vec<(MedicineId, MedicineEntry)>,
    next_id: u64,
}

impl MedicineList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MedicineEntry> {
        self.rows.get(index).map(|(_, entry)| entry)
    }

    pub fn id_at(&self, index: usize) -> Option<MedicineId> {
        self.rows.get(index).map(|(id, _)| *id)
    }

    pub fn index_of(&self, id: MedicineId) -> Option<usize> {
        self.rows.iter().position(|(row_id, _)| *row_id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MedicineId, &MedicineEntry)> {
        self.rows.iter().map(|(id, entry)| (*id, entry))
    }

    /// Rows that will survive submission, in list order.
    pub fn named_entries(&self) -> impl Iterator<Item = &MedicineEntry> {
        self.rows
            .iter()
            .map(|(_, entry)| entry)
            .filter(|entry| entry.has_name())
    }

    /// Append a row with default values to the end of the list.
    pub fn add_row(&mut self) -> MedicineId {
        let id = MedicineId(self.next_id);
        self.next_id += 1;
        self.rows.push((id, MedicineEntry::default()));
        tracing::debug!(%id, rows = self.rows.len(), "medicine row added");
        id
    }

    /// Remove the row at `index`. Out-of-range indices are ignored.
    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            let (id, _) = self.rows.remove(index);
            tracing::debug!(%id, index, "medicine row removed");
        }
    }

    /// Remove the row with `id`, returning whether it existed.
    pub fn remove(&mut self, id: MedicineId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.remove_row(index);
                true
            }
            None => false,
        }
    }

    /// Apply a scalar edit to the row at `index`; returns `false` when there is no such row.
    pub fn update_field(&mut self, index: usize, field: MedicineField) -> bool {
        let Some((_, entry)) = self.rows.get_mut(index) else {
            return false;
        };

        match field {
            MedicineField::Name(name) => entry.name = name,
            MedicineField::Quantity(quantity) => entry.quantity = quantity,
            MedicineField::Dosage(dosage) => entry.dosage = dosage,
        }
        true
    }

    /// Apply a schedule edit to the row at `index`; returns `false` when there is no such row.
    pub fn update_schedule(&mut self, index: usize, update: ScheduleUpdate) -> bool {
        let Some((_, entry)) = self.rows.get_mut(index) else {
            return false;
        };

        let schedule = &mut entry.schedule;
        match update {
            ScheduleUpdate::Morning(on) => schedule.morning = on,
            ScheduleUpdate::Afternoon(on) => schedule.afternoon = on,
            ScheduleUpdate::Night(on) => schedule.night = on,
            ScheduleUpdate::Meal(relation) => schedule.meal_relation = relation,
        }
        true
    }
}

/// Names from `catalog` containing `query`, ignoring case. An empty query matches everything.
///
/// Suggestions never restrict what may be typed as a medicine name.
pub fn suggest<'a>(catalog: &'a [String], query: &str) -> Vec<&'a str> {
    let needle = query.trim().to_lowercase();
    catalog
        .iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(String::as_str)
        .collect()
}

/// Medicine names available for autocomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineCatalog {
    names: Vec<String>,
}

impl MedicineCatalog {
    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Fetch the catalog from the clinic API.
    ///
    /// Any failure yields an empty catalog: suggestions are an aid and must never block manual
    /// entry.
    pub async fn load<A: ClinicApi>(api: &A) -> Self {
        match api.fetch_common_medicines().await {
            Ok(names) => {
                tracing::debug!(count = names.len(), "medicine catalog loaded");
                Self { names }
            }
            Err(e) => {
                tracing::warn!("medicine catalog unavailable, suggestions disabled: {}", e);
                Self::default()
            }
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn suggest(&self, query: &str) -> Vec<&str> {
        suggest(&self.names, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeClinicApi;

    fn named(list: &MedicineList) -> Vec<&str> {
        list.iter().map(|(_, e)| e.name.as_str()).collect()
    }

    #[test]
    fn test_add_row_appends_defaults() {
        let mut list = MedicineList::new();
        list.add_row();
        let entry = list.get(0).expect("row exists");
        assert_eq!(entry.name, "");
        assert_eq!(entry.dosage, DosageStrength::OneTab);
        assert_eq!(entry.schedule, Schedule::default());
        assert_eq!(entry.schedule.meal_relation, MealRelation::After);
    }

    #[test]
    fn test_remove_row_keeps_relative_order() {
        let mut list = MedicineList::new();
        for name in ["Amoxicillin", "Vitamin D", "Cetirizine", "Omeprazole"] {
            list.add_row();
            let last = list.len() - 1;
            list.update_field(last, MedicineField::Name(name.into()));
        }

        list.remove_row(1);

        assert_eq!(list.len(), 3);
        assert_eq!(named(&list), ["Amoxicillin", "Cetirizine", "Omeprazole"]);
    }

    #[test]
    fn test_remove_row_out_of_bounds_is_noop() {
        let mut list = MedicineList::new();
        list.remove_row(0);
        assert!(list.is_empty());

        list.add_row();
        list.remove_row(5);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_ids_survive_index_shifts() {
        let mut list = MedicineList::new();
        let first = list.add_row();
        let second = list.add_row();
        let third = list.add_row();

        assert!(list.remove(first));
        assert_eq!(list.index_of(second), Some(0));
        assert_eq!(list.index_of(third), Some(1));
        assert!(!list.remove(first));
    }

    #[test]
    fn test_update_field_and_schedule() {
        let mut list = MedicineList::new();
        list.add_row();
        assert!(list.update_field(0, MedicineField::Quantity(Quantity::new("10"))));
        assert!(list.update_field(0, MedicineField::Dosage(DosageStrength::TwoMl)));
        assert!(list.update_schedule(0, ScheduleUpdate::Night(true)));
        assert!(list.update_schedule(0, ScheduleUpdate::Meal(MealRelation::Before)));
        assert!(list.update_schedule(0, ScheduleUpdate::Meal(MealRelation::After)));

        let entry = list.get(0).expect("row exists");
        assert_eq!(entry.quantity.as_str(), "10");
        assert_eq!(entry.dosage, DosageStrength::TwoMl);
        assert!(entry.schedule.night && !entry.schedule.morning);
        assert_eq!(entry.schedule.meal_relation, MealRelation::After);

        assert!(!list.update_field(3, MedicineField::Name("x".into())));
        assert!(!list.update_schedule(3, ScheduleUpdate::Morning(true)));
    }

    #[test]
    fn test_named_entries_skip_blank_names() {
        let mut list = MedicineList::new();
        list.add_row();
        list.add_row();
        list.update_field(1, MedicineField::Name("  Paracetamol ".into()));
        list.add_row();
        list.update_field(2, MedicineField::Name("   ".into()));

        let names: Vec<_> = list.named_entries().map(|e| e.name.trim()).collect();
        assert_eq!(names, ["Paracetamol"]);
    }

    #[test]
    fn test_dosage_and_meal_parsing() {
        assert_eq!("2 TABS".parse::<DosageStrength>().expect("valid"), DosageStrength::TwoTabs);
        assert!("5 tabs".parse::<DosageStrength>().is_err());
        assert_eq!("Before".parse::<MealRelation>().expect("valid"), MealRelation::Before);
        assert!("during".parse::<MealRelation>().is_err());
    }

    #[test]
    fn test_quantity_accepts_numbers_and_strings() {
        let q: Quantity = serde_json::from_str("10").expect("number");
        assert_eq!(q.as_str(), "10");
        let q: Quantity = serde_json::from_str("\"1 strip\"").expect("string");
        assert_eq!(q.as_str(), "1 strip");
    }

    #[test]
    fn test_suggest_is_case_insensitive_substring() {
        let catalog: Vec<String> = ["Paracetamol", "Pantoprazole", "Amoxicillin"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(suggest(&catalog, "PAN"), ["Pantoprazole"]);
        assert_eq!(suggest(&catalog, "a").len(), 3);
        assert_eq!(suggest(&catalog, "").len(), 3);
        assert!(suggest(&catalog, "ibuprofen").is_empty());
    }

    #[tokio::test]
    async fn test_catalog_load_degrades_to_empty() {
        let api = FakeClinicApi::failing_catalog();
        let catalog = MedicineCatalog::load(&api).await;
        assert!(catalog.names().is_empty());
        assert!(catalog.suggest("para").is_empty());
    }

    #[tokio::test]
    async fn test_catalog_load_uses_api_names() {
        let api = FakeClinicApi::with_catalog(&["Paracetamol", "Cetirizine"]);
        let catalog = MedicineCatalog::load(&api).await;
        assert_eq!(catalog.suggest("CET"), ["Cetirizine"]);
    }
}
