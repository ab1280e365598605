//! Vitals capture.
//!
//! Blood pressure, sugar and weight are each optional per visit. A reading is either recorded,
//! in which case its free-text value is kept, or not recorded, in which case its value is always
//! the empty string.

use crate::draft::DraftVitals;
use serde::{Deserialize, Serialize};

/// The vitals captured on a prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    BloodPressure,
    Sugar,
    Weight,
}

impl VitalField {
    pub const ALL: [VitalField; 3] = [VitalField::BloodPressure, VitalField::Sugar, VitalField::Weight];

    pub fn label(self) -> &'static str {
        match self {
            VitalField::BloodPressure => "Blood Pressure",
            VitalField::Sugar => "Sugar Level",
            VitalField::Weight => "Weight",
        }
    }

    /// Illustrative input format; never enforced.
    pub fn placeholder(self) -> &'static str {
        match self {
            VitalField::BloodPressure => "120/80 mmHg",
            VitalField::Sugar => "90 mg/dl",
            VitalField::Weight => "70 kg",
        }
    }
}

/// One optional vital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VitalReading {
    recorded: bool,
    value: String,
}

impl VitalReading {
    pub fn recorded(&self) -> bool {
        self.recorded
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Marking a reading as not recorded clears its value in the same step.
    pub fn set_recorded(&mut self, recorded: bool) {
        self.recorded = recorded;
        if !recorded {
            self.value.clear();
        }
    }

    /// Returns `false` and leaves the reading untouched when it is not recorded.
    pub fn set_value(&mut self, value: impl Into<String>) -> bool {
        if !self.recorded {
            return false;
        }
        self.value = value.into();
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct VitalsCapture {
    blood_pressure: VitalReading,
    sugar: VitalReading,
    weight: VitalReading,
}

impl VitalsCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reading(&self, field: VitalField) -> &VitalReading {
        match field {
            VitalField::BloodPressure => &self.blood_pressure,
            VitalField::Sugar => &self.sugar,
            VitalField::Weight => &self.weight,
        }
    }

    fn reading_mut(&mut self, field: VitalField) -> &mut VitalReading {
        match field {
            VitalField::BloodPressure => &mut self.blood_pressure,
            VitalField::Sugar => &mut self.sugar,
            VitalField::Weight => &mut self.weight,
        }
    }

    pub fn set_recorded(&mut self, field: VitalField, recorded: bool) {
        tracing::debug!(?field, recorded, "vital recorded flag changed");
        self.reading_mut(field).set_recorded(recorded);
    }

    pub fn set_value(&mut self, field: VitalField, value: impl Into<String>) -> bool {
        let applied = self.reading_mut(field).set_value(value);
        if !applied {
            tracing::debug!(?field, "ignored value for vital that is not recorded");
        }
        applied
    }

    /// Convenience for callers that hold an optional value: `Some` records it, `None` clears it.
    pub fn record(&mut self, field: VitalField, value: Option<String>) {
        match value {
            Some(value) => {
                self.set_recorded(field, true);
                self.set_value(field, value);
            }
            None => self.set_recorded(field, false),
        }
    }

    /// Fold the readings into draft values, using the empty string for anything not recorded.
    pub fn snapshot(&self) -> DraftVitals {
        fn gated(reading: &VitalReading) -> String {
            if reading.recorded {
                reading.value.clone()
            } else {
                String::new()
            }
        }

        DraftVitals {
            blood_pressure: gated(&self.blood_pressure),
            sugar: gated(&self.sugar),
            weight: gated(&self.weight),
        }
    }
}
