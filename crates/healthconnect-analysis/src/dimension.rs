//! Grouping keys and measured fields of derived encounters

use std::fmt;

use healthconnect_data::Category;
use serde::{Serialize, Serializer};

use crate::derive::DerivedEncounter;

/// Value of a grouping key.
///
/// Text keys order lexicographically by label and numeric keys numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Text(&'static str),
    Number(i64),
}

impl KeyValue {
    fn label<C: Category>(value: C) -> Self {
        Self::Text(value.label())
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(label) => f.pad(label),
            Self::Number(n) => fmt::Display::fmt(n, f),
        }
    }
}

impl Serialize for KeyValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Text(label) => serializer.serialize_str(label),
            Self::Number(n) => serializer.serialize_i64(*n),
        }
    }
}

/// A categorical field that records can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    AgeGroup,
    Age,
    Gender,
    Region,
    Diagnosis,
    Treatment,
    InsuranceType,
    AdmissionMonth,
    AdmissionYear,
}

impl Dimension {
    /// Column header used for the key in exported tables.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AgeGroup => "AgeGroup",
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::Region => "Region",
            Self::Diagnosis => "Diagnosis",
            Self::Treatment => "Treatment",
            Self::InsuranceType => "InsuranceType",
            Self::AdmissionMonth => "Month",
            Self::AdmissionYear => "Year",
        }
    }

    /// Key of `record` along this dimension; `None` when the record has no
    /// value for it (an age outside every age group).
    #[must_use]
    pub fn key(self, record: &DerivedEncounter) -> Option<KeyValue> {
        let encounter = &record.encounter;
        let key = match self {
            Self::AgeGroup => KeyValue::label(record.age_group?),
            Self::Age => KeyValue::Number(i64::from(encounter.age)),
            Self::Gender => KeyValue::label(encounter.gender),
            Self::Region => KeyValue::label(encounter.region),
            Self::Diagnosis => KeyValue::label(encounter.diagnosis),
            Self::Treatment => KeyValue::label(encounter.treatment),
            Self::InsuranceType => KeyValue::label(encounter.insurance_type),
            Self::AdmissionMonth => KeyValue::Number(i64::from(record.admission_month)),
            Self::AdmissionYear => KeyValue::Number(i64::from(record.admission_year)),
        };
        Some(key)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// A numeric or boolean field that statistics are computed over
///
/// Booleans measure as `1.0` / `0.0`, so their mean is a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
    PatientId,
    Age,
    LengthOfStay,
    TreatmentSuccess,
    InitialSeverity,
    Comorbidities,
    FollowUpVisits,
    RiskScore,
}

impl Measure {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PatientId => "PatientID",
            Self::Age => "Age",
            Self::LengthOfStay => "LengthOfStay",
            Self::TreatmentSuccess => "TreatmentSuccess",
            Self::InitialSeverity => "InitialSeverity",
            Self::Comorbidities => "Comorbidities",
            Self::FollowUpVisits => "FollowUpVisits",
            Self::RiskScore => "RiskScore",
        }
    }

    /// Value of the field for `record`, `None` when missing.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn value(self, record: &DerivedEncounter) -> Option<f64> {
        let encounter = &record.encounter;
        let value = match self {
            Self::PatientId => encounter.patient_id as f64,
            Self::Age => f64::from(encounter.age),
            Self::LengthOfStay => f64::from(encounter.length_of_stay),
            Self::TreatmentSuccess => f64::from(u8::from(encounter.treatment_success)),
            Self::InitialSeverity => f64::from(encounter.initial_severity),
            Self::Comorbidities => f64::from(encounter.comorbidities),
            Self::FollowUpVisits => f64::from(encounter.follow_up_visits),
            Self::RiskScore => record.risk_score,
        };
        (!value.is_nan()).then_some(value)
    }
}
