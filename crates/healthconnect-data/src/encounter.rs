use std::ops::RangeInclusive;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{Diagnosis, Gender, InsuranceType, Region, Treatment};

/// Valid patient ages in years.
pub const AGE_RANGE: RangeInclusive<u8> = 18..=85;
/// Valid initial severity scores.
pub const SEVERITY_RANGE: RangeInclusive<u8> = 1..=10;
/// Valid comorbidity counts.
pub const COMORBIDITIES_RANGE: RangeInclusive<u8> = 0..=3;
/// Valid follow-up visit counts.
pub const FOLLOW_UP_VISITS_RANGE: RangeInclusive<u8> = 0..=5;

/// One diagnosis-treatment event for a patient.
///
/// Values of this type have passed validation: every numeric field is in
/// its domain, `discharge_date >= admission_date` and `length_of_stay`
/// equals the number of days between the two dates.
///
/// A patient with several diagnoses appears once per diagnosis, so
/// `patient_id` is not unique across encounters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientEncounter {
    pub patient_id: u64,
    pub age: u8,
    pub gender: Gender,
    pub region: Region,
    pub diagnosis: Diagnosis,
    pub treatment: Treatment,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    /// Days between admission and discharge
    pub length_of_stay: u32,
    pub treatment_success: bool,
    pub initial_severity: u8,
    pub comorbidities: u8,
    pub insurance_type: InsuranceType,
    pub follow_up_visits: u8,
}
