//! Raw CSV rows and field-level validation
//!
//! [`EncounterRow`] mirrors the input file column for column, keeping every
//! value as text. [`EncounterRow::validate`] turns it into a typed
//! [`PatientEncounter`] or reports the first offending column.

use std::{fmt, ops::RangeInclusive};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    category::{Category, UnknownCategory},
    encounter::{
        AGE_RANGE, COMORBIDITIES_RANGE, FOLLOW_UP_VISITS_RANGE, PatientEncounter, SEVERITY_RANGE,
    },
};

/// Column names of the input file, in file order.
pub const COLUMNS: [&str; 14] = [
    "PatientID",
    "Age",
    "Gender",
    "Region",
    "Diagnosis",
    "Treatment",
    "AdmissionDate",
    "DischargeDate",
    "LengthOfStay",
    "TreatmentSuccess",
    "InitialSeverity",
    "Comorbidities",
    "InsuranceType",
    "FollowUpVisits",
];

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const US_DATE_FORMAT: &str = "%m/%d/%Y";

/// One line of the input file, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterRow {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Diagnosis")]
    pub diagnosis: String,
    #[serde(rename = "Treatment")]
    pub treatment: String,
    #[serde(rename = "AdmissionDate")]
    pub admission_date: String,
    #[serde(rename = "DischargeDate")]
    pub discharge_date: String,
    #[serde(rename = "LengthOfStay")]
    pub length_of_stay: String,
    #[serde(rename = "TreatmentSuccess")]
    pub treatment_success: String,
    #[serde(rename = "InitialSeverity")]
    pub initial_severity: String,
    #[serde(rename = "Comorbidities")]
    pub comorbidities: String,
    #[serde(rename = "InsuranceType")]
    pub insurance_type: String,
    #[serde(rename = "FollowUpVisits")]
    pub follow_up_visits: String,
}

/// Why a single field was rejected
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum FieldError {
    #[display("value is missing")]
    Missing,
    #[display("'{value}' is not a non-negative integer")]
    NotAnInteger { value: String },
    #[display("{value} is outside {min}..={max}")]
    OutOfRange { value: u64, min: u64, max: u64 },
    #[display("{_0}")]
    UnknownCategory(UnknownCategory),
    #[display("'{value}' is not a recognized date")]
    InvalidDate { value: String },
    #[display("'{value}' is not a boolean")]
    InvalidBool { value: String },
    #[display("discharge date {discharge} is before admission date {admission}")]
    DischargeBeforeAdmission {
        admission: NaiveDate,
        discharge: NaiveDate,
    },
    #[display("length of stay {actual} does not match the {expected} days between admission and discharge")]
    LengthOfStayMismatch { expected: i64, actual: u32 },
    #[display("malformed row: {message}")]
    Malformed { message: String },
}

/// A rejected input row
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct ValidationError {
    /// Line number in the input file (the header is line 1)
    pub line: u64,
    /// Offending column
    pub field: &'static str,
    #[error(source)]
    pub reason: FieldError,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {}", self.line, self.field, self.reason)
    }
}

impl EncounterRow {
    /// Validates every field and builds the typed encounter.
    ///
    /// `line` is only used to locate the error.
    pub fn validate(&self, line: u64) -> Result<PatientEncounter, ValidationError> {
        let at = |field: &'static str| move |reason: FieldError| ValidationError { line, field, reason };

        let patient_id = parse_unsigned(&self.patient_id).map_err(at("PatientID"))?;
        let age = parse_in_range(&self.age, &AGE_RANGE).map_err(at("Age"))?;
        let gender = parse_category(&self.gender).map_err(at("Gender"))?;
        let region = parse_category(&self.region).map_err(at("Region"))?;
        let diagnosis = parse_category(&self.diagnosis).map_err(at("Diagnosis"))?;
        let treatment = parse_category(&self.treatment).map_err(at("Treatment"))?;
        let admission_date = parse_date(&self.admission_date).map_err(at("AdmissionDate"))?;
        let discharge_date = parse_date(&self.discharge_date).map_err(at("DischargeDate"))?;
        let length_of_stay = parse_unsigned(&self.length_of_stay)
            .and_then(|v| {
                u32::try_from(v).map_err(|_| FieldError::OutOfRange {
                    value: v,
                    min: 0,
                    max: u64::from(u32::MAX),
                })
            })
            .map_err(at("LengthOfStay"))?;
        let treatment_success = parse_bool(&self.treatment_success).map_err(at("TreatmentSuccess"))?;
        let initial_severity =
            parse_in_range(&self.initial_severity, &SEVERITY_RANGE).map_err(at("InitialSeverity"))?;
        let comorbidities =
            parse_in_range(&self.comorbidities, &COMORBIDITIES_RANGE).map_err(at("Comorbidities"))?;
        let insurance_type = parse_category(&self.insurance_type).map_err(at("InsuranceType"))?;
        let follow_up_visits = parse_in_range(&self.follow_up_visits, &FOLLOW_UP_VISITS_RANGE)
            .map_err(at("FollowUpVisits"))?;

        if discharge_date < admission_date {
            return Err(at("DischargeDate")(FieldError::DischargeBeforeAdmission {
                admission: admission_date,
                discharge: discharge_date,
            }));
        }
        let expected = (discharge_date - admission_date).num_days();
        if expected != i64::from(length_of_stay) {
            return Err(at("LengthOfStay")(FieldError::LengthOfStayMismatch {
                expected,
                actual: length_of_stay,
            }));
        }

        Ok(PatientEncounter {
            patient_id,
            age,
            gender,
            region,
            diagnosis,
            treatment,
            admission_date,
            discharge_date,
            length_of_stay,
            treatment_success,
            initial_severity,
            comorbidities,
            insurance_type,
            follow_up_visits,
        })
    }
}

impl From<&PatientEncounter> for EncounterRow {
    fn from(encounter: &PatientEncounter) -> Self {
        Self {
            patient_id: encounter.patient_id.to_string(),
            age: encounter.age.to_string(),
            gender: encounter.gender.label().to_owned(),
            region: encounter.region.label().to_owned(),
            diagnosis: encounter.diagnosis.label().to_owned(),
            treatment: encounter.treatment.label().to_owned(),
            admission_date: encounter.admission_date.format(DATE_FORMAT).to_string(),
            discharge_date: encounter.discharge_date.format(DATE_FORMAT).to_string(),
            length_of_stay: encounter.length_of_stay.to_string(),
            treatment_success: if encounter.treatment_success {
                "True"
            } else {
                "False"
            }
            .to_owned(),
            initial_severity: encounter.initial_severity.to_string(),
            comorbidities: encounter.comorbidities.to_string(),
            insurance_type: encounter.insurance_type.label().to_owned(),
            follow_up_visits: encounter.follow_up_visits.to_string(),
        }
    }
}

fn non_empty(value: &str) -> Result<&str, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FieldError::Missing)
    } else {
        Ok(value)
    }
}

fn parse_unsigned(value: &str) -> Result<u64, FieldError> {
    let value = non_empty(value)?;
    value.parse().map_err(|_| FieldError::NotAnInteger {
        value: value.to_owned(),
    })
}

fn parse_in_range(value: &str, range: &RangeInclusive<u8>) -> Result<u8, FieldError> {
    let parsed = parse_unsigned(value)?;
    u8::try_from(parsed)
        .ok()
        .filter(|v| range.contains(v))
        .ok_or(FieldError::OutOfRange {
            value: parsed,
            min: u64::from(*range.start()),
            max: u64::from(*range.end()),
        })
}

fn parse_category<C>(value: &str) -> Result<C, FieldError>
where
    C: Category,
{
    let value = non_empty(value)?;
    C::from_str(value).map_err(FieldError::UnknownCategory)
}

fn parse_date(value: &str) -> Result<NaiveDate, FieldError> {
    let value = non_empty(value)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|datetime| datetime.date())
        })
        .or_else(|| NaiveDate::parse_from_str(value, US_DATE_FORMAT).ok())
        .ok_or_else(|| FieldError::InvalidDate {
            value: value.to_owned(),
        })
}

fn parse_bool(value: &str) -> Result<bool, FieldError> {
    match non_empty(value)? {
        "True" | "true" | "TRUE" | "1" => Ok(true),
        "False" | "false" | "FALSE" | "0" => Ok(false),
        other => Err(FieldError::InvalidBool {
            value: other.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Diagnosis, InsuranceType};

    fn valid_row() -> EncounterRow {
        EncounterRow {
            patient_id: "123456".into(),
            age: "45".into(),
            gender: "F".into(),
            region: "North".into(),
            diagnosis: "Type 2 Diabetes".into(),
            treatment: "Surgery".into(),
            admission_date: "2023-12-30".into(),
            discharge_date: "2024-01-04".into(),
            length_of_stay: "5".into(),
            treatment_success: "True".into(),
            initial_severity: "7".into(),
            comorbidities: "2".into(),
            insurance_type: "None".into(),
            follow_up_visits: "3".into(),
        }
    }

    #[test]
    fn test_valid_row() {
        let encounter = valid_row().validate(2).unwrap();
        assert_eq!(encounter.patient_id, 123_456);
        assert_eq!(encounter.diagnosis, Diagnosis::Type2Diabetes);
        assert_eq!(encounter.insurance_type, InsuranceType::Uninsured);
        assert_eq!(encounter.length_of_stay, 5);
        assert!(encounter.treatment_success);
    }

    #[test]
    fn test_round_trip_through_row() {
        let encounter = valid_row().validate(2).unwrap();
        let row = EncounterRow::from(&encounter);
        assert_eq!(row, valid_row());
    }

    #[test]
    fn test_alternative_date_formats() {
        let mut row = valid_row();
        row.admission_date = "2023-12-30 00:00:00".into();
        row.discharge_date = "01/04/2024".into();
        let encounter = row.validate(2).unwrap();
        assert_eq!(encounter.admission_date, NaiveDate::from_ymd_opt(2023, 12, 30).unwrap());
        assert_eq!(encounter.discharge_date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_out_of_domain_age() {
        let mut row = valid_row();
        row.age = "86".into();
        let err = row.validate(7).unwrap_err();
        assert_eq!(err.line, 7);
        assert_eq!(err.field, "Age");
        assert_eq!(
            err.reason,
            FieldError::OutOfRange {
                value: 86,
                min: 18,
                max: 85
            }
        );
    }

    #[test]
    fn test_missing_and_garbage_values() {
        let mut row = valid_row();
        row.initial_severity = "  ".into();
        assert_eq!(row.validate(2).unwrap_err().reason, FieldError::Missing);

        let mut row = valid_row();
        row.comorbidities = "two".into();
        assert_eq!(row.validate(2).unwrap_err().field, "Comorbidities");

        let mut row = valid_row();
        row.treatment_success = "maybe".into();
        assert_eq!(row.validate(2).unwrap_err().field, "TreatmentSuccess");
    }

    #[test]
    fn test_unknown_category() {
        let mut row = valid_row();
        row.region = "Northeast".into();
        let err = row.validate(3).unwrap_err();
        assert_eq!(err.field, "Region");
        assert_eq!(
            err.to_string(),
            "line 3, column Region: unknown Region value 'Northeast'"
        );
    }

    #[test]
    fn test_discharge_before_admission() {
        let mut row = valid_row();
        row.discharge_date = "2023-12-29".into();
        let err = row.validate(2).unwrap_err();
        assert!(matches!(
            err.reason,
            FieldError::DischargeBeforeAdmission { .. }
        ));
    }

    #[test]
    fn test_length_of_stay_must_match_dates() {
        let mut row = valid_row();
        row.length_of_stay = "4".into();
        let err = row.validate(2).unwrap_err();
        assert_eq!(
            err.reason,
            FieldError::LengthOfStayMismatch {
                expected: 5,
                actual: 4
            }
        );
    }
}
