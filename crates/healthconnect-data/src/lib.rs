//! Patient encounter records for the `HealthConnect` analytics pipeline
//!
//! This crate defines the fixed schema of the input dataset and the code
//! that moves it in and out of CSV files.
//!
//! # Modules
//!
//! - [`category`]: Closed value sets of the categorical columns
//! - [`encounter`]: The validated [`PatientEncounter`] record and its domains
//! - [`row`]: Raw CSV rows and field-level validation
//! - [`loader`]: Loading with an explicit [`ValidationPolicy`], and writing
//!
//! # Example
//!
//! ```
//! use healthconnect_data::{ValidationPolicy, read_encounters};
//!
//! let csv = "\
//! PatientID,Age,Gender,Region,Diagnosis,Treatment,AdmissionDate,DischargeDate,LengthOfStay,TreatmentSuccess,InitialSeverity,Comorbidities,InsuranceType,FollowUpVisits
//! 483920,61,F,Central,COPD,Medication,2024-02-10,2024-02-17,7,True,6,2,Public,1
//! ";
//! let dataset = read_encounters(csv.as_bytes(), ValidationPolicy::Strict).unwrap();
//! assert_eq!(dataset.encounters[0].length_of_stay, 7);
//! ```

pub use self::{
    category::{Category, Diagnosis, Gender, InsuranceType, Region, Treatment, UnknownCategory},
    encounter::PatientEncounter,
    loader::{
        LoadError, LoadedDataset, ValidationPolicy, WriteError, load_encounters, read_encounters,
        save_encounters, write_encounters,
    },
    row::{COLUMNS, EncounterRow, FieldError, ValidationError},
};

pub mod category;
pub mod encounter;
pub mod loader;
pub mod row;
