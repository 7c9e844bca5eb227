//! Feature derivation and aggregation for `HealthConnect` encounter data
//!
//! This crate turns validated [`PatientEncounter`](healthconnect_data::PatientEncounter)
//! records into the two kinds of output the pipeline produces: aggregate
//! tables for reporting and numeric feature matrices for model training.
//!
//! # Overview
//!
//! ```text
//! encounters ─▶ derive ─┬─▶ aggregate ─▶ views / summary / insights
//!                       └─▶ feature_matrix (+ encoding) ─▶ classifier
//! ```
//!
//! 1. **Derive** ([`derive::derive_all`]): age group, risk score, admission
//!    month and year
//! 2. **Aggregate** ([`aggregate::group_by`], [`aggregate::CrossTab`],
//!    [`aggregate::PivotTable`]): grouped statistics over
//!    [`dimension::Dimension`]s and [`dimension::Measure`]s
//! 3. **Views** ([`views::DashboardView`], [`views::AnalysisExport`]): the
//!    fixed tables written as CSV files
//! 4. **Summaries** ([`summary::DatasetSummary`], [`insights::Insights`]):
//!    headline numbers for the Markdown reports
//! 5. **Feature matrix** ([`feature_matrix::FeatureMatrixBuilder`]): numeric
//!    features with label-encoded categories ([`encoding::EncodingTable`])
//!
//! # Example
//!
//! ```
//! use healthconnect_analysis::{derive::derive_all, views::DashboardView};
//! # use healthconnect_data::{ValidationPolicy, read_encounters};
//! # let csv = "\
//! # PatientID,Age,Gender,Region,Diagnosis,Treatment,AdmissionDate,DischargeDate,LengthOfStay,TreatmentSuccess,InitialSeverity,Comorbidities,InsuranceType,FollowUpVisits
//! # 483920,61,F,Central,COPD,Medication,2024-02-10,2024-02-17,7,True,6,2,Public,1
//! # 483921,35,M,Central,COPD,Surgery,2024-02-11,2024-02-12,1,False,3,0,Private,0
//! # ";
//! # let encounters = read_encounters(csv.as_bytes(), ValidationPolicy::Strict)?.encounters;
//! let records = derive_all(&encounters);
//! let outcomes = DashboardView::TreatmentOutcomes.build(&records);
//! assert_eq!(outcomes.rows.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod derive;
pub mod dimension;
pub mod encoding;
pub mod feature_matrix;
pub mod insights;
pub mod summary;
pub mod views;
