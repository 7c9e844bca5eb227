//! Model-ready feature matrices
//!
//! [`FeatureMatrixBuilder`] turns derived encounters into a numeric matrix
//! with one row per encounter and a fixed column order: the numeric fields
//! first, then the label-encoded categorical fields. The target vector holds
//! each encounter's treatment outcome.
//!
//! # Example
//!
//! ```
//! use healthconnect_analysis::{
//!     derive::derive_all,
//!     feature_matrix::{FeatureColumn, FeatureMatrixBuilder},
//! };
//! # use healthconnect_data::{ValidationPolicy, read_encounters};
//! # let csv = "\
//! # PatientID,Age,Gender,Region,Diagnosis,Treatment,AdmissionDate,DischargeDate,LengthOfStay,TreatmentSuccess,InitialSeverity,Comorbidities,InsuranceType,FollowUpVisits
//! # 483920,61,F,Central,COPD,Medication,2024-02-10,2024-02-17,7,True,6,2,Public,1
//! # ";
//! # let encounters = read_encounters(csv.as_bytes(), ValidationPolicy::Strict)?.encounters;
//! let records = derive_all(&encounters);
//! let builder = FeatureMatrixBuilder::fit(&records);
//! let matrix = builder.build(&records)?;
//! assert_eq!(matrix.columns, FeatureColumn::ALL);
//! assert_eq!(matrix.rows[0][0], 61.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::{
    derive::DerivedEncounter,
    dimension::{Dimension, Measure},
    encoding::{EncodeError, EncodingTable},
};

/// A column of the feature matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    Age,
    InitialSeverity,
    Comorbidities,
    LengthOfStay,
    Gender,
    Region,
    Treatment,
    InsuranceType,
    Diagnosis,
}

enum ColumnSource {
    Numeric(Measure),
    Encoded(Dimension),
}

impl FeatureColumn {
    /// Every column, in matrix order.
    pub const ALL: [Self; 9] = [
        Self::Age,
        Self::InitialSeverity,
        Self::Comorbidities,
        Self::LengthOfStay,
        Self::Gender,
        Self::Region,
        Self::Treatment,
        Self::InsuranceType,
        Self::Diagnosis,
    ];

    /// Label-encoded columns.
    pub const CATEGORICAL: [Dimension; 5] = [
        Dimension::Gender,
        Dimension::Region,
        Dimension::Treatment,
        Dimension::InsuranceType,
        Dimension::Diagnosis,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self.source() {
            ColumnSource::Numeric(measure) => measure.name(),
            ColumnSource::Encoded(dimension) => dimension.name(),
        }
    }

    fn source(self) -> ColumnSource {
        match self {
            Self::Age => ColumnSource::Numeric(Measure::Age),
            Self::InitialSeverity => ColumnSource::Numeric(Measure::InitialSeverity),
            Self::Comorbidities => ColumnSource::Numeric(Measure::Comorbidities),
            Self::LengthOfStay => ColumnSource::Numeric(Measure::LengthOfStay),
            Self::Gender => ColumnSource::Encoded(Dimension::Gender),
            Self::Region => ColumnSource::Encoded(Dimension::Region),
            Self::Treatment => ColumnSource::Encoded(Dimension::Treatment),
            Self::InsuranceType => ColumnSource::Encoded(Dimension::InsuranceType),
            Self::Diagnosis => ColumnSource::Encoded(Dimension::Diagnosis),
        }
    }
}

/// Numeric features aligned row-for-row with the source records
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<FeatureColumn>,
    pub rows: Vec<Vec<f64>>,
    /// Treatment outcome of each row
    pub labels: Vec<bool>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Builds feature matrices with a fixed encoding table
#[derive(Debug, Clone)]
pub struct FeatureMatrixBuilder {
    encoding: EncodingTable,
}

impl FeatureMatrixBuilder {
    /// Uses an existing (for example, previously saved) encoding table.
    #[must_use]
    pub fn new(encoding: EncodingTable) -> Self {
        Self { encoding }
    }

    /// Fits the encoding of the categorical columns on `records`.
    #[must_use]
    pub fn fit(records: &[DerivedEncounter]) -> Self {
        Self::new(EncodingTable::fit(records, &FeatureColumn::CATEGORICAL))
    }

    #[must_use]
    pub fn encoding(&self) -> &EncodingTable {
        &self.encoding
    }

    /// Builds the matrix for `records`.
    ///
    /// Fails with [`EncodeError::UnseenCategory`] when a record carries a
    /// label that the encoding table does not know.
    pub fn build(&self, records: &[DerivedEncounter]) -> Result<FeatureMatrix, EncodeError> {
        let rows = records
            .iter()
            .map(|record| {
                FeatureColumn::ALL
                    .iter()
                    .map(|column| self.feature_value(*column, record))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FeatureMatrix {
            columns: FeatureColumn::ALL.to_vec(),
            rows,
            labels: records
                .iter()
                .map(|r| r.encounter.treatment_success)
                .collect(),
        })
    }

    fn feature_value(
        &self,
        column: FeatureColumn,
        record: &DerivedEncounter,
    ) -> Result<f64, EncodeError> {
        match column.source() {
            ColumnSource::Numeric(measure) => {
                measure
                    .value(record)
                    .ok_or_else(|| EncodeError::MissingValue {
                        field: measure.name().to_owned(),
                    })
            }
            ColumnSource::Encoded(dimension) => self
                .encoding
                .encode_record(dimension, record)
                .map(f64::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use healthconnect_data::{Gender, Region};

    use super::*;
    use crate::derive::{derive_all, tests::encounter};

    #[test]
    fn test_column_order_and_values() {
        let mut a = encounter(1, 30);
        a.gender = Gender::Male;
        a.region = Region::West;
        a.treatment_success = false;
        let b = encounter(2, 70);
        let records = derive_all(&[a, b]);

        let matrix = FeatureMatrixBuilder::fit(&records).build(&records).unwrap();
        assert_eq!(
            matrix.column_names(),
            [
                "Age",
                "InitialSeverity",
                "Comorbidities",
                "LengthOfStay",
                "Gender",
                "Region",
                "Treatment",
                "InsuranceType",
                "Diagnosis"
            ]
        );
        // F < M, North < West
        assert_eq!(
            matrix.rows[0],
            [30.0, 5.0, 1.0, 2.0, 1.0, 1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(
            matrix.rows[1],
            [70.0, 5.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(matrix.labels, [false, true]);
    }

    #[test]
    fn test_saved_encoding_rejects_unseen_labels() {
        let seen = derive_all(&[encounter(1, 30)]);
        let json = serde_json::to_string(FeatureMatrixBuilder::fit(&seen).encoding()).unwrap();
        let encoding = serde_json::from_str::<EncodingTable>(&json).unwrap();
        assert_eq!(encoding.classes("Region"), Some(&["North".to_owned()][..]));
        let builder = FeatureMatrixBuilder::new(encoding);
        assert_eq!(builder.build(&seen).unwrap().rows.len(), 1);

        let mut unseen = encounter(2, 30);
        unseen.region = Region::Central;
        let err = builder.build(&derive_all(&[unseen])).unwrap_err();
        assert_eq!(
            err,
            EncodeError::UnseenCategory {
                field: "Region".to_owned(),
                value: "Central".to_owned(),
            }
        );
    }
}
