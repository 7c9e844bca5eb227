//! Label encoding of categorical fields
//!
//! An [`EncodingTable`] maps each label of a categorical field to its index
//! among the sorted distinct labels seen when the table was fitted. Codes
//! therefore depend on the dataset the table was fitted on; the table is
//! serialized next to any model trained with it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{derive::DerivedEncounter, dimension::Dimension};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EncodeError {
    #[display("field '{field}' has no encoding")]
    UnknownField { field: String },
    #[display("value '{value}' of field '{field}' was not seen when the encoding was fitted")]
    UnseenCategory { field: String, value: String },
    #[display("record has no value for field '{field}'")]
    MissingValue { field: String },
}

/// Sorted distinct labels per field; a label's code is its index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodingTable {
    classes: BTreeMap<String, Vec<String>>,
}

impl EncodingTable {
    /// Fits one encoding per dimension from the labels present in `records`.
    #[must_use]
    pub fn fit(records: &[DerivedEncounter], dimensions: &[Dimension]) -> Self {
        let classes = dimensions
            .iter()
            .map(|dimension| {
                let mut labels = records
                    .iter()
                    .filter_map(|r| dimension.key(r))
                    .map(|key| key.to_string())
                    .collect::<Vec<_>>();
                labels.sort_unstable();
                labels.dedup();
                (dimension.name().to_owned(), labels)
            })
            .collect();
        Self { classes }
    }

    /// Sorted labels of `field`.
    #[must_use]
    pub fn classes(&self, field: &str) -> Option<&[String]> {
        self.classes.get(field).map(Vec::as_slice)
    }

    /// Code of `label` within `field`.
    pub fn encode(&self, field: &str, label: &str) -> Result<u32, EncodeError> {
        let classes = self
            .classes
            .get(field)
            .ok_or_else(|| EncodeError::UnknownField {
                field: field.to_owned(),
            })?;
        let index = classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .map_err(|_| EncodeError::UnseenCategory {
                field: field.to_owned(),
                value: label.to_owned(),
            })?;
        Ok(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Code of `record`'s value along `dimension`.
    pub fn encode_record(
        &self,
        dimension: Dimension,
        record: &DerivedEncounter,
    ) -> Result<u32, EncodeError> {
        let key = dimension
            .key(record)
            .ok_or_else(|| EncodeError::MissingValue {
                field: dimension.name().to_owned(),
            })?;
        self.encode(dimension.name(), &key.to_string())
    }

    /// Label of `code` within `field`.
    #[must_use]
    pub fn decode(&self, field: &str, code: u32) -> Option<&str> {
        let classes = self.classes.get(field)?;
        classes.get(usize::try_from(code).ok()?).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use healthconnect_data::{InsuranceType, Treatment};

    use super::*;
    use crate::derive::{derive_all, tests::encounter};

    fn fitted() -> (EncodingTable, Vec<DerivedEncounter>) {
        let mut a = encounter(1, 30);
        a.treatment = Treatment::Surgery;
        a.insurance_type = InsuranceType::Uninsured;
        let mut b = encounter(2, 40);
        b.treatment = Treatment::Counseling;
        let records = derive_all(&[a, b]);
        let table = EncodingTable::fit(
            &records,
            &[Dimension::Treatment, Dimension::InsuranceType],
        );
        (table, records)
    }

    #[test]
    fn test_codes_follow_sorted_labels() {
        let (table, records) = fitted();
        assert_eq!(
            table.classes("Treatment").unwrap(),
            ["Counseling", "Surgery"]
        );
        assert_eq!(table.encode("Treatment", "Surgery"), Ok(1));
        assert_eq!(
            table.encode_record(Dimension::InsuranceType, &records[0]),
            Ok(0)
        );
        assert_eq!(table.decode("InsuranceType", 1), Some("Private"));
        assert_eq!(table.decode("InsuranceType", 2), None);
    }

    #[test]
    fn test_unseen_category_is_an_error() {
        let (table, _) = fitted();
        assert_eq!(
            table.encode("Treatment", "Medication"),
            Err(EncodeError::UnseenCategory {
                field: "Treatment".to_owned(),
                value: "Medication".to_owned(),
            })
        );
        assert!(matches!(
            table.encode("Region", "North"),
            Err(EncodeError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_serialized_as_field_map() {
        let (table, _) = fitted();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(
            json,
            r#"{"InsuranceType":["None","Private"],"Treatment":["Counseling","Surgery"]}"#
        );
        let parsed: EncodingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
