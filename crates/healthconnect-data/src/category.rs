//! Categorical fields of a patient encounter
//!
//! Every categorical column has a closed set of values. Each one is a unit
//! enum implementing [`Category`], which exposes the full value set and the
//! label used in CSV files and reports.
//!
//! Labels are parsed exactly (after trimming surrounding whitespace); an
//! unknown label is an [`UnknownCategory`] error naming the column.

use std::{fmt, hash::Hash, str::FromStr};

/// A label that does not belong to a categorical column
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown {field} value '{value}'")]
pub struct UnknownCategory {
    /// Column name
    pub field: &'static str,
    /// The rejected label
    pub value: String,
}

/// A categorical column with a fixed value set
pub trait Category:
    Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + FromStr<Err = UnknownCategory> + 'static
{
    /// Column name in the input file.
    const FIELD: &'static str;
    /// Every value of the column, in declaration order.
    const ALL: &'static [Self];

    /// Label as written in the input file.
    fn label(self) -> &'static str;

    /// Looks up the value whose label is `label`.
    fn from_label(label: &str) -> Result<Self, UnknownCategory> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label() == label)
            .ok_or_else(|| UnknownCategory {
                field: Self::FIELD,
                value: label.to_owned(),
            })
    }
}

macro_rules! category_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl Category for $name {
            const FIELD: &'static str = $field;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.label())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCategory;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let label = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_label(&label).map_err(serde::de::Error::custom)
            }
        }
    };
}

category_enum! {
    /// Patient gender
    Gender, "Gender" {
        Male => "M",
        Female => "F",
    }
}

category_enum! {
    /// Geographic region of the treating facility
    Region, "Region" {
        North => "North",
        South => "South",
        East => "East",
        West => "West",
        Central => "Central",
    }
}

category_enum! {
    /// Primary diagnosis of the encounter
    Diagnosis, "Diagnosis" {
        Hypertension => "Hypertension",
        Type2Diabetes => "Type 2 Diabetes",
        Asthma => "Asthma",
        Arthritis => "Arthritis",
        Depression => "Depression",
        Anxiety => "Anxiety",
        Obesity => "Obesity",
        Copd => "COPD",
        HeartDisease => "Heart Disease",
        LowerBackPain => "Lower Back Pain",
    }
}

category_enum! {
    /// Treatment given for the diagnosis
    Treatment, "Treatment" {
        Medication => "Medication",
        PhysicalTherapy => "Physical Therapy",
        Surgery => "Surgery",
        LifestyleChanges => "Lifestyle Changes",
        Counseling => "Counseling",
        CombinedTherapy => "Combined Therapy",
    }
}

category_enum! {
    /// Insurance coverage of the patient
    InsuranceType, "InsuranceType" {
        Private => "Private",
        Public => "Public",
        /// No coverage (written as `None` in the input file)
        Uninsured => "None",
    }
}
