//! Derived fields of an encounter
//!
//! [`derive_all`] augments validated encounters with the fields that the
//! aggregate views and the insights need: the age group, the composite risk
//! score and the calendar month and year of admission.
//!
//! # Age groups
//!
//! Ages are binned over the edges `[0, 20, 30, 40, 50, 60, 70, 80, 90]` with
//! right-closed intervals: an age equal to an edge belongs to the lower bin,
//! so 20 is `"0-20"`, 30 is `"21-30"` and 80 is `"71-80"`. Ages outside
//! `(0, 90]` have no group.
//!
//! # Risk score
//!
//! ```text
//! risk = 0.4 * severity + 0.3 * comorbidities + min(age / 85 * 0.3, 0.3)
//! ```
//!
//! For validated encounters the score lies in `[0.4 + 18 * 0.3 / 85, 5.2]`.

use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::Datelike as _;
use healthconnect_data::{Category, PatientEncounter, UnknownCategory};
use healthconnect_stats::binning::FixedBins;

/// Bin edges of [`AgeGroup`], in years.
pub const AGE_GROUP_EDGES: [f64; 9] = [0.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];

static AGE_BINS: LazyLock<FixedBins<AgeGroup>> = LazyLock::new(|| {
    FixedBins::new(&AGE_GROUP_EDGES, AgeGroup::ALL).expect("age group edges are valid")
});

/// Age band of a patient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    UpTo20,
    From21To30,
    From31To40,
    From41To50,
    From51To60,
    From61To70,
    From71To80,
    Over80,
}

impl AgeGroup {
    /// Returns the band containing `age`, if any.
    ///
    /// ```
    /// use healthconnect_analysis::derive::AgeGroup;
    ///
    /// assert_eq!(AgeGroup::of_age(20), Some(AgeGroup::UpTo20));
    /// assert_eq!(AgeGroup::of_age(21), Some(AgeGroup::From21To30));
    /// assert_eq!(AgeGroup::of_age(95), None);
    /// ```
    #[must_use]
    pub fn of_age(age: u8) -> Option<Self> {
        AGE_BINS.label_of(f64::from(age))
    }
}

impl Category for AgeGroup {
    const FIELD: &'static str = "AgeGroup";
    const ALL: &'static [Self] = &[
        Self::UpTo20,
        Self::From21To30,
        Self::From31To40,
        Self::From41To50,
        Self::From51To60,
        Self::From61To70,
        Self::From71To80,
        Self::Over80,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::UpTo20 => "0-20",
            Self::From21To30 => "21-30",
            Self::From31To40 => "31-40",
            Self::From41To50 => "41-50",
            Self::From51To60 => "51-60",
            Self::From61To70 => "61-70",
            Self::From71To80 => "71-80",
            Self::Over80 => "81+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for AgeGroup {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Composite risk score of an encounter.
///
/// Non-decreasing in each argument.
///
/// ```
/// use healthconnect_analysis::derive::risk_score;
///
/// assert!((risk_score(10, 3, 85) - 5.2).abs() < 1e-12);
/// assert!((risk_score(5, 0, 100) - 2.3).abs() < 1e-12);
/// ```
#[must_use]
pub fn risk_score(initial_severity: u8, comorbidities: u8, age: u8) -> f64 {
    let age_term = (f64::from(age) / 85.0 * 0.3).min(0.3);
    f64::from(initial_severity) * 0.4 + f64::from(comorbidities) * 0.3 + age_term
}

/// An encounter together with its derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedEncounter {
    pub encounter: PatientEncounter,
    pub age_group: Option<AgeGroup>,
    pub risk_score: f64,
    /// Month of the admission date (1-12)
    pub admission_month: u32,
    pub admission_year: i32,
}

impl DerivedEncounter {
    #[must_use]
    pub fn new(encounter: PatientEncounter) -> Self {
        let age_group = AgeGroup::of_age(encounter.age);
        let risk_score = risk_score(
            encounter.initial_severity,
            encounter.comorbidities,
            encounter.age,
        );
        let admission_month = encounter.admission_date.month();
        let admission_year = encounter.admission_date.year();
        Self {
            encounter,
            age_group,
            risk_score,
            admission_month,
            admission_year,
        }
    }
}

/// Derives the fields of every encounter, preserving order.
#[must_use]
pub fn derive_all(encounters: &[PatientEncounter]) -> Vec<DerivedEncounter> {
    encounters
        .iter()
        .cloned()
        .map(DerivedEncounter::new)
        .collect()
}
