//! Synthetic patient encounter data
//!
//! Each patient gets one to three distinct diagnoses and one encounter per
//! diagnosis. Treatment success is drawn from a probability that falls with
//! age and rises for surgery and combined therapy.

use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeDelta};
use healthconnect_data::{
    Category, Diagnosis, Gender, InsuranceType, PatientEncounter, Region, Treatment,
    encounter::{AGE_RANGE, COMORBIDITIES_RANGE, FOLLOW_UP_VISITS_RANGE, SEVERITY_RANGE},
};
use rand::{Rng, seq::SliceRandom as _};

/// Range of the random six-digit patient ids
const PATIENT_ID_RANGE: std::ops::RangeInclusive<u64> = 100_000..=999_999;
/// Admissions fall within this many days before the reference date
const ADMISSION_WINDOW_DAYS: i64 = 730;
const MAX_LENGTH_OF_STAY: u32 = 30;
const MAX_DIAGNOSES_PER_PATIENT: usize = 3;

/// Largest number of patients that can get distinct ids.
pub const MAX_PATIENTS: usize = 900_000;

fn pick<C, R>(rng: &mut R) -> C
where
    C: Category,
    R: Rng + ?Sized,
{
    C::ALL[rng.random_range(0..C::ALL.len())]
}

/// Probability that a treatment succeeds.
///
/// `base` is the patient-independent draw in `[0.5, 0.9)`.
#[must_use]
pub fn success_probability(base: f64, age: u8, treatment: Treatment) -> f64 {
    let (min_age, max_age) = (*AGE_RANGE.start(), *AGE_RANGE.end());
    let age_factor = 1.0 - f64::from(age - min_age) / f64::from(max_age - min_age) * 0.2;
    let treatment_factor = match treatment {
        Treatment::CombinedTherapy | Treatment::Surgery => 1.1,
        _ => 1.0,
    };
    (base * age_factor * treatment_factor).min(1.0)
}

/// Generates the encounters of `num_patients` patients admitted within two
/// years before `reference_date`.
///
/// `num_patients` must not exceed [`MAX_PATIENTS`].
pub fn generate_encounters<R>(
    num_patients: usize,
    reference_date: NaiveDate,
    rng: &mut R,
) -> Vec<PatientEncounter>
where
    R: Rng + ?Sized,
{
    assert!(num_patients <= MAX_PATIENTS);
    let mut used_ids = BTreeSet::new();
    let mut encounters = Vec::new();

    for _ in 0..num_patients {
        let patient_id = loop {
            let id = rng.random_range(PATIENT_ID_RANGE);
            if used_ids.insert(id) {
                break id;
            }
        };
        let age = rng.random_range(AGE_RANGE);
        let gender = pick::<Gender, _>(rng);
        let region = pick::<Region, _>(rng);

        let mut diagnoses = Diagnosis::ALL.to_vec();
        diagnoses.shuffle(rng);
        diagnoses.truncate(rng.random_range(1..=MAX_DIAGNOSES_PER_PATIENT));

        for diagnosis in diagnoses {
            let treatment = pick::<Treatment, _>(rng);
            let probability = success_probability(rng.random_range(0.5..0.9), age, treatment);
            let admission_date =
                reference_date - TimeDelta::days(rng.random_range(0..=ADMISSION_WINDOW_DAYS));
            let length_of_stay = rng.random_range(1..=MAX_LENGTH_OF_STAY);
            encounters.push(PatientEncounter {
                patient_id,
                age,
                gender,
                region,
                diagnosis,
                treatment,
                admission_date,
                discharge_date: admission_date + TimeDelta::days(i64::from(length_of_stay)),
                length_of_stay,
                treatment_success: rng.random::<f64>() < probability,
                initial_severity: rng.random_range(SEVERITY_RANGE),
                comorbidities: rng.random_range(COMORBIDITIES_RANGE),
                insurance_type: pick::<InsuranceType, _>(rng),
                follow_up_visits: rng.random_range(FOLLOW_UP_VISITS_RANGE),
            });
        }
    }
    encounters
}
