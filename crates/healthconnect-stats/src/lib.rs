//! Statistical analysis utilities for the `HealthConnect` analytics pipeline.
//!
//! This crate provides a collection of statistical tools including:
//!
//! - **Descriptive statistics**: mean, median, sample variance and standard deviation
//! - **Percentiles**: linear-interpolated percentile values
//! - **Binning**: labelled right-closed bins over fixed edges, equal-width histograms
//! - **Frequency tables**: value counts ordered by frequency, with a well-defined mode
//! - **Correlation**: Pearson correlation of paired samples
//!
//! Undefined results (empty inputs, a single observation for a sample
//! variance, zero-variance correlation) are reported as `None` rather than
//! as a default number.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`binning`]: Fixed-edge binning
//! - [`histogram`]: Equal-width histograms
//! - [`frequency`]: Value counts and modes
//! - [`correlation`]: Pearson correlation
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use healthconnect_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use healthconnect_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(50.0), Some(3.0));
//! ```
//!
//! ## Binning values
//!
//! ```
//! use healthconnect_stats::binning::FixedBins;
//!
//! let bins = FixedBins::new(&[0.0, 50.0, 100.0], &["lower", "upper"]).unwrap();
//! assert_eq!(bins.label_of(50.0), Some("lower"));
//! ```

pub mod binning;
pub mod correlation;
pub mod descriptive;
pub mod frequency;
pub mod histogram;
pub mod percentiles;
