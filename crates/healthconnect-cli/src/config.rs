//! Settings passed explicitly through the analysis stages

use std::path::PathBuf;

use healthconnect_training::evaluation::EvaluationConfig;
use serde::{Deserialize, Serialize};

/// Presentation settings for the external plotting step.
///
/// Written as `plot_config.json` next to the plot tables; nothing in this
/// program renders plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Figure width and height in inches
    pub figure_size: [f64; 2],
    pub palette: String,
    pub style: String,
    pub dpi: u32,
    pub grid_alpha: f64,
    pub font_size: f64,
    /// Maximum number of table rows to display
    pub max_table_rows: usize,
    /// Bins of the age distribution histogram
    pub histogram_bins: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            figure_size: [12.0, 8.0],
            palette: "husl".to_owned(),
            style: "white".to_owned(),
            dpi: 300,
            grid_alpha: 0.3,
            font_size: 12.0,
            max_table_rows: 100,
            histogram_bins: 30,
        }
    }
}

/// Output locations and model settings of a complete analysis run
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Directory of the BI exports
    pub data_dir: PathBuf,
    /// Directory of the plot tables and the plot configuration
    pub visualizations_dir: PathBuf,
    /// Directory of the Markdown report
    pub reports_dir: PathBuf,
    /// Directory of the model summary and encoding table
    pub model_dir: PathBuf,
    pub evaluation: EvaluationConfig,
    pub plot: PlotConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_config_json_shape() {
        let json = serde_json::to_value(PlotConfig::default()).unwrap();
        assert_eq!(json["figure_size"], serde_json::json!([12.0, 8.0]));
        assert_eq!(json["dpi"], 300);
        assert_eq!(json["palette"], "husl");
        let back = serde_json::from_value::<PlotConfig>(json).unwrap();
        assert_eq!(back, PlotConfig::default());
    }
}
