use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Tunables for loading, default filtering and dashboard assembly.
///
/// Every field has a default, so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardConfig {
    /// Rows shown in the data preview slot.
    pub preview_rows: usize,
    /// Dimensions with more distinct values than this start pre-filtered.
    pub default_selection_limit: usize,
    /// Length of every top/bottom ranking.
    pub top_n: usize,
    pub rolling_window_days: u32,
    pub histogram_bins: usize,
    pub abc: AbcThresholds,
    /// Field delimiter for CSV input.
    pub csv_delimiter: char,
    pub columns: ColumnNames,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            preview_rows: 100,
            default_selection_limit: 5,
            top_n: 10,
            rolling_window_days: 7,
            histogram_bins: 30,
            abc: AbcThresholds::default(),
            csv_delimiter: ',',
            columns: ColumnNames::default(),
        }
    }
}

/// Cumulative-share cut-offs separating ABC classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbcThresholds {
    pub a: f64,
    pub b: f64,
}

impl Default for AbcThresholds {
    fn default() -> Self {
        AbcThresholds { a: 0.80, b: 0.95 }
    }
}

/// Header labels (after trimming) recognised for each known column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnNames {
    pub store: String,
    pub category: String,
    pub product: String,
    pub demand_forecast: String,
    pub stock: String,
    pub sales: String,
    pub stockout: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            store: "Store".into(),
            category: "Category".into(),
            product: "Product".into(),
            demand_forecast: "Demand Forecast".into(),
            stock: "Stock".into(),
            sales: "Sales".into(),
            stockout: "Stockout".into(),
        }
    }
}

impl DashboardConfig {
    /// Reads a JSON config file. Keys absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, AppError> {
        let config: DashboardConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if !self.csv_delimiter.is_ascii() {
            return Err(AppError::Custom(format!(
                "csvDelimiter must be a single ASCII character, got {:?}",
                self.csv_delimiter
            )));
        }
        if !(0.0..=1.0).contains(&self.abc.a) || !(self.abc.a..=1.0).contains(&self.abc.b) {
            return Err(AppError::Custom(format!(
                "ABC thresholds must satisfy 0 <= a <= b <= 1, got a={} b={}",
                self.abc.a, self.abc.b
            )));
        }
        Ok(())
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        if self.csv_delimiter.is_ascii() {
            self.csv_delimiter as u8
        } else {
            b','
        }
    }
}
