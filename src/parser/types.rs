use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Categorical or temporal axis a view can be grouped or filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Store,
    Category,
    Product,
    Date,
}

impl Dimension {
    /// Dimensions driven by multi-value selections.
    pub const CATEGORICAL: [Dimension; 3] =
        [Dimension::Store, Dimension::Category, Dimension::Product];
}

/// Numeric column that can be summed or averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Measure {
    DemandForecast,
    Stock,
    Sales,
    Stockout,
}

/// What a source column is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum ColumnRole {
    Dimension(Dimension),
    Measure(Measure),
    /// Position in `Record::extra`.
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub role: ColumnRole,
}

/// Which optional columns the dataset carries. Computed once at load time and
/// consulted instead of probing column names during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub store: bool,
    pub category: bool,
    pub product: bool,
    pub date: bool,
    pub stock: bool,
    pub sales: bool,
    pub stockout: bool,
}

impl Capabilities {
    pub fn from_schema(schema: &[Column]) -> Self {
        let mut caps = Capabilities::default();
        for column in schema {
            match column.role {
                ColumnRole::Dimension(dim) => caps.set_dimension(dim),
                ColumnRole::Measure(Measure::Stock) => caps.stock = true,
                ColumnRole::Measure(Measure::Sales) => caps.sales = true,
                ColumnRole::Measure(Measure::Stockout) => caps.stockout = true,
                ColumnRole::Measure(Measure::DemandForecast) | ColumnRole::Extra(_) => {}
            }
        }
        caps
    }

    fn set_dimension(&mut self, dim: Dimension) {
        match dim {
            Dimension::Store => self.store = true,
            Dimension::Category => self.category = true,
            Dimension::Product => self.product = true,
            Dimension::Date => self.date = true,
        }
    }

    pub fn has_dimension(&self, dim: Dimension) -> bool {
        match dim {
            Dimension::Store => self.store,
            Dimension::Category => self.category,
            Dimension::Product => self.product,
            Dimension::Date => self.date,
        }
    }

    /// Demand forecast is a required column, so it is always available.
    pub fn has_measure(&self, measure: Measure) -> bool {
        match measure {
            Measure::DemandForecast => true,
            Measure::Stock => self.stock,
            Measure::Sales => self.sales,
            Measure::Stockout => self.stockout,
        }
    }
}

/// Grouping key produced from a record's dimension value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Text(String),
    Date(NaiveDateTime),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Text(s) => f.write_str(s),
            GroupKey::Date(dt) => f.write_str(&crate::parser::deserializers::format_datetime(dt)),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

/// One row of the inventory dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub store: Option<String>,
    pub category: Option<String>,
    pub product: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub demand_forecast: Option<f64>,
    pub stock: Option<f64>,
    pub sales: Option<f64>,
    pub stockout: Option<f64>,
    /// Raw text of unrecognised columns, in header order.
    pub extra: Vec<String>,
}

impl Record {
    pub fn text(&self, dim: Dimension) -> Option<&str> {
        match dim {
            Dimension::Store => self.store.as_deref(),
            Dimension::Category => self.category.as_deref(),
            Dimension::Product => self.product.as_deref(),
            Dimension::Date => None,
        }
    }

    pub fn key(&self, dim: Dimension) -> Option<GroupKey> {
        match dim {
            Dimension::Date => self.date.map(GroupKey::Date),
            _ => self.text(dim).map(|s| GroupKey::Text(s.to_string())),
        }
    }

    pub fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::DemandForecast => self.demand_forecast,
            Measure::Stock => self.stock,
            Measure::Sales => self.sales,
            Measure::Stockout => self.stockout,
        }
    }
}

/// Immutable table loaded from the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Vec<Column>,
    capabilities: Capabilities,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(schema: Vec<Column>, records: Vec<Record>) -> Self {
        let capabilities = Capabilities::from_schema(&schema);
        Dataset {
            schema,
            capabilities,
            records,
        }
    }

    pub fn schema(&self) -> &[Column] {
        &self.schema
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|c| c.name.as_str())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Header of the detected date column, if any.
    pub fn date_column(&self) -> Option<&str> {
        self.schema
            .iter()
            .find(|c| c.role == ColumnRole::Dimension(Dimension::Date))
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

/// Result of loading a source file: the dataset plus import metadata.
#[derive(Debug)]
pub struct LoadOutput {
    pub dataset: Dataset,
    pub warnings: Vec<ParseWarning>,
    pub total_rows_processed: usize,
    pub detected_columns: Vec<String>,
    pub missing_optional_columns: Vec<String>,
    pub parse_duration_ms: u64,
}
