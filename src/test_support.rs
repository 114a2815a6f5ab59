//! Dataset fixtures shared by unit tests.

use chrono::{Duration, NaiveDate};

use crate::parser::types::{Column, ColumnRole, Dataset, Dimension, Measure, Record};

pub fn column(name: &str, role: ColumnRole) -> Column {
    Column {
        name: name.to_string(),
        role,
    }
}

/// Date, Store, Category, Product and all four measures.
pub fn full_schema() -> Vec<Column> {
    vec![
        column("Date", ColumnRole::Dimension(Dimension::Date)),
        column("Store", ColumnRole::Dimension(Dimension::Store)),
        column("Category", ColumnRole::Dimension(Dimension::Category)),
        column("Product", ColumnRole::Dimension(Dimension::Product)),
        column("Demand Forecast", ColumnRole::Measure(Measure::DemandForecast)),
        column("Stock", ColumnRole::Measure(Measure::Stock)),
        column("Sales", ColumnRole::Measure(Measure::Sales)),
        column("Stockout", ColumnRole::Measure(Measure::Stockout)),
    ]
}

/// `stores × products × days` rows, each with demand 10, stock 5, sales 8 and
/// no stockout. Products with an odd number are "Toys", the rest "Food".
/// Days start on 2024-01-01.
pub fn grid_dataset(stores: usize, products: usize, days: usize) -> Dataset {
    let first_day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut records = Vec::new();
    for s in 1..=stores {
        for p in 1..=products {
            for d in 0..days {
                let date = first_day + Duration::days(d as i64);
                records.push(Record {
                    store: Some(format!("S{s}")),
                    category: Some(if p % 2 == 1 { "Toys" } else { "Food" }.to_string()),
                    product: Some(format!("P{p}")),
                    date: date.and_hms_opt(0, 0, 0),
                    demand_forecast: Some(10.0),
                    stock: Some(5.0),
                    sales: Some(8.0),
                    stockout: Some(0.0),
                    extra: vec![],
                });
            }
        }
    }
    Dataset::new(full_schema(), records)
}

pub fn record(store: Option<&str>, product: Option<&str>, demand: f64) -> Record {
    Record {
        store: store.map(str::to_string),
        product: product.map(str::to_string),
        demand_forecast: Some(demand),
        ..Default::default()
    }
}

/// Dataset over the full schema built from explicit records.
pub fn dataset_of(records: Vec<Record>) -> Dataset {
    Dataset::new(full_schema(), records)
}
