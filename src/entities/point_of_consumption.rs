use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{error::SimulationError, measurement::Measurement, prelude::*};

/// A load point. Consumption is per-interval energy (kWh), not power.
#[derive(Clone, Debug, Default)]
pub struct PointOfConsumption {
    pub id: String,
    consumption: BTreeMap<NaiveDateTime, f64>,
}

impl PointOfConsumption {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), consumption: BTreeMap::new() }
    }

    pub fn update_consumption(&mut self, series: BTreeMap<NaiveDateTime, f64>) {
        self.consumption = series;
    }

    pub fn get_consumption(&self, initial_datetime: NaiveDateTime) -> Result<Measurement> {
        self.consumption
            .get(&initial_datetime)
            .map(|&value| Measurement::new(value, "kWh"))
            .ok_or_else(|| {
                SimulationError::MisalignedInput {
                    entity: self.id.clone(),
                    timestamp: crate::time::format_datetime(initial_datetime),
                }
                .into()
            })
    }

    pub fn all_consumption(&self) -> &BTreeMap<NaiveDateTime, f64> {
        &self.consumption
    }
}
