//! Behind-the-meter dispatch simulator: given a portfolio of batteries,
//! photovoltaic plates, grid-delivery points, and consumption points, plays
//! a dispatch policy forward over a discrete time horizon and reports the
//! resulting flows and cost.
//!
//! Ingestion/parsing of tabular inputs, the consumption predictor, result
//! rendering, and the CLI driver are out of scope: this crate consumes
//! `&[Row]` and produces `Vec<SimulationOutputRow>`.

pub mod config;
pub mod cost;
pub mod entities;
pub mod error;
pub mod manager;
pub mod measurement;
pub mod policy;
pub mod prelude;
pub mod search;
pub mod tables;
pub mod time;

use chrono::NaiveDateTime;

use crate::{
    manager::EntitiesManager,
    prelude::instrument,
    tables::SimulationOutputRow,
    time::{format_datetime, step},
};

/// Builds the long-format output table: per interval, a `power` row for
/// every battery/PV/POD and a `state_of_charge` row for every battery, and
/// an `energy` row for every POC.
#[instrument(name = "Building the output table…", skip_all)]
pub fn build_output_rows(
    manager: &EntitiesManager,
    initial: NaiveDateTime,
    final_: NaiveDateTime,
    time_lapse_hours: f64,
) -> Vec<SimulationOutputRow> {
    let mut rows = Vec::new();
    for t0 in crate::time::grid(initial, final_, time_lapse_hours) {
        let t1 = t0 + step(time_lapse_hours);
        for battery in &manager.batteries {
            if let Some(&power) = battery.flowed_power.get(&t0) {
                rows.push(row(t0, t1, &battery.id, "Battery", "power", power, "kW"));
            }
            if let Some(soc) = battery.state_of_charge_percent(t0) {
                rows.push(row(t0, t1, &battery.id, "Battery", "state_of_charge", soc, "%"));
            }
        }
        for pv in &manager.photovoltaic_plates {
            if let Ok(power) = pv.get_generation(t0) {
                rows.push(row(t0, t1, &pv.id, "PhotovoltaicPlate", "power", power.value, "kW"));
            }
        }
        for pod in &manager.points_of_grid_delivery {
            if let Some(&power) = pod.flowed_power.get(&t0) {
                rows.push(row(t0, t1, &pod.id, "PointOfGridDelivery", "power", power, "kW"));
            }
        }
        for poc in &manager.points_of_consumption {
            if let Ok(energy) = poc.get_consumption(t0) {
                rows.push(row(t0, t1, &poc.id, "PointOfConsumption", "energy", energy.value, "kWh"));
            }
        }
    }
    rows
}

fn row(
    t0: NaiveDateTime,
    t1: NaiveDateTime,
    entity_id: &str,
    entity_type: &str,
    magnitude: &str,
    value: f64,
    units: &str,
) -> SimulationOutputRow {
    SimulationOutputRow {
        initial_datetime: format_datetime(t0),
        final_datetime: format_datetime(t1),
        entity_id: entity_id.to_string(),
        entity_type: entity_type.to_string(),
        magnitude: magnitude.to_string(),
        magnitude_value: value,
        magnitude_units: units.to_string(),
    }
}
