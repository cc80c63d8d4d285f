//! Row shapes for the long-format tables the core exchanges with its
//! ingestion and rendering collaborators. The core never opens a file: it
//! consumes `&[Row]` and produces `Vec<SimulationOutputRow>`, leaving actual
//! CSV/JSON reading to whatever wires the engine up.

use serde::{Deserialize, Serialize};

/// One row of `technical_characteristics.csv`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TechnicalCharacteristicRow {
    #[serde(rename = "Entity")]
    pub entity: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Magnitude")]
    pub magnitude: String,
    #[serde(rename = "MagnitudeValue")]
    pub magnitude_value: f64,
    #[serde(rename = "MagnitudeUnits")]
    pub magnitude_units: String,
}

/// One row of a per-interval table (`contracted_power_data.csv`,
/// `prices.csv`, `consumption_history.csv`, `contracted_power_history.csv`,
/// or the direct-radiation slice of a parsed `meteo_*.json`).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "InitialDatetime")]
    pub initial_datetime: String,
    #[serde(rename = "FinalDatetime")]
    pub final_datetime: String,
    #[serde(rename = "Magnitude")]
    pub magnitude: String,
    #[serde(rename = "MagnitudeValue")]
    pub magnitude_value: f64,
    #[serde(rename = "MagnitudeUnits")]
    pub magnitude_units: String,
}

/// One row of `drivers.csv`: a 6-bit situation pattern and a 3-bit action
/// mask.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct DriverRow {
    pub surplus: u8,
    pub consumption_rise: u8,
    pub purchase_price_rise: u8,
    pub consumption_low: u8,
    pub generation_low: u8,
    pub purchase_price_low: u8,
    pub send_to_batteries: u8,
    pub charge_from_pods: u8,
    pub get_from_batteries: u8,
}

/// One row of the simulation output table.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SimulationOutputRow {
    #[serde(rename = "InitialDatetime")]
    pub initial_datetime: String,
    #[serde(rename = "FinalDatetime")]
    pub final_datetime: String,
    #[serde(rename = "EntityId")]
    pub entity_id: String,
    #[serde(rename = "EntityType")]
    pub entity_type: String,
    #[serde(rename = "Magnitude")]
    pub magnitude: String,
    #[serde(rename = "MagnitudeValue")]
    pub magnitude_value: f64,
    #[serde(rename = "MagnitudeUnits")]
    pub magnitude_units: String,
}
