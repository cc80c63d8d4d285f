//! Owns the entity collection for one simulation and provides the typed
//! lookups and filter predicates the policies need.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::{
    entities::{Battery, PhotovoltaicPlate, PointOfConsumption, PointOfGridDelivery},
    error::SimulationError,
    measurement::Measurement,
    prelude::*,
    tables::TechnicalCharacteristicRow,
    time::parse_datetime,
};

#[derive(Clone, Debug, Default)]
pub struct EntitiesManager {
    pub batteries: Vec<Battery>,
    pub photovoltaic_plates: Vec<PhotovoltaicPlate>,
    pub points_of_grid_delivery: Vec<PointOfGridDelivery>,
    pub points_of_consumption: Vec<PointOfConsumption>,
}

fn parameter<'a>(
    rows: &'a [&TechnicalCharacteristicRow],
    entity: &str,
    id: &str,
    magnitude: &str,
) -> Result<&'a TechnicalCharacteristicRow> {
    rows.iter()
        .copied()
        .find(|row| row.magnitude == magnitude)
        .ok_or_else(|| {
            SimulationError::MissingParameter {
                entity: entity.to_string(),
                id: id.to_string(),
                parameter: magnitude.to_string(),
            }
            .into()
        })
}

impl EntitiesManager {
    #[instrument(name = "Building the entities manager…", skip_all)]
    pub fn from_technical_characteristics(rows: &[TechnicalCharacteristicRow]) -> Result<Self> {
        Ok(Self {
            batteries: Self::build_batteries(rows)?,
            photovoltaic_plates: Self::build_photovoltaic_plates(rows)?,
            points_of_grid_delivery: Self::build_points_of_grid_delivery(rows)?,
            points_of_consumption: Self::build_points_of_consumption(rows),
        })
    }

    fn ids_of<'a>(rows: &'a [TechnicalCharacteristicRow], entity: &str) -> BTreeSet<&'a str> {
        rows.iter()
            .filter(|row| row.entity == entity)
            .map(|row| row.id.as_str())
            .collect()
    }

    fn rows_for<'a>(
        rows: &'a [TechnicalCharacteristicRow],
        entity: &str,
        id: &str,
    ) -> Vec<&'a TechnicalCharacteristicRow> {
        rows.iter().filter(|row| row.entity == entity && row.id == id).collect()
    }

    fn build_batteries(rows: &[TechnicalCharacteristicRow]) -> Result<Vec<Battery>> {
        Self::ids_of(rows, "battery")
            .into_iter()
            .map(|id| {
                let own_rows = Self::rows_for(rows, "battery", id);
                let nominal_energy = parameter(&own_rows, "battery", id, "nominal_energy")?;
                let max_input_power = parameter(&own_rows, "battery", id, "max_input_power")?;
                let max_output_power = parameter(&own_rows, "battery", id, "max_output_power")?;
                Ok(Battery::new(
                    id,
                    Measurement::new(nominal_energy.magnitude_value, &nominal_energy.magnitude_units),
                    Measurement::new(max_input_power.magnitude_value, &max_input_power.magnitude_units),
                    Measurement::new(max_output_power.magnitude_value, &max_output_power.magnitude_units),
                ))
            })
            .collect()
    }

    fn build_photovoltaic_plates(
        rows: &[TechnicalCharacteristicRow],
    ) -> Result<Vec<PhotovoltaicPlate>> {
        Self::ids_of(rows, "photovoltaic_plate")
            .into_iter()
            .map(|id| {
                let own_rows = Self::rows_for(rows, "photovoltaic_plate", id);
                let surface = parameter(&own_rows, "photovoltaic_plate", id, "surface")?;
                let efficiency = parameter(&own_rows, "photovoltaic_plate", id, "efficiency")?;
                let max_output_power =
                    parameter(&own_rows, "photovoltaic_plate", id, "max_output_power")?;
                Ok(PhotovoltaicPlate::new(
                    id,
                    Measurement::new(surface.magnitude_value, &surface.magnitude_units),
                    Measurement::new(efficiency.magnitude_value, &efficiency.magnitude_units),
                    Measurement::new(max_output_power.magnitude_value, &max_output_power.magnitude_units),
                ))
            })
            .collect()
    }

    fn build_points_of_grid_delivery(
        rows: &[TechnicalCharacteristicRow],
    ) -> Result<Vec<PointOfGridDelivery>> {
        Self::ids_of(rows, "point_of_grid_delivery")
            .into_iter()
            .map(|id| {
                let own_rows = Self::rows_for(rows, "point_of_grid_delivery", id);
                let max_input_power =
                    parameter(&own_rows, "point_of_grid_delivery", id, "max_input_power")?;
                Ok(PointOfGridDelivery::new(
                    id,
                    Measurement::new(max_input_power.magnitude_value, &max_input_power.magnitude_units),
                ))
            })
            .collect()
    }

    fn build_points_of_consumption(rows: &[TechnicalCharacteristicRow]) -> Vec<PointOfConsumption> {
        Self::ids_of(rows, "point_of_consumption").into_iter().map(PointOfConsumption::new).collect()
    }

    pub fn supplying_battery_indices(&self, time_lapse_hours: f64) -> Vec<usize> {
        self.batteries
            .iter()
            .enumerate()
            .filter(|(_, battery)| battery.available_power(time_lapse_hours).value > 0.0)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn demanding_battery_indices(&self) -> Vec<usize> {
        self.batteries
            .iter()
            .enumerate()
            .filter(|(_, battery)| battery.energy.value < battery.nominal_energy.value)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn supplying_pod_indices(&self, initial_datetime: NaiveDateTime) -> Result<Vec<usize>> {
        self.points_of_grid_delivery
            .iter()
            .enumerate()
            .map(|(index, pod)| Ok((index, pod.available_power(initial_datetime)?.value > 0.0)))
            .collect::<Result<Vec<_>>>()
            .map(|flags| flags.into_iter().filter(|(_, supplying)| *supplying).map(|(index, _)| index).collect())
    }
}

/// Builds a time series keyed by `initial_datetime` out of rows filtered to
/// a single `Magnitude`.
pub fn series_for_magnitude(
    rows: &[crate::tables::TimeSeriesRow],
    magnitude: &str,
) -> Result<BTreeMap<NaiveDateTime, f64>> {
    rows.iter()
        .filter(|row| row.magnitude == magnitude)
        .map(|row| Ok((parse_datetime(&row.initial_datetime)?, row.magnitude_value)))
        .collect()
}
