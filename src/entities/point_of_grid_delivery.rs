use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{error::SimulationError, measurement::Measurement, prelude::*};

/// A grid-connection point. Positive `flowed_power` is import from the grid;
/// negative is export to the grid.
#[derive(Clone, Debug)]
pub struct PointOfGridDelivery {
    pub id: String,
    pub max_input_power: Measurement,
    pub max_output_power: BTreeMap<NaiveDateTime, f64>,
    pub purchase_prices: BTreeMap<NaiveDateTime, f64>,
    pub sale_price: f64,
    pub flowed_power: BTreeMap<NaiveDateTime, f64>,
}

impl PointOfGridDelivery {
    pub fn new(id: impl Into<String>, max_input_power: Measurement) -> Self {
        Self {
            id: id.into(),
            max_input_power,
            max_output_power: BTreeMap::new(),
            purchase_prices: BTreeMap::new(),
            sale_price: 0.0,
            flowed_power: BTreeMap::new(),
        }
    }

    pub fn update_max_output_power(&mut self, series: BTreeMap<NaiveDateTime, f64>) {
        self.max_output_power = series;
    }

    pub fn update_purchase_prices(&mut self, series: BTreeMap<NaiveDateTime, f64>) {
        self.purchase_prices = series;
    }

    pub fn update_sale_price(&mut self, sale_price: f64) {
        self.sale_price = sale_price;
    }

    pub fn get_purchase_price(&self, initial_datetime: NaiveDateTime) -> Result<Measurement> {
        self.purchase_prices
            .get(&initial_datetime)
            .map(|&value| Measurement::new(value, "€/kWh"))
            .ok_or_else(|| {
                SimulationError::MisalignedInput {
                    entity: self.id.clone(),
                    timestamp: crate::time::format_datetime(initial_datetime),
                }
                .into()
            })
    }

    /// Remaining import headroom for `t`: `max_output_power[t] -
    /// flowed_power[t]` (missing flow counts as 0).
    pub fn available_power(&self, initial_datetime: NaiveDateTime) -> Result<Measurement> {
        let ceiling = self.max_output_power.get(&initial_datetime).copied().ok_or_else(|| {
            SimulationError::MisalignedInput {
                entity: self.id.clone(),
                timestamp: crate::time::format_datetime(initial_datetime),
            }
        })?;
        let flowed = self.flowed_power.get(&initial_datetime).copied().unwrap_or(0.0);
        Ok(Measurement::new(ceiling - flowed, "kW"))
    }

    pub fn supply_power(
        &mut self,
        initial_datetime: NaiveDateTime,
        requested: &Measurement,
    ) -> Result<Measurement> {
        let available = self.available_power(initial_datetime)?;
        let supplied = available.value.min(requested.value);
        self.update_flowed_power(initial_datetime, supplied);
        Ok(Measurement::new(supplied, "kW"))
    }

    /// Does not subtract prior in-interval export from `max_input_power` —
    /// a POD can be over-ledgered across multiple calls within one
    /// interval. Preserved verbatim.
    pub fn receive_power(
        &mut self,
        initial_datetime: NaiveDateTime,
        requested: &Measurement,
    ) -> Measurement {
        let received = self.max_input_power.value.min(requested.value);
        self.update_flowed_power(initial_datetime, -received);
        Measurement::new(received, "kW")
    }

    pub fn update_flowed_power(&mut self, initial_datetime: NaiveDateTime, signed_power: f64) {
        *self.flowed_power.entry(initial_datetime).or_insert(0.0) += signed_power;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_datetime;

    #[test]
    fn test_receive_power_ignores_prior_export() {
        let mut pod = PointOfGridDelivery::new("pod1", Measurement::new(5.0, "kW"));
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        pod.receive_power(t0, &Measurement::new(5.0, "kW"));
        let second = pod.receive_power(t0, &Measurement::new(5.0, "kW"));
        assert_eq!(second.value, 5.0);
        assert_eq!(*pod.flowed_power.get(&t0).unwrap(), -10.0);
    }
}
