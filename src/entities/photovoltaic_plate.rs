use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{error::SimulationError, measurement::Measurement, prelude::*};

/// A solar generator. Generation is derived once from a meteorological
/// series and read-only thereafter.
#[derive(Clone, Debug)]
pub struct PhotovoltaicPlate {
    pub id: String,
    pub surface: Measurement,
    pub efficiency: Measurement,
    pub max_output_power: Measurement,
    generation: BTreeMap<NaiveDateTime, f64>,
}

impl PhotovoltaicPlate {
    pub fn new(
        id: impl Into<String>,
        surface: Measurement,
        efficiency: Measurement,
        max_output_power: Measurement,
    ) -> Self {
        Self {
            id: id.into(),
            surface,
            efficiency,
            max_output_power,
            generation: BTreeMap::new(),
        }
    }

    /// `direct_radiation / 1000 * surface * efficiency / 100`, in kW.
    ///
    /// Called once, after construction, with the direct-radiation series;
    /// read-only afterwards.
    pub fn update_generation(&mut self, direct_radiation: &BTreeMap<NaiveDateTime, f64>) {
        self.generation = direct_radiation
            .iter()
            .map(|(&t, &radiation)| {
                (t, radiation / 1000.0 * self.surface.value * self.efficiency.value / 100.0)
            })
            .collect();
    }

    pub fn get_generation(&self, initial_datetime: NaiveDateTime) -> Result<Measurement> {
        self.generation
            .get(&initial_datetime)
            .map(|&value| Measurement::new(value, "kW"))
            .ok_or_else(|| {
                SimulationError::MisalignedInput {
                    entity: self.id.clone(),
                    timestamp: crate::time::format_datetime(initial_datetime),
                }
                .into()
            })
    }

    pub fn all_generation(&self) -> &BTreeMap<NaiveDateTime, f64> {
        &self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_datetime;

    #[test]
    fn test_update_generation() {
        let mut pv = PhotovoltaicPlate::new(
            "pv1",
            Measurement::new(10.0, "m2"),
            Measurement::new(20.0, "%"),
            Measurement::new(5.0, "kW"),
        );
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        let radiation = BTreeMap::from([(t0, 1000.0)]);
        pv.update_generation(&radiation);
        // 1000/1000 * 10 * 20/100 = 2.0 kW
        assert_eq!(pv.get_generation(t0).unwrap().value, 2.0);
    }
}
