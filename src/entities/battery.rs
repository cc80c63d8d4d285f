use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::measurement::Measurement;

/// A storage asset: immutable nameplate parameters, mutable state of charge,
/// and two append-only ledgers keyed by interval start.
#[derive(Clone, Debug)]
pub struct Battery {
    pub id: String,
    pub nominal_energy: Measurement,
    pub max_input_power: Measurement,
    pub max_output_power: Measurement,
    pub energy: Measurement,
    pub flowed_power: BTreeMap<NaiveDateTime, f64>,
    pub stored_energy: BTreeMap<NaiveDateTime, f64>,
}

impl Battery {
    pub fn new(
        id: impl Into<String>,
        nominal_energy: Measurement,
        max_input_power: Measurement,
        max_output_power: Measurement,
    ) -> Self {
        let units = nominal_energy.units.clone();
        Self {
            id: id.into(),
            nominal_energy,
            max_input_power,
            max_output_power,
            energy: Measurement::new(0.0, units),
            flowed_power: BTreeMap::new(),
            stored_energy: BTreeMap::new(),
        }
    }

    /// `min(energy/Δ, max_input_power)`.
    ///
    /// Uses `max_input_power` rather than `max_output_power` as its cap —
    /// preserved verbatim from the source this was ported from.
    pub fn available_power(&self, time_lapse_hours: f64) -> Measurement {
        let stored_power = self.energy.value / time_lapse_hours;
        Measurement::new(stored_power.min(self.max_input_power.value), "kW")
    }

    /// Charges the battery. The `requested` amount is not an upper bound:
    /// the charged power is always `min(vacant_power, max_input_power)`,
    /// regardless of what was asked for — preserved verbatim.
    pub fn charge(
        &mut self,
        initial_datetime: NaiveDateTime,
        time_lapse_hours: f64,
    ) -> Measurement {
        let vacant_power = self.nominal_energy.value / time_lapse_hours - self.energy.value / time_lapse_hours;
        let charged = vacant_power.min(self.max_input_power.value);
        self.update_flowed_power(initial_datetime, charged, time_lapse_hours);
        Measurement::new(charged, "kW")
    }

    pub fn discharge(
        &mut self,
        initial_datetime: NaiveDateTime,
        requested: &Measurement,
        time_lapse_hours: f64,
    ) -> Measurement {
        let discharged = self.available_power(time_lapse_hours).value.min(requested.value);
        self.update_flowed_power(initial_datetime, -discharged, time_lapse_hours);
        Measurement::new(discharged, "kW")
    }

    /// Accumulates into an existing ledger entry for `initial_datetime`, or
    /// appends a new one. Only a *new* entry moves `energy`/`stored_energy`
    /// — a second accumulating write into an already-ledgered interval
    /// changes the recorded power but not the state of charge. Preserved
    /// verbatim from the source.
    pub fn update_flowed_power(
        &mut self,
        initial_datetime: NaiveDateTime,
        signed_power: f64,
        time_lapse_hours: f64,
    ) {
        if let Some(existing) = self.flowed_power.get_mut(&initial_datetime) {
            *existing += signed_power;
            return;
        }
        self.flowed_power.insert(initial_datetime, signed_power);
        self.energy.value += signed_power * time_lapse_hours;
        self.stored_energy.insert(initial_datetime, self.energy.value);
    }

    pub fn state_of_charge_percent(&self, initial_datetime: NaiveDateTime) -> Option<f64> {
        self.stored_energy
            .get(&initial_datetime)
            .map(|stored| stored / self.nominal_energy.value * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_datetime;

    fn battery() -> Battery {
        Battery::new(
            "b1",
            Measurement::new(10.0, "kWh"),
            Measurement::new(4.0, "kW"),
            Measurement::new(4.0, "kW"),
        )
    }

    #[test]
    fn test_available_power_uses_max_input_power() {
        let mut b = battery();
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        b.update_flowed_power(t0, 4.0, 0.25);
        // energy is now 1.0 kWh => stored_power = 1.0/0.25 = 4.0, capped at max_input_power (4.0).
        assert_eq!(b.available_power(0.25).value, 4.0);
    }

    #[test]
    fn test_charge_ignores_requested() {
        let mut b = battery();
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        let charged = b.charge(t0, 0.25);
        // vacant_power = 10/0.25 = 40, capped at max_input_power = 4.
        assert_eq!(charged.value, 4.0);
        assert_eq!(b.energy.value, 1.0);
    }

    #[test]
    fn test_second_write_in_interval_does_not_move_energy() {
        let mut b = battery();
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        b.update_flowed_power(t0, 2.0, 0.25);
        assert_eq!(b.energy.value, 0.5);
        b.update_flowed_power(t0, 1.0, 0.25);
        assert_eq!(*b.flowed_power.get(&t0).unwrap(), 3.0);
        assert_eq!(b.energy.value, 0.5);
    }
}
