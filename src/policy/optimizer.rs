use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::{
    manager::EntitiesManager,
    measurement::Measurement,
    policy::{
        consumption, driver::{DriverTable, Situation}, equal_batteries_charging, generation, purchase_price,
    },
    prelude::*,
    tables::DriverRow,
    time,
};

const SLOPE_K: f64 = 0.72134752;

/// Parameterized dispatcher: picks an action from [`DriverTable`] keyed by a
/// six-bit situation vector computed per interval.
pub struct OptimizerPolicy {
    pub consumption_slope: f64,
    pub purchase_price_slope: f64,
    pub consumption_low: f64,
    pub generation_low: f64,
    pub purchase_price_low: f64,
    driver_table: DriverTable,
}

impl OptimizerPolicy {
    pub fn new(
        consumption_slope: f64,
        purchase_price_slope: f64,
        consumption_low: f64,
        generation_low: f64,
        purchase_price_low: f64,
        driver_rows: &[DriverRow],
    ) -> Self {
        Self {
            consumption_slope,
            purchase_price_slope,
            consumption_low,
            generation_low,
            purchase_price_low,
            driver_table: DriverTable::from_rows(driver_rows),
        }
    }

    #[instrument(name = "Running the optimizer policy…", skip_all)]
    pub fn simulate(
        &self,
        manager: &mut EntitiesManager,
        initial: NaiveDateTime,
        final_: NaiveDateTime,
        time_lapse_hours: f64,
    ) -> Result<()> {
        for t0 in time::grid(initial, final_, time_lapse_hours) {
            let t1 = t0 + time::step(time_lapse_hours);
            self.distribute(manager, t0, t1, time_lapse_hours)?;
        }
        Ok(())
    }

    fn distribute(
        &self,
        manager: &mut EntitiesManager,
        t0: NaiveDateTime,
        t1: NaiveDateTime,
        time_lapse_hours: f64,
    ) -> Result<()> {
        let current_consumption = consumption(&manager.points_of_consumption, t0)?;
        let next_consumption = consumption(&manager.points_of_consumption, t1)?;
        let current_generation = generation(&manager.photovoltaic_plates, t0)?;
        let current_price = purchase_price(&manager.points_of_grid_delivery, t0)?;
        let next_price = purchase_price(&manager.points_of_grid_delivery, t1)?;

        let consumption_slope = slope(&current_consumption, &next_consumption);
        let price_slope = slope(&current_price, &next_price);

        // Range-normalization uses only the first entity of each kind,
        // discarding data from the rest of the portfolio — preserved
        // verbatim.
        let consumption_range = range_of(manager.points_of_consumption[0].all_consumption());
        let generation_range = range_of(manager.photovoltaic_plates[0].all_generation());
        let price_range = range_of(&manager.points_of_grid_delivery[0].purchase_prices);

        let relative_consumption = relative(current_consumption.value, consumption_range);
        let relative_generation = relative(current_generation.value, generation_range);
        let relative_price = relative(current_price.value, price_range);

        let situation: Situation = [
            current_generation.value - current_consumption.value / time_lapse_hours >= 0.0,
            consumption_slope >= self.consumption_slope,
            price_slope >= self.purchase_price_slope,
            relative_consumption < self.consumption_low,
            relative_generation < self.generation_low,
            relative_price < self.purchase_price_low,
        ];

        if situation[0] {
            self.send_power(manager, t0, time_lapse_hours, &current_consumption, &current_generation, situation);
        } else {
            self.get_power(manager, t0, time_lapse_hours, &current_consumption, &current_generation, situation)?;
        }
        Ok(())
    }

    fn send_power(
        &self,
        manager: &mut EntitiesManager,
        t0: NaiveDateTime,
        time_lapse_hours: f64,
        consumption: &Measurement,
        generation: &Measurement,
        situation: Situation,
    ) {
        let mut remaining =
            Measurement::new(generation.value - consumption.value / time_lapse_hours, generation.units.clone());
        let demanding = manager.demanding_battery_indices();

        if self.driver_table.send_to_batteries.contains(&situation) && !demanding.is_empty() {
            let not_charged = equal_batteries_charging(
                manager,
                &demanding,
                remaining.clone(),
                Measurement::new(0.0, remaining.units.clone()),
                t0,
                time_lapse_hours,
            );
            // Preserved verbatim, see the matching note in the standard
            // policy.
            let diff = remaining.value - not_charged.value;
            remaining.value -= diff;
            if remaining.value == 0.0 {
                close_out(manager, t0, time_lapse_hours, remaining.value);
                return;
            }
        }

        let pod_count = manager.points_of_grid_delivery.len();
        let power_per_pod = Measurement::new(remaining.value / pod_count as f64, remaining.units.clone());
        for pod in &mut manager.points_of_grid_delivery {
            let received = pod.receive_power(t0, &power_per_pod);
            remaining.value -= received.value;
        }
        close_out(manager, t0, time_lapse_hours, remaining.value);
    }

    fn get_power(
        &self,
        manager: &mut EntitiesManager,
        t0: NaiveDateTime,
        time_lapse_hours: f64,
        consumption: &Measurement,
        generation: &Measurement,
        situation: Situation,
    ) -> Result<()> {
        let mut remaining =
            Measurement::new(consumption.value / time_lapse_hours - generation.value, generation.units.clone());
        let supplying = manager.supplying_battery_indices(time_lapse_hours);
        let demanding = manager.demanding_battery_indices();

        if self.driver_table.get_from_batteries.contains(&situation) && !supplying.is_empty() {
            for index in supplying {
                let requested = remaining.clone();
                let discharged = manager.batteries[index].discharge(t0, &requested, time_lapse_hours);
                remaining.value -= discharged.value;
            }
            if remaining.value == 0.0 {
                close_out(manager, t0, time_lapse_hours, remaining.value);
                return Ok(());
            }
        }

        let pod_count = manager.points_of_grid_delivery.len();
        let power_per_pod = Measurement::new(remaining.value / pod_count as f64, remaining.units.clone());
        for index in 0..pod_count {
            let supplied = manager.points_of_grid_delivery[index].supply_power(t0, &power_per_pod)?;
            remaining.value -= supplied.value;
        }

        if self.driver_table.charge_from_pods.contains(&situation) && !demanding.is_empty() {
            let mut available_power = Measurement::new(0.0, remaining.units.clone());
            for pod in &manager.points_of_grid_delivery {
                available_power.value += pod.available_power(t0)?.value;
            }
            let not_charged = equal_batteries_charging(
                manager,
                &demanding,
                available_power.clone(),
                Measurement::new(0.0, remaining.units.clone()),
                t0,
                time_lapse_hours,
            );
            let charged_power_per_pod = (available_power.value - not_charged.value) / pod_count as f64;
            for pod in &mut manager.points_of_grid_delivery {
                pod.update_flowed_power(t0, charged_power_per_pod);
            }
        }

        close_out(manager, t0, time_lapse_hours, remaining.value);
        Ok(())
    }
}

/// Pushes `leftover` (whatever value `remaining` ended up holding, possibly
/// nonzero) to every battery and POD — preserved verbatim: the source's
/// final write is unconditional, not gated on `leftover == 0.0`.
fn close_out(manager: &mut EntitiesManager, t0: NaiveDateTime, time_lapse_hours: f64, leftover: f64) {
    for battery in &mut manager.batteries {
        battery.update_flowed_power(t0, leftover, time_lapse_hours);
    }
    for pod in &mut manager.points_of_grid_delivery {
        pod.update_flowed_power(t0, leftover);
    }
}

fn slope(current: &Measurement, following: &Measurement) -> f64 {
    if current.value == 0.0 && following.value == 0.0 {
        0.0
    } else if current.value == 0.0 {
        following.value
    } else if following.value == 0.0 {
        -current.value
    } else {
        SLOPE_K * (current.value / following.value).ln() + 0.5
    }
}

/// `(x - lo) / (hi - lo)`, or `0.0` when the range is empty (`hi == lo`) —
/// resolving the division-by-zero the source leaves open as a choice
/// between clamping to zero and a fatal error.
fn relative(x: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi - lo == 0.0 { 0.0 } else { (x - lo) / (hi - lo) }
}

fn range_of(series: &BTreeMap<NaiveDateTime, f64>) -> (f64, f64) {
    if series.is_empty() {
        return (0.0, 0.0);
    }
    series.values().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_zero_zero() {
        assert_eq!(slope(&Measurement::new(0.0, "kW"), &Measurement::new(0.0, "kW")), 0.0);
    }

    #[test]
    fn test_slope_zero_then_nonzero() {
        assert_eq!(slope(&Measurement::new(0.0, "kW"), &Measurement::new(3.0, "kW")), 3.0);
    }

    #[test]
    fn test_slope_nonzero_then_zero() {
        assert_eq!(slope(&Measurement::new(3.0, "kW"), &Measurement::new(0.0, "kW")), -3.0);
    }

    #[test]
    fn test_slope_general_case() {
        let value = slope(&Measurement::new(2.0, "kW"), &Measurement::new(1.0, "kW"));
        assert!((value - (SLOPE_K * 2f64.ln() + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_relative_empty_range_is_zero() {
        assert_eq!(relative(5.0, (3.0, 3.0)), 0.0);
    }
}
