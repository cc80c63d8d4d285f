use chrono::NaiveDateTime;

use crate::{
    manager::EntitiesManager,
    measurement::Measurement,
    policy::{consumption, equal_batteries_charging, generation},
    prelude::*,
    time,
};

/// Prioritizes self-consumption: batteries absorb surplus and cover
/// deficit before the grid connection is touched.
pub struct StandardPolicy;

impl StandardPolicy {
    #[instrument(name = "Running the standard policy…", skip_all)]
    pub fn simulate(
        &self,
        manager: &mut EntitiesManager,
        initial: NaiveDateTime,
        final_: NaiveDateTime,
        time_lapse_hours: f64,
    ) -> Result<()> {
        for t0 in time::grid(initial, final_, time_lapse_hours) {
            self.distribute(manager, t0, time_lapse_hours)?;
        }
        Ok(())
    }

    fn close_out(&self, manager: &mut EntitiesManager, t0: NaiveDateTime, time_lapse_hours: f64) {
        for battery in &mut manager.batteries {
            battery.update_flowed_power(t0, 0.0, time_lapse_hours);
        }
        for pod in &mut manager.points_of_grid_delivery {
            pod.update_flowed_power(t0, 0.0);
        }
    }

    fn distribute(
        &self,
        manager: &mut EntitiesManager,
        t0: NaiveDateTime,
        time_lapse_hours: f64,
    ) -> Result<()> {
        let generation = generation(&manager.photovoltaic_plates, t0)?;
        let consumption = consumption(&manager.points_of_consumption, t0)?;
        let balance = generation.value - consumption.value / time_lapse_hours;

        if balance < 0.0 {
            let mut remaining = Measurement::new(-balance, "kW");
            for index in manager.supplying_battery_indices(time_lapse_hours) {
                let requested = remaining.clone();
                let discharged = manager.batteries[index].discharge(t0, &requested, time_lapse_hours);
                remaining.value -= discharged.value;
                if remaining.value == 0.0 {
                    self.close_out(manager, t0, time_lapse_hours);
                    return Ok(());
                }
            }
            for index in manager.supplying_pod_indices(t0)? {
                let requested = remaining.clone();
                let supplied =
                    manager.points_of_grid_delivery[index].supply_power(t0, &requested)?;
                remaining.value -= supplied.value;
                if remaining.value == 0.0 {
                    self.close_out(manager, t0, time_lapse_hours);
                    return Ok(());
                }
            }
        }

        if balance > 0.0 {
            let mut remaining = Measurement::new(balance, "kW");
            let demanding = manager.demanding_battery_indices();
            if !demanding.is_empty() {
                let not_charged = equal_batteries_charging(
                    manager,
                    &demanding,
                    remaining.clone(),
                    Measurement::new(0.0, remaining.units.clone()),
                    t0,
                    time_lapse_hours,
                );
                // Preserved verbatim: mathematically a no-op (`remaining -
                // (remaining - not_charged) == not_charged`), but the
                // source performs the subtraction rather than a direct
                // assignment.
                let diff = remaining.value - not_charged.value;
                remaining.value -= diff;
                if remaining.value == 0.0 {
                    self.close_out(manager, t0, time_lapse_hours);
                    return Ok(());
                }
            }
            for pod in &mut manager.points_of_grid_delivery {
                let requested = remaining.clone();
                let sold = pod.receive_power(t0, &requested);
                remaining.value -= sold.value;
                if remaining.value == 0.0 {
                    self.close_out(manager, t0, time_lapse_hours);
                    return Ok(());
                }
            }
        }

        self.close_out(manager, t0, time_lapse_hours);
        Ok(())
    }
}
