//! Net energy cost of a simulated run, read off the PODs' ledgers.

use crate::{manager::EntitiesManager, measurement::Measurement};

/// For every POD and interval: import (`flowed_power ≥ 0`) is valued at that
/// interval's purchase price, export (`flowed_power < 0`) at `-sale_price`.
/// Summed across the whole portfolio and horizon.
pub fn total_cost(manager: &EntitiesManager, time_lapse_hours: f64) -> Measurement {
    let mut cost = 0.0;
    for pod in &manager.points_of_grid_delivery {
        for (&t, &power) in &pod.flowed_power {
            let energy = power * time_lapse_hours;
            cost += if energy >= 0.0 {
                let price = pod.purchase_prices.get(&t).copied().unwrap_or(0.0);
                energy * price
            } else {
                energy * -pod.sale_price
            };
        }
    }
    Measurement::new(cost, "€")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{entities::PointOfGridDelivery, time::parse_datetime};

    #[test]
    fn test_total_cost_import_and_export() {
        let t0 = parse_datetime("2026-01-01 00:00:00").unwrap();
        let mut pod = PointOfGridDelivery::new("pod1", Measurement::new(5.0, "kW"));
        pod.update_purchase_prices(BTreeMap::from([(t0, 0.2)]));
        pod.update_sale_price(0.1);
        pod.update_flowed_power(t0, 4.0);
        let manager = EntitiesManager { points_of_grid_delivery: vec![pod], ..Default::default() };
        let cost = total_cost(&manager, 0.25);
        // energy = 4.0 * 0.25 = 1.0 kWh import at 0.2 €/kWh.
        assert!((cost.value - 0.2).abs() < 1e-12);
    }
}
