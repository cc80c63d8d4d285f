//! Helpers shared between [`standard::StandardPolicy`] and
//! [`optimizer::OptimizerPolicy`]: aggregating generation/consumption across
//! a timestamp, and equal-share battery charging with overflow rebalancing.

pub mod driver;
pub mod optimizer;
pub mod standard;

use chrono::NaiveDateTime;

use crate::{
    entities::{PhotovoltaicPlate, PointOfConsumption, PointOfGridDelivery},
    manager::EntitiesManager,
    measurement::Measurement,
    prelude::*,
};

pub fn generation(pvs: &[PhotovoltaicPlate], initial_datetime: NaiveDateTime) -> Result<Measurement> {
    let mut total = Measurement::new(0.0, "kW");
    for pv in pvs {
        total.value += pv.get_generation(initial_datetime)?.value;
    }
    Ok(total)
}

pub fn consumption(
    pocs: &[PointOfConsumption],
    initial_datetime: NaiveDateTime,
) -> Result<Measurement> {
    let mut total = Measurement::new(0.0, "kWh");
    for poc in pocs {
        total.value += poc.get_consumption(initial_datetime)?.value;
    }
    Ok(total)
}

pub fn purchase_price(
    pods: &[PointOfGridDelivery],
    initial_datetime: NaiveDateTime,
) -> Result<Measurement> {
    Ok(Measurement::new(pods[0].get_purchase_price(initial_datetime)?.value, "€/kWh"))
}

/// Splits `available_power` equally across `demanders`, lets each battery
/// attempt to charge its share, and recurses (here, loops) over whichever
/// batteries are not yet saturated — saturation meaning the charged amount
/// equalled either the battery's own vacancy or its `max_input_power` minus
/// the previous round's per-battery share. Converted from the source's
/// recursion to a bounded loop, per the re-architecture note: depth is
/// bounded by the number of demanding batteries.
#[instrument(skip_all, fields(n_demanders = demanders.len()))]
pub fn equal_batteries_charging(
    manager: &mut EntitiesManager,
    demanders: &[usize],
    mut available_power: Measurement,
    mut previous_charged_power: Measurement,
    initial_datetime: NaiveDateTime,
    time_lapse_hours: f64,
) -> Measurement {
    let mut still_demanding: Vec<usize> = demanders.to_vec();
    loop {
        if still_demanding.is_empty() || available_power.value == 0.0 {
            return available_power;
        }
        let power_to_charge = available_power.value / still_demanding.len() as f64;
        let mut next_demanding = Vec::new();
        for &index in &still_demanding {
            let battery = &mut manager.batteries[index];
            let vacant_power = battery.nominal_energy.value / time_lapse_hours
                - battery.energy.value / time_lapse_hours;
            let max_input_power = battery.max_input_power.value - previous_charged_power.value;
            let charged = battery.charge(initial_datetime, time_lapse_hours);
            available_power.value -= charged.value;
            if charged.value != vacant_power && charged.value != max_input_power {
                next_demanding.push(index);
            }
        }
        still_demanding = next_demanding;
        previous_charged_power = Measurement::new(power_to_charge, available_power.units.clone());
    }
}
