//! Grid search over the optimizer's five coefficients: for every tuple, a
//! fresh [`EntitiesManager`] is built, the series re-applied, the policy run
//! to completion, and the resulting cost compared against the best so far.

use std::collections::BTreeMap;

use bon::Builder;
use chrono::NaiveDateTime;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{
    config::{Coefficients, GridSearchConfig},
    cost::total_cost,
    manager::EntitiesManager,
    measurement::Measurement,
    policy::optimizer::OptimizerPolicy,
    prelude::*,
    tables::{DriverRow, TechnicalCharacteristicRow},
};

#[derive(Clone, Debug)]
pub struct MeshSearchOutcome {
    pub coefficients: Coefficients,
    pub cost: Measurement,
}

#[derive(Builder)]
pub struct MeshSearch<'a> {
    characteristics: &'a [TechnicalCharacteristicRow],
    driver_rows: &'a [DriverRow],
    generation: &'a BTreeMap<NaiveDateTime, f64>,
    max_output_power: &'a BTreeMap<NaiveDateTime, f64>,
    purchase_prices: &'a BTreeMap<NaiveDateTime, f64>,
    sale_price: f64,
    consumption: &'a BTreeMap<NaiveDateTime, f64>,
    initial: NaiveDateTime,
    final_: NaiveDateTime,
    time_lapse_hours: f64,
    #[builder(default)]
    grid: GridSearchConfig,
}

impl MeshSearch<'_> {
    /// Canonical serial order: `consumption_slope` is the outermost loop,
    /// `purchase_price_low` the innermost — the order any parallel
    /// implementation must agree with when breaking ties.
    #[instrument(name = "Searching the coefficient grid…", skip_all)]
    pub fn run(&self) -> Result<MeshSearchOutcome> {
        let mut best: Option<MeshSearchOutcome> = None;
        for coefficients in self.combinations() {
            if let Some(cost) = self.evaluate(coefficients) {
                tracing::debug!(?coefficients, %cost, "evaluated coefficient tuple");
                if best.as_ref().is_none_or(|current| cost.value < current.cost.value) {
                    best = Some(MeshSearchOutcome { coefficients, cost });
                }
            } else {
                tracing::trace!(?coefficients, "tuple disqualified: simulation failed");
            }
        }
        let outcome = best.ok_or_else(|| anyhow::anyhow!("coefficient grid is empty"))?;
        tracing::info!(coefficients = ?outcome.coefficients, cost = %outcome.cost, "best coefficients found");
        Ok(outcome)
    }

    /// Same search, run across tuples with `rayon`. Must select the same
    /// winner as [`Self::run`] — ties broken by canonical iteration order.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(&self) -> Result<MeshSearchOutcome> {
        let combinations: Vec<(usize, Coefficients)> = self.combinations().enumerate().collect();
        let best = combinations
            .into_par_iter()
            .filter_map(|(index, coefficients)| {
                self.evaluate(coefficients).map(|cost| (index, coefficients, cost))
            })
            .reduce_with(|a, b| {
                if b.2.value < a.2.value || (b.2.value == a.2.value && b.0 < a.0) { b } else { a }
            });
        let (_, coefficients, cost) =
            best.ok_or_else(|| anyhow::anyhow!("coefficient grid is empty"))?;
        Ok(MeshSearchOutcome { coefficients, cost })
    }

    fn combinations(&self) -> impl Iterator<Item = Coefficients> + '_ {
        itertools::iproduct!(
            self.grid.consumption_slope.iter().copied(),
            self.grid.purchase_price_slope.iter().copied(),
            self.grid.consumption_low.iter().copied(),
            self.grid.generation_low.iter().copied(),
            self.grid.purchase_price_low.iter().copied()
        )
        .map(
            |(
                consumption_slope,
                purchase_price_slope,
                consumption_low,
                generation_low,
                purchase_price_low,
            )| {
                Coefficients::builder()
                    .consumption_slope(consumption_slope)
                    .purchase_price_slope(purchase_price_slope)
                    .consumption_low(consumption_low)
                    .generation_low(generation_low)
                    .purchase_price_low(purchase_price_low)
                    .build()
            },
        )
    }

    fn evaluate(&self, coefficients: Coefficients) -> Option<Measurement> {
        let mut manager = self.build_manager().ok()?;
        let policy = OptimizerPolicy::new(
            coefficients.consumption_slope,
            coefficients.purchase_price_slope,
            coefficients.consumption_low,
            coefficients.generation_low,
            coefficients.purchase_price_low,
            self.driver_rows,
        );
        policy.simulate(&mut manager, self.initial, self.final_, self.time_lapse_hours).ok()?;
        Some(total_cost(&manager, self.time_lapse_hours))
    }

    fn build_manager(&self) -> Result<EntitiesManager> {
        let mut manager = EntitiesManager::from_technical_characteristics(self.characteristics)?;
        for pv in &mut manager.photovoltaic_plates {
            pv.update_generation(self.generation);
        }
        for pod in &mut manager.points_of_grid_delivery {
            pod.update_max_output_power(self.max_output_power.clone());
            pod.update_purchase_prices(self.purchase_prices.clone());
            pod.update_sale_price(self.sale_price);
        }
        for poc in &mut manager.points_of_consumption {
            poc.update_consumption(self.consumption.clone());
        }
        Ok(manager)
    }
}
