//! Plain, builder-constructed configuration structs. No CLI surface lives
//! here — wiring these up from argv, environment, or a config file is a
//! driver concern out of scope for the core.

use bon::Builder;

/// The real-valued thresholds [`crate::policy::optimizer::OptimizerPolicy`]
/// is parameterized by.
#[derive(Clone, Copy, Debug, Builder)]
pub struct Coefficients {
    pub consumption_slope: f64,
    pub purchase_price_slope: f64,
    pub consumption_low: f64,
    pub generation_low: f64,
    pub purchase_price_low: f64,
}

/// The coefficient grid [`crate::search::MeshSearch`] walks. Defaults to
/// `[0.40, 0.45, 0.50, 0.55, 0.60]` on every axis, matching the source.
#[derive(Clone, Debug, Builder)]
pub struct GridSearchConfig {
    #[builder(default = default_axis())]
    pub consumption_slope: Vec<f64>,
    #[builder(default = default_axis())]
    pub purchase_price_slope: Vec<f64>,
    #[builder(default = default_axis())]
    pub consumption_low: Vec<f64>,
    #[builder(default = default_axis())]
    pub generation_low: Vec<f64>,
    #[builder(default = default_axis())]
    pub purchase_price_low: Vec<f64>,
}

fn default_axis() -> Vec<f64> {
    vec![0.40, 0.45, 0.50, 0.55, 0.60]
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_search_config_default_axis() {
        let config = GridSearchConfig::default();
        assert_eq!(config.consumption_slope, vec![0.40, 0.45, 0.50, 0.55, 0.60]);
        assert_eq!(config.purchase_price_low.len(), 5);
    }

    #[test]
    fn test_coefficients_builder() {
        let coefficients = Coefficients::builder()
            .consumption_slope(0.5)
            .purchase_price_slope(0.5)
            .consumption_low(0.5)
            .generation_low(0.5)
            .purchase_price_low(0.5)
            .build();
        assert_eq!(coefficients.consumption_slope, 0.5);
    }
}
