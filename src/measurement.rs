//! A scalar value paired with a unit tag.
//!
//! Units are carried for provenance only: operators read `.value` and copy
//! the unit tag from the left-hand operand. The core never converts between
//! units; callers are responsible for matching them up front.

use std::ops::{Add, Neg, Sub};

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display("{value} {units}")]
pub struct Measurement {
    pub value: f64,
    pub units: String,
}

impl Measurement {
    pub fn new(value: f64, units: impl Into<String>) -> Self {
        Self { value, units: units.into() }
    }

    pub fn min(self, rhs: Self) -> Self {
        if rhs.value < self.value { rhs } else { self }
    }

    pub fn max(self, rhs: Self) -> Self {
        if rhs.value > self.value { rhs } else { self }
    }
}

impl Add for Measurement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self { value: self.value + rhs.value, units: self.units }
    }
}

impl Sub for Measurement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self { value: self.value - rhs.value, units: self.units }
    }
}

impl Neg for Measurement {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self { value: -self.value, units: self.units }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min() {
        let a = Measurement::new(1.0, "kW");
        let b = Measurement::new(2.0, "kW");
        assert_eq!(a.min(b).value, 1.0);
    }

    #[test]
    fn test_max() {
        let a = Measurement::new(1.0, "kW");
        let b = Measurement::new(2.0, "kW");
        assert_eq!(a.max(b).value, 2.0);
    }

    #[test]
    fn test_units_copied_from_left_operand() {
        let a = Measurement::new(1.0, "kW");
        let b = Measurement::new(2.0, "kWh");
        assert_eq!((a - b).units, "kW");
    }
}
