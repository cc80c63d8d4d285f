//! The optimizer's rule table: a situation pattern (six booleans) maps to an
//! action mask. Encoded as three pattern sets rather than a row scan, per
//! the re-architecture note — lookup becomes a set-membership test.

use std::collections::HashSet;

use crate::tables::DriverRow;

/// A six-bit situation pattern, in the fixed order `[surplus,
/// consumption_rise, purchase_price_rise, consumption_low, generation_low,
/// purchase_price_low]`.
pub type Situation = [bool; 6];

pub fn situation_of(row: &DriverRow) -> Situation {
    [
        row.surplus != 0,
        row.consumption_rise != 0,
        row.purchase_price_rise != 0,
        row.consumption_low != 0,
        row.generation_low != 0,
        row.purchase_price_low != 0,
    ]
}

#[derive(Clone, Debug, Default)]
pub struct DriverTable {
    pub send_to_batteries: HashSet<Situation>,
    pub charge_from_pods: HashSet<Situation>,
    pub get_from_batteries: HashSet<Situation>,
}

impl DriverTable {
    pub fn from_rows(rows: &[DriverRow]) -> Self {
        let mut table = Self::default();
        for row in rows {
            let situation = situation_of(row);
            if row.send_to_batteries != 0 {
                table.send_to_batteries.insert(situation);
            }
            if row.charge_from_pods != 0 {
                table.charge_from_pods.insert(situation);
            }
            if row.get_from_batteries != 0 {
                table.get_from_batteries.insert(situation);
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_splits_by_action() {
        let rows = vec![
            DriverRow {
                surplus: 1,
                consumption_rise: 0,
                purchase_price_rise: 0,
                consumption_low: 0,
                generation_low: 0,
                purchase_price_low: 0,
                send_to_batteries: 1,
                charge_from_pods: 0,
                get_from_batteries: 0,
            },
            DriverRow {
                surplus: 0,
                consumption_rise: 1,
                purchase_price_rise: 0,
                consumption_low: 0,
                generation_low: 0,
                purchase_price_low: 0,
                send_to_batteries: 0,
                charge_from_pods: 1,
                get_from_batteries: 1,
            },
        ];
        let table = DriverTable::from_rows(&rows);
        assert!(table.send_to_batteries.contains(&[true, false, false, false, false, false]));
        assert!(table.charge_from_pods.contains(&[false, true, false, false, false, false]));
        assert!(table.get_from_batteries.contains(&[false, true, false, false, false, false]));
        assert!(!table.send_to_batteries.contains(&[false, true, false, false, false, false]));
    }
}
