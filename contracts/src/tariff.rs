//! # Tariff Table
//!
//! Maps a completed journey `(origin, destination)` to a percentage split
//! between the two settling operators, NS and Veolia.
//!
//! | origin    | destination | NS  | Veolia |
//! |-----------|-------------|-----|--------|
//! | amsterdam | amsterdam   | 100 | 0      |
//! | amsterdam | rotterdam   | 40  | 60     |
//! | rotterdam | amsterdam   | 40  | 60     |
//! | rotterdam | rotterdam   | 0   | 100    |
//!
//! Pairs that match no rule have no split: [`TariffTable::lookup`] returns
//! `None` and the journey contract settles nothing for them.

use serde::{Deserialize, Serialize};
use std::fmt;

use transit_protocol::config::{AMSTERDAM, NS_PAY_EVENT, ROTTERDAM, VEOLIA_PAY_EVENT};

/// A settling transport operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Nederlandse Spoorwegen.
    Ns,
    /// Veolia Transport.
    Veolia,
}

impl Operator {
    /// Every operator, in settlement order.
    pub const ALL: [Operator; 2] = [Operator::Ns, Operator::Veolia];

    /// Name of the settlement event announcing this operator's share.
    pub fn event_name(self) -> &'static str {
        match self {
            Operator::Ns => NS_PAY_EVENT,
            Operator::Veolia => VEOLIA_PAY_EVENT,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Ns => write!(f, "ns"),
            Operator::Veolia => write!(f, "veolia"),
        }
    }
}

/// Percentage shares of one journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FareSplit {
    /// NS share.
    pub ns: u32,
    /// Veolia share.
    pub veolia: u32,
}

impl FareSplit {
    /// Creates a split.
    pub const fn new(ns: u32, veolia: u32) -> Self {
        Self { ns, veolia }
    }

    /// The share of `operator`.
    pub fn share(&self, operator: Operator) -> u32 {
        match operator {
            Operator::Ns => self.ns,
            Operator::Veolia => self.veolia,
        }
    }

    /// Operators with a non-zero share, paired with that share.
    pub fn payable(&self) -> impl Iterator<Item = (Operator, u32)> + '_ {
        Operator::ALL
            .into_iter()
            .map(|op| (op, self.share(op)))
            .filter(|(_, share)| *share > 0)
    }
}

/// One row of the tariff table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffRule {
    /// Check-in location.
    pub origin: String,
    /// Check-out location.
    pub destination: String,
    /// Shares for the journey.
    pub split: FareSplit,
    /// Whether the rule also covers the reverse journey.
    #[serde(default)]
    pub symmetric: bool,
}

impl TariffRule {
    fn matches(&self, origin: &str, destination: &str) -> bool {
        (self.origin == origin && self.destination == destination)
            || (self.symmetric && self.origin == destination && self.destination == origin)
    }
}

/// Ordered list of tariff rules. The first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffTable {
    rules: Vec<TariffRule>,
}

impl TariffTable {
    /// A table made of `rules`, consulted in order.
    pub fn new(rules: Vec<TariffRule>) -> Self {
        Self { rules }
    }

    /// The Amsterdam/Rotterdam table.
    pub fn standard() -> Self {
        let rule = |origin: &str, destination: &str, ns, veolia, symmetric| TariffRule {
            origin: origin.to_string(),
            destination: destination.to_string(),
            split: FareSplit::new(ns, veolia),
            symmetric,
        };
        Self::new(vec![
            rule(AMSTERDAM, AMSTERDAM, 100, 0, false),
            rule(AMSTERDAM, ROTTERDAM, 40, 60, true),
            rule(ROTTERDAM, ROTTERDAM, 0, 100, false),
        ])
    }

    /// The split for a journey, if any rule covers it.
    pub fn lookup(&self, origin: &str, destination: &str) -> Option<FareSplit> {
        self.rules
            .iter()
            .find(|r| r.matches(origin, destination))
            .map(|r| r.split)
    }

    /// The rules, in lookup order.
    pub fn rules(&self) -> &[TariffRule] {
        &self.rules
    }
}

impl Default for TariffTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_matches_published_rows() {
        let table = TariffTable::standard();
        assert_eq!(table.lookup("amsterdam", "amsterdam"), Some(FareSplit::new(100, 0)));
        assert_eq!(table.lookup("amsterdam", "rotterdam"), Some(FareSplit::new(40, 60)));
        assert_eq!(table.lookup("rotterdam", "amsterdam"), Some(FareSplit::new(40, 60)));
        assert_eq!(table.lookup("rotterdam", "rotterdam"), Some(FareSplit::new(0, 100)));
    }

    #[test]
    fn unknown_pairs_have_no_split() {
        let table = TariffTable::standard();
        assert_eq!(table.lookup("utrecht", "amsterdam"), None);
        assert_eq!(table.lookup("Amsterdam", "amsterdam"), None);
    }

    #[test]
    fn asymmetric_rule_is_one_way() {
        let table = TariffTable::new(vec![TariffRule {
            origin: "a".into(),
            destination: "b".into(),
            split: FareSplit::new(10, 90),
            symmetric: false,
        }]);
        assert!(table.lookup("a", "b").is_some());
        assert!(table.lookup("b", "a").is_none());
    }

    #[test]
    fn payable_skips_zero_shares() {
        let payable: Vec<_> = FareSplit::new(100, 0).payable().collect();
        assert_eq!(payable, vec![(Operator::Ns, 100)]);

        let payable: Vec<_> = FareSplit::new(40, 60).payable().collect();
        assert_eq!(payable, vec![(Operator::Ns, 40), (Operator::Veolia, 60)]);

        assert_eq!(FareSplit::default().payable().count(), 0);
    }

    #[test]
    fn event_names() {
        assert_eq!(Operator::Ns.event_name(), "nsPay");
        assert_eq!(Operator::Veolia.event_name(), "veoliaPay");
    }
}
