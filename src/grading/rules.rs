//! Rule-set selection by block height.
//!
//! Each network carries a totally-ordered table of activation heights; the
//! dispatcher resolves a height to the immutable [`RuleSet`] in force there.
//! Every node must resolve identically, so the tables are compiled in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::grading::error::GradingError;
use crate::record::assets::{ASSETS_V1, ASSETS_V2, ASSETS_V4};

/// Protocol name, first field of the record chain name.
pub const PROTOCOL: &str = "PegNet";

/// Chain-name tag of the record chain.
pub const OPR_CHAIN_TAG: &str = "OraclePriceRecords";

/// MainNet heights. The network activates with version 1 grading; later
/// versions take over at their activation heights.
pub const MAINNET_ACTIVATION: i32 = 206_421;
pub const MAINNET_V2_ACTIVATION: i32 = 210_330;
pub const MAINNET_V4_ACTIVATION: i32 = 231_620;

/// TestNet launched directly on version 2 rules.
pub const TESTNET_V4_ACTIVATION: i32 = 96_145;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    MainNet,
    TestNet,
    /// Compressed activation table for tests: version 1 below height 100,
    /// version 2 below 200, version 4 above.
    UnitTest,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::MainNet => "MainNet",
            Network::TestNet => "TestNet-pM7",
            Network::UnitTest => "unit-test",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = String;

    /// Accepts the different casings of the network names, so `mainnet`,
    /// `Mainnet`, and similar are all valid.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::MainNet),
            "testnet" | "testnet-pm7" => Ok(Network::TestNet),
            "unittest" | "unit-test" => Ok(Network::UnitTest),
            _ => Err(format!("'{}' is not a valid network", s)),
        }
    }
}

/// Immutable grading parameters for one protocol version.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// Expected version byte in the entry's third external ID.
    pub version: u8,
    /// Ordered asset list; prices and reference values follow this order.
    pub assets: &'static [&'static str],
    /// Previous-winners count carried by each record.
    pub winners_count: usize,
    /// Records that form the final winners set.
    pub top_rank: usize,
    /// Records kept after difficulty ranking, before accuracy grading.
    pub cutoff: usize,
    /// Relative band around the preliminary mean used for the reference
    /// value; zero means plain average.
    pub band: f64,
}

const RULES_V1: RuleSet = RuleSet {
    version: 1,
    assets: ASSETS_V1,
    winners_count: 10,
    top_rank: 10,
    cutoff: 50,
    band: 0.0,
};

const RULES_V2: RuleSet = RuleSet {
    version: 2,
    assets: ASSETS_V2,
    winners_count: 25,
    top_rank: 25,
    cutoff: 200,
    band: 0.01,
};

const RULES_V4: RuleSet = RuleSet {
    version: 4,
    assets: ASSETS_V4,
    winners_count: 25,
    top_rank: 25,
    cutoff: 200,
    band: 0.01,
};

/// Resolves the rule-set in force at `height` on `network`.
pub fn rules_at(network: Network, height: i32) -> Result<RuleSet, GradingError> {
    let table: &[(i32, &RuleSet)] = match network {
        Network::MainNet => &[
            (MAINNET_ACTIVATION, &RULES_V1),
            (MAINNET_V2_ACTIVATION, &RULES_V2),
            (MAINNET_V4_ACTIVATION, &RULES_V4),
        ],
        Network::TestNet => &[(0, &RULES_V2), (TESTNET_V4_ACTIVATION, &RULES_V4)],
        Network::UnitTest => &[(0, &RULES_V1), (100, &RULES_V2), (200, &RULES_V4)],
    };

    let first = table[0].0;
    if height < first {
        return Err(GradingError::NetworkInactive {
            network: network.name().to_string(),
            height,
        });
    }

    let rules = table
        .iter()
        .rev()
        .find(|(activation, _)| height >= *activation)
        .map(|(_, rules)| (*rules).clone())
        .ok_or(GradingError::UnsupportedVersion {
            network: network.name().to_string(),
            height,
        })?;

    Ok(rules)
}

/// Human readable difficulty in scientific notation, for logs.
pub fn format_difficulty(diff: u64, precision: usize) -> String {
    format!("{:.*e}", precision, diff as f64)
}

/// Human readable grade in scientific notation, for logs.
pub fn format_grade(grade: f64, precision: usize) -> String {
    format!("{:.*e}", precision, grade)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_activation_boundaries() {
        let before = rules_at(Network::MainNet, MAINNET_ACTIVATION - 1);
        assert!(matches!(
            before,
            Err(GradingError::NetworkInactive { .. })
        ));

        assert_eq!(rules_at(Network::MainNet, MAINNET_ACTIVATION).unwrap().version, 1);
        assert_eq!(
            rules_at(Network::MainNet, MAINNET_V2_ACTIVATION - 1).unwrap().version,
            1
        );
        assert_eq!(
            rules_at(Network::MainNet, MAINNET_V2_ACTIVATION).unwrap().version,
            2
        );
        assert_eq!(
            rules_at(Network::MainNet, MAINNET_V4_ACTIVATION + 10_000).unwrap().version,
            4
        );
    }

    #[test]
    fn test_unit_test_table() {
        assert_eq!(rules_at(Network::UnitTest, 0).unwrap().version, 1);
        assert_eq!(rules_at(Network::UnitTest, 99).unwrap().version, 1);
        assert_eq!(rules_at(Network::UnitTest, 100).unwrap().version, 2);
        assert_eq!(rules_at(Network::UnitTest, 500).unwrap().version, 4);
    }

    #[test]
    fn test_negative_height_is_inactive() {
        assert!(matches!(
            rules_at(Network::UnitTest, -1),
            Err(GradingError::NetworkInactive { .. })
        ));
    }

    #[test]
    fn test_rule_set_parameters() {
        let v1 = rules_at(Network::UnitTest, 0).unwrap();
        assert_eq!(v1.winners_count, 10);
        assert_eq!(v1.cutoff, 50);
        assert_eq!(v1.band, 0.0);

        let v2 = rules_at(Network::UnitTest, 100).unwrap();
        assert_eq!(v2.winners_count, 25);
        assert_eq!(v2.cutoff, 200);
        assert!(v2.band > 0.0);
    }

    #[test]
    fn test_network_parsing() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::MainNet);
        assert_eq!("MainNet".parse::<Network>().unwrap(), Network::MainNet);
        assert_eq!("TestNet-pM7".parse::<Network>().unwrap(), Network::TestNet);
        assert_eq!("unit-test".parse::<Network>().unwrap(), Network::UnitTest);
        assert!("betanet".parse::<Network>().is_err());
    }

    #[test]
    fn test_format_helpers() {
        assert_eq!(format_difficulty(0, 2), "0.00e0");
        assert_eq!(format_grade(0.0015, 1), "1.5e-3");
    }
}
