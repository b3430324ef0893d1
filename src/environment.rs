//! MIL-HDBK-217F operating environments.
//!
//! The handbook tabulates every environment-dependent factor over the same
//! fourteen environments, in this order. Index 1 is Ground-Benign.

use serde::{Deserialize, Serialize};

/// Active (operating) environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Environment {
    GroundBenign = 1,
    GroundFixed = 2,
    GroundMobile = 3,
    NavalSheltered = 4,
    NavalUnsheltered = 5,
    AirborneInhabitedCargo = 6,
    AirborneInhabitedFighter = 7,
    AirborneUninhabitedCargo = 8,
    AirborneUninhabitedFighter = 9,
    AirborneRotaryWing = 10,
    SpaceFlight = 11,
    MissileFlight = 12,
    MissileLaunch = 13,
    CannonLaunch = 14,
}

/// Number of tabulated environments.
pub const ENVIRONMENT_COUNT: usize = 14;

/// Coarse grouping used by the dormant-rate conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentFamily {
    Ground,
    Naval,
    Airborne,
    Space,
    Missile,
}

impl Environment {
    pub const ALL: [Environment; ENVIRONMENT_COUNT] = [
        Environment::GroundBenign,
        Environment::GroundFixed,
        Environment::GroundMobile,
        Environment::NavalSheltered,
        Environment::NavalUnsheltered,
        Environment::AirborneInhabitedCargo,
        Environment::AirborneInhabitedFighter,
        Environment::AirborneUninhabitedCargo,
        Environment::AirborneUninhabitedFighter,
        Environment::AirborneRotaryWing,
        Environment::SpaceFlight,
        Environment::MissileFlight,
        Environment::MissileLaunch,
        Environment::CannonLaunch,
    ];

    /// Maps a 1-based handbook index to an environment.
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// 1-based handbook index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Handbook abbreviation (GB, GF, ... CL).
    pub fn code(self) -> &'static str {
        match self {
            Environment::GroundBenign => "GB",
            Environment::GroundFixed => "GF",
            Environment::GroundMobile => "GM",
            Environment::NavalSheltered => "NS",
            Environment::NavalUnsheltered => "NU",
            Environment::AirborneInhabitedCargo => "AIC",
            Environment::AirborneInhabitedFighter => "AIF",
            Environment::AirborneUninhabitedCargo => "AUC",
            Environment::AirborneUninhabitedFighter => "AUF",
            Environment::AirborneRotaryWing => "ARW",
            Environment::SpaceFlight => "SF",
            Environment::MissileFlight => "MF",
            Environment::MissileLaunch => "ML",
            Environment::CannonLaunch => "CL",
        }
    }

    /// Benign environments get the relaxed derating thresholds.
    pub fn is_benign(self) -> bool {
        matches!(
            self,
            Environment::GroundBenign
                | Environment::GroundFixed
                | Environment::NavalSheltered
                | Environment::SpaceFlight
        )
    }

    pub fn is_harsh(self) -> bool {
        !self.is_benign()
    }

    pub fn family(self) -> EnvironmentFamily {
        match self.index() {
            1..=3 => EnvironmentFamily::Ground,
            4 | 5 => EnvironmentFamily::Naval,
            6..=10 => EnvironmentFamily::Airborne,
            11 => EnvironmentFamily::Space,
            _ => EnvironmentFamily::Missile,
        }
    }

    /// Selects this environment's entry from a 14-wide table.
    pub fn pick(self, table: &[f64; ENVIRONMENT_COUNT]) -> f64 {
        table[self.index() - 1]
    }
}

/// Storage environment for dormant hazard-rate conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DormantEnvironment {
    Ground = 1,
    Naval = 2,
    Airborne = 3,
    Space = 4,
}

impl DormantEnvironment {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::Ground),
            2 => Some(Self::Naval),
            3 => Some(Self::Airborne),
            4 => Some(Self::Space),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, env) in Environment::ALL.iter().enumerate() {
            assert_eq!(env.index(), i + 1);
            assert_eq!(Environment::from_index(i + 1), Some(*env));
        }
        assert_eq!(Environment::from_index(0), None);
        assert_eq!(Environment::from_index(15), None);
    }

    #[test]
    fn test_benign_set() {
        let benign: Vec<_> = Environment::ALL
            .iter()
            .filter(|e| e.is_benign())
            .map(|e| e.code())
            .collect();
        assert_eq!(benign, vec!["GB", "GF", "NS", "SF"]);
    }

    #[test]
    fn test_families() {
        assert_eq!(Environment::GroundMobile.family(), EnvironmentFamily::Ground);
        assert_eq!(Environment::NavalUnsheltered.family(), EnvironmentFamily::Naval);
        assert_eq!(Environment::AirborneRotaryWing.family(), EnvironmentFamily::Airborne);
        assert_eq!(Environment::SpaceFlight.family(), EnvironmentFamily::Space);
        assert_eq!(Environment::CannonLaunch.family(), EnvironmentFamily::Missile);
    }
}
