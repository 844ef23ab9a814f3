//! Species, soil and season lookup tables for the rule engine.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Supported plant species. Unknown inputs parse as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesKind {
    Succulent,
    Cactus,
    Fern,
    Tomato,
    Lettuce,
    Herb,
    Flower,
    Tree,
    Pepper,
    Cucumber,
    Other,
}

impl FromStr for SpeciesKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "succulent" => SpeciesKind::Succulent,
            "cactus" => SpeciesKind::Cactus,
            "fern" => SpeciesKind::Fern,
            "tomato" => SpeciesKind::Tomato,
            "lettuce" => SpeciesKind::Lettuce,
            "herb" => SpeciesKind::Herb,
            "flower" => SpeciesKind::Flower,
            "tree" => SpeciesKind::Tree,
            "pepper" => SpeciesKind::Pepper,
            "cucumber" => SpeciesKind::Cucumber,
            _ => SpeciesKind::Other,
        })
    }
}

impl fmt::Display for SpeciesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpeciesKind::Succulent => "succulent",
            SpeciesKind::Cactus => "cactus",
            SpeciesKind::Fern => "fern",
            SpeciesKind::Tomato => "tomato",
            SpeciesKind::Lettuce => "lettuce",
            SpeciesKind::Herb => "herb",
            SpeciesKind::Flower => "flower",
            SpeciesKind::Tree => "tree",
            SpeciesKind::Pepper => "pepper",
            SpeciesKind::Cucumber => "cucumber",
            SpeciesKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Soil texture. Scales the critical/dry moisture thresholds by water
/// retention: clay holds water, sand drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilKind {
    Clay,
    Sand,
    Loam,
    Peat,
}

impl SoilKind {
    pub fn retention_factor(self) -> f64 {
        match self {
            SoilKind::Clay => 1.2,
            SoilKind::Sand => 0.8,
            SoilKind::Loam => 1.0,
            SoilKind::Peat => 1.1,
        }
    }
}

impl FromStr for SoilKind {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clay" => Ok(SoilKind::Clay),
            "sand" => Ok(SoilKind::Sand),
            "loam" => Ok(SoilKind::Loam),
            "peat" => Ok(SoilKind::Peat),
            other => Err(UnknownNameError {
                what: "soil",
                name: other.to_string(),
            }),
        }
    }
}

/// Season. Scales the dry threshold for growth and evaporation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn dry_factor(self) -> f64 {
        match self {
            Season::Spring => 1.1,
            Season::Summer => 1.3,
            Season::Autumn => 0.9,
            Season::Winter => 0.7,
        }
    }

    /// Northern-hemisphere month mapping (1-12).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

impl FromStr for Season {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            "winter" => Ok(Season::Winter),
            other => Err(UnknownNameError {
                what: "season",
                name: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown {what} name: {name}")]
pub struct UnknownNameError {
    pub what: &'static str,
    pub name: String,
}

/// Soil-moisture percentage thresholds before soil/season scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoistureThresholds {
    pub critical: f64,
    pub dry: f64,
    pub wet: f64,
}

/// Inclusive optimal band for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimalRange {
    pub min: f64,
    pub max: f64,
}

impl OptimalRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Care parameters for one species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    pub kind: SpeciesKind,
    pub thresholds: MoistureThresholds,
    pub optimal_temperature: OptimalRange,
    pub optimal_humidity: OptimalRange,
    pub optimal_light: OptimalRange,
    /// Daily watering baseline in ml; anchors volume suggestions.
    pub baseline_ml_per_day: f64,
}

impl SpeciesProfile {
    /// Optimal moisture band derived from the species thresholds.
    pub fn optimal_moisture(&self) -> OptimalRange {
        OptimalRange::new(self.thresholds.dry + 5.0, self.thresholds.wet - 10.0)
    }
}

const fn profile(
    kind: SpeciesKind,
    critical: f64,
    dry: f64,
    wet: f64,
    temperature: OptimalRange,
    humidity: OptimalRange,
    light: OptimalRange,
    baseline_ml_per_day: f64,
) -> SpeciesProfile {
    SpeciesProfile {
        kind,
        thresholds: MoistureThresholds { critical, dry, wet },
        optimal_temperature: temperature,
        optimal_humidity: humidity,
        optimal_light: light,
        baseline_ml_per_day,
    }
}

static PROFILES: LazyLock<AHashMap<SpeciesKind, SpeciesProfile>> = LazyLock::new(|| {
    let defaults_t = OptimalRange::new(15.0, 30.0);
    let defaults_h = OptimalRange::new(40.0, 75.0);
    let defaults_l = OptimalRange::new(30.0, 80.0);

    let entries = [
        profile(
            SpeciesKind::Succulent,
            10.0,
            20.0,
            40.0,
            OptimalRange::new(18.0, 35.0),
            OptimalRange::new(20.0, 50.0),
            OptimalRange::new(50.0, 95.0),
            100.0,
        ),
        profile(
            SpeciesKind::Cactus,
            8.0,
            15.0,
            35.0,
            OptimalRange::new(18.0, 38.0),
            OptimalRange::new(10.0, 40.0),
            OptimalRange::new(60.0, 100.0),
            80.0,
        ),
        profile(
            SpeciesKind::Fern,
            30.0,
            45.0,
            80.0,
            OptimalRange::new(15.0, 26.0),
            OptimalRange::new(55.0, 90.0),
            OptimalRange::new(15.0, 60.0),
            300.0,
        ),
        profile(
            SpeciesKind::Tomato,
            20.0,
            35.0,
            75.0,
            OptimalRange::new(18.0, 30.0),
            defaults_h,
            OptimalRange::new(50.0, 95.0),
            500.0,
        ),
        profile(
            SpeciesKind::Lettuce,
            25.0,
            40.0,
            80.0,
            OptimalRange::new(10.0, 24.0),
            defaults_h,
            OptimalRange::new(35.0, 75.0),
            300.0,
        ),
        profile(
            SpeciesKind::Herb,
            18.0,
            30.0,
            65.0,
            defaults_t,
            defaults_h,
            defaults_l,
            200.0,
        ),
        profile(
            SpeciesKind::Flower,
            20.0,
            35.0,
            70.0,
            defaults_t,
            defaults_h,
            defaults_l,
            250.0,
        ),
        profile(
            SpeciesKind::Tree,
            15.0,
            25.0,
            60.0,
            OptimalRange::new(5.0, 32.0),
            defaults_h,
            defaults_l,
            800.0,
        ),
        profile(
            SpeciesKind::Pepper,
            20.0,
            35.0,
            70.0,
            OptimalRange::new(18.0, 32.0),
            defaults_h,
            OptimalRange::new(50.0, 95.0),
            400.0,
        ),
        profile(
            SpeciesKind::Cucumber,
            22.0,
            40.0,
            75.0,
            OptimalRange::new(18.0, 30.0),
            OptimalRange::new(50.0, 85.0),
            OptimalRange::new(50.0, 90.0),
            600.0,
        ),
        profile(
            SpeciesKind::Other,
            15.0,
            30.0,
            70.0,
            defaults_t,
            defaults_h,
            defaults_l,
            350.0,
        ),
    ];

    entries.into_iter().map(|p| (p.kind, p)).collect()
});

/// Profile lookup; total over `SpeciesKind`.
pub fn species_profile(kind: SpeciesKind) -> &'static SpeciesProfile {
    PROFILES
        .get(&kind)
        .or_else(|| PROFILES.get(&SpeciesKind::Other))
        .expect("species profile table missing `other` entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_is_lax() {
        assert_eq!("Tomato".parse::<SpeciesKind>().unwrap(), SpeciesKind::Tomato);
        assert_eq!(
            "  CACTUS ".parse::<SpeciesKind>().unwrap(),
            SpeciesKind::Cactus
        );
        assert_eq!(
            "monstera".parse::<SpeciesKind>().unwrap(),
            SpeciesKind::Other
        );
    }

    #[test]
    fn every_species_has_a_profile() {
        for kind in [
            SpeciesKind::Succulent,
            SpeciesKind::Cactus,
            SpeciesKind::Fern,
            SpeciesKind::Tomato,
            SpeciesKind::Lettuce,
            SpeciesKind::Herb,
            SpeciesKind::Flower,
            SpeciesKind::Tree,
            SpeciesKind::Pepper,
            SpeciesKind::Cucumber,
            SpeciesKind::Other,
        ] {
            let profile = species_profile(kind);
            assert_eq!(profile.kind, kind);
            assert!(profile.thresholds.critical < profile.thresholds.dry);
            assert!(profile.thresholds.dry < profile.thresholds.wet);
            assert!(profile.baseline_ml_per_day > 0.0);
        }
    }

    #[test]
    fn season_from_month_follows_northern_hemisphere() {
        assert_eq!(Season::from_month(4), Season::Spring);
        assert_eq!(Season::from_month(7), Season::Summer);
        assert_eq!(Season::from_month(10), Season::Autumn);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(12), Season::Winter);
    }

    #[test]
    fn fall_is_an_alias_for_autumn() {
        assert_eq!("fall".parse::<Season>().unwrap(), Season::Autumn);
        assert!("monsoon".parse::<Season>().is_err());
    }
}
