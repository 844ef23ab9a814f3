//! Multi-factor watering prediction.
//!
//! Species thresholds scaled by soil retention and season, compared against
//! the moisture reading, then nudged by an environmental factor built from
//! temperature, air humidity and light.

use serde::{Deserialize, Serialize};

use super::profiles::{MoistureThresholds, Season, SoilKind, SpeciesKind, species_profile};
use super::{SensorReading, round2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
    None,
}

impl Urgency {
    /// Hours until the next recommended moisture check.
    pub fn next_check_hours(self) -> u32 {
        match self {
            Urgency::Critical => 2,
            Urgency::High => 6,
            Urgency::Medium => 12,
            Urgency::Low => 24,
            Urgency::None => 48,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterDose {
    Heavy,
    Moderate,
    Normal,
    Light,
}

/// Outcome of a watering prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WateringAssessment {
    pub needs_watering: bool,
    /// Confidence in the verdict, 0.3-0.95 after adjustment.
    pub confidence: f64,
    pub urgency: Urgency,
    pub recommendation: String,
    pub dose: WaterDose,
    /// Suggested volume in ml, anchored to the species baseline.
    pub volume_ml: f64,
    pub next_check_hours: u32,
    pub environmental_factor: f64,
    /// Thresholds after soil/season scaling, for explainability.
    pub thresholds: MoistureThresholds,
    pub species: SpeciesKind,
}

/// Predict whether (and how much) to water given one reading.
///
/// Pure: same inputs, same assessment.
pub fn assess_watering(
    reading: &SensorReading,
    species: SpeciesKind,
    soil: Option<SoilKind>,
    season: Option<Season>,
) -> WateringAssessment {
    let profile = species_profile(species);
    let mut critical = profile.thresholds.critical;
    let mut dry = profile.thresholds.dry;
    let wet = profile.thresholds.wet;

    if let Some(soil) = soil {
        let factor = soil.retention_factor();
        critical *= factor;
        dry *= factor;
    }

    if let Some(season) = season {
        dry *= season.dry_factor();
    }

    let moisture = reading.soil_moisture;
    let (mut needs_watering, mut confidence, mut urgency, mut recommendation) =
        if moisture <= critical {
            (
                true,
                0.95,
                Urgency::Critical,
                "Water immediately - soil is critically dry".to_string(),
            )
        } else if moisture <= dry {
            (
                true,
                0.85,
                Urgency::High,
                "Water soon - soil is dry".to_string(),
            )
        } else if moisture <= dry + 15.0 {
            (
                true,
                0.65,
                Urgency::Medium,
                "Consider watering - soil is getting dry".to_string(),
            )
        } else if moisture >= wet {
            (
                false,
                0.9,
                Urgency::None,
                "Do not water - soil is too wet".to_string(),
            )
        } else if moisture <= wet - 10.0 {
            (
                false,
                0.7,
                Urgency::Low,
                "No watering needed - soil moisture is adequate".to_string(),
            )
        } else {
            (false, 0.5, Urgency::Low, "Monitor conditions".to_string())
        };

    let factor = environmental_factor(reading);

    if factor > 1.0 && !needs_watering && moisture < dry + 25.0 {
        // Borderline-adequate soil plus hot/dry/bright conditions.
        needs_watering = true;
        confidence = (confidence * factor).min(0.95);
        recommendation = "Water due to environmental conditions (hot/dry/bright)".to_string();
        urgency = if confidence > 0.8 {
            Urgency::High
        } else {
            Urgency::Medium
        };
    } else if factor < 1.0 && needs_watering && moisture > critical {
        confidence = (confidence * factor).max(0.3);
        if confidence < 0.6 {
            recommendation.push_str(" (reduce amount due to cool/humid/low-light conditions)");
        }
    }

    let dose = if moisture <= critical {
        WaterDose::Heavy
    } else if moisture <= dry {
        WaterDose::Moderate
    } else if factor > 1.2 {
        WaterDose::Moderate
    } else if factor < 0.8 {
        WaterDose::Light
    } else {
        WaterDose::Normal
    };

    WateringAssessment {
        needs_watering,
        confidence: round2(confidence),
        urgency,
        recommendation,
        dose,
        volume_ml: suggested_volume_ml(reading, profile.baseline_ml_per_day),
        next_check_hours: urgency.next_check_hours(),
        environmental_factor: round2(factor),
        thresholds: MoistureThresholds { critical, dry, wet },
        species,
    }
}

/// Accumulated temperature/humidity/light adjustment around 1.0.
fn environmental_factor(reading: &SensorReading) -> f64 {
    let mut factor = 1.0;

    if reading.temperature > 35.0 {
        factor += 0.3;
    } else if reading.temperature > 28.0 {
        factor += 0.2;
    } else if reading.temperature < 10.0 {
        factor -= 0.3;
    } else if reading.temperature < 15.0 {
        factor -= 0.1;
    }

    if reading.humidity < 30.0 {
        factor += 0.2;
    } else if reading.humidity < 45.0 {
        factor += 0.1;
    } else if reading.humidity > 80.0 {
        factor -= 0.2;
    } else if reading.humidity > 65.0 {
        factor -= 0.1;
    }

    if reading.light_level > 85.0 {
        factor += 0.15;
    } else if reading.light_level > 70.0 {
        factor += 0.1;
    } else if reading.light_level < 20.0 {
        factor -= 0.15;
    } else if reading.light_level < 40.0 {
        factor -= 0.1;
    }

    factor
}

/// Baseline scaled by current conditions, clamped to [0.5x, 2x] baseline.
fn suggested_volume_ml(reading: &SensorReading, baseline: f64) -> f64 {
    let mut amount = baseline;

    if reading.temperature > 30.0 {
        amount *= 1.2;
    } else if reading.temperature < 15.0 {
        amount *= 0.8;
    }
    if reading.humidity < 40.0 {
        amount *= 1.1;
    }
    if reading.soil_moisture < 20.0 {
        amount *= 1.3;
    }

    amount.clamp(baseline * 0.5, baseline * 2.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reading(moisture: f64, temperature: f64, humidity: f64, light: f64) -> SensorReading {
        SensorReading {
            soil_moisture: moisture,
            temperature,
            humidity,
            light_level: light,
            soil_ph: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn critically_dry_soil_waters_immediately() {
        let out = assess_watering(&reading(10.0, 25.0, 55.0, 50.0), SpeciesKind::Other, None, None);

        assert!(out.needs_watering);
        assert_eq!(out.urgency, Urgency::Critical);
        assert_eq!(out.dose, WaterDose::Heavy);
        assert_eq!(out.confidence, 0.95);
        assert_eq!(out.next_check_hours, 2);
    }

    #[test]
    fn saturated_soil_never_waters() {
        // Even under hot, dry, bright conditions.
        let out = assess_watering(&reading(85.0, 38.0, 20.0, 95.0), SpeciesKind::Other, None, None);

        assert!(!out.needs_watering);
        assert_eq!(out.urgency, Urgency::None);
        assert_eq!(out.next_check_hours, 48);
    }

    #[test]
    fn hot_dry_bright_conditions_escalate_borderline_soil() {
        // 50% moisture for `other` sits above the dry+15 band (45) but inside
        // the dry+25 escalation window.
        let reading = reading(50.0, 36.0, 25.0, 90.0);
        let out = assess_watering(&reading, SpeciesKind::Other, None, None);

        assert!(out.needs_watering);
        assert!(out.environmental_factor > 1.2);
        assert_eq!(out.dose, WaterDose::Moderate);
        assert!(out.recommendation.contains("environmental conditions"));
    }

    #[test]
    fn cool_humid_conditions_damp_confidence() {
        // Dry-band moisture but cold, humid, dark: confidence drops and the
        // advice notes a reduced dose.
        let out = assess_watering(&reading(25.0, 8.0, 85.0, 10.0), SpeciesKind::Other, None, None);

        assert!(out.needs_watering);
        assert!(out.confidence < 0.6);
        assert!(out.confidence >= 0.3);
        assert!(out.recommendation.contains("reduce amount"));
    }

    #[test]
    fn soil_and_season_scale_thresholds() {
        let base = assess_watering(&reading(50.0, 22.0, 55.0, 50.0), SpeciesKind::Fern, None, None);
        let scaled = assess_watering(
            &reading(50.0, 22.0, 55.0, 50.0),
            SpeciesKind::Fern,
            Some(SoilKind::Clay),
            Some(Season::Summer),
        );

        assert!(scaled.thresholds.critical > base.thresholds.critical);
        assert!(scaled.thresholds.dry > base.thresholds.dry);
        // Fern dry 45 * 1.2 * 1.3 = 70.2: a 50% reading is now "dry".
        assert!(scaled.needs_watering);
        assert_eq!(scaled.urgency, Urgency::High);
    }

    #[test]
    fn species_thresholds_differ() {
        let r = reading(32.0, 22.0, 55.0, 50.0);
        let cactus = assess_watering(&r, SpeciesKind::Cactus, None, None);
        let fern = assess_watering(&r, SpeciesKind::Fern, None, None);

        // 32% moisture is fine for a cactus and dry for a fern.
        assert!(!cactus.needs_watering);
        assert!(fern.needs_watering);
        assert_eq!(fern.urgency, Urgency::High);
    }

    #[test]
    fn volume_stays_within_baseline_clamp() {
        let profile = super::super::profiles::species_profile(SpeciesKind::Tomato);
        let baseline = profile.baseline_ml_per_day;

        let extreme = assess_watering(&reading(5.0, 40.0, 10.0, 95.0), SpeciesKind::Tomato, None, None);
        assert!(extreme.volume_ml <= baseline * 2.0);

        let mild = assess_watering(&reading(60.0, 10.0, 70.0, 50.0), SpeciesKind::Tomato, None, None);
        assert!(mild.volume_ml >= baseline * 0.5);
    }

    #[test]
    fn assessment_is_deterministic() {
        let r = reading(33.3, 27.1, 48.0, 66.0);
        let a = assess_watering(&r, SpeciesKind::Herb, Some(SoilKind::Loam), Some(Season::Spring));
        let b = assess_watering(&r, SpeciesKind::Herb, Some(SoilKind::Loam), Some(Season::Spring));
        assert_eq!(a, b);
    }
}
