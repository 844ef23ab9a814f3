//! Rule-based plant health scoring.

use serde::{Deserialize, Serialize};

use super::SensorReading;
use super::profiles::SpeciesKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl HealthStatus {
    fn from_score(score: i32) -> Self {
        if score < 50 {
            HealthStatus::Poor
        } else if score < 70 {
            HealthStatus::Fair
        } else if score < 85 {
            HealthStatus::Good
        } else {
            HealthStatus::Excellent
        }
    }
}

/// Where a metric sits relative to its comfortable band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricBand {
    Low,
    Optimal,
    High,
}

impl MetricBand {
    fn classify(value: f64, low: f64, high: f64) -> Self {
        if value < low {
            MetricBand::Low
        } else if value > high {
            MetricBand::High
        } else {
            MetricBand::Optimal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricBands {
    pub moisture: MetricBand,
    pub temperature: MetricBand,
    pub humidity: MetricBand,
    pub light: MetricBand,
}

/// Outcome of a health analysis: a 0-100 score plus the deductions behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub score: u32,
    pub status: HealthStatus,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub metrics: MetricBands,
    pub species: SpeciesKind,
}

/// Score a single reading. Starts at 100 and deducts per stressed metric.
pub fn analyze_health(reading: &SensorReading, species: SpeciesKind) -> HealthReport {
    let mut score: i32 = 100;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let mut deduct = |points: i32, issue: &str, recommendation: &str| {
        score -= points;
        issues.push(issue.to_string());
        recommendations.push(recommendation.to_string());
    };

    if reading.soil_moisture < 20.0 {
        deduct(30, "Severely dry soil", "Water immediately");
    } else if reading.soil_moisture < 35.0 {
        deduct(15, "Dry soil", "Water soon");
    } else if reading.soil_moisture > 80.0 {
        deduct(20, "Overwatered soil", "Reduce watering frequency");
    }

    if reading.temperature > 35.0 {
        deduct(
            15,
            "High temperature stress",
            "Provide shade or move to a cooler location",
        );
    } else if reading.temperature < 10.0 {
        deduct(
            20,
            "Cold stress",
            "Move to a warmer location or provide protection",
        );
    }

    if reading.humidity < 30.0 {
        deduct(10, "Low humidity", "Increase humidity around the plant");
    } else if reading.humidity > 85.0 {
        deduct(
            10,
            "High humidity - risk of fungal issues",
            "Improve air circulation",
        );
    }

    if reading.light_level < 20.0 {
        deduct(
            15,
            "Insufficient light",
            "Move to a brighter location or add grow lights",
        );
    } else if reading.light_level > 90.0 {
        deduct(
            10,
            "Excessive light exposure",
            "Provide some shade during peak hours",
        );
    }

    let score = score.max(0);

    HealthReport {
        score: score as u32,
        status: HealthStatus::from_score(score),
        issues,
        recommendations,
        metrics: MetricBands {
            moisture: MetricBand::classify(reading.soil_moisture, 35.0, 70.0),
            temperature: MetricBand::classify(reading.temperature, 15.0, 30.0),
            humidity: MetricBand::classify(reading.humidity, 40.0, 75.0),
            light: MetricBand::classify(reading.light_level, 30.0, 80.0),
        },
        species,
    }
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
    fn comfortable_conditions_score_excellent() {
        let report = analyze_health(&reading(55.0, 24.0, 60.0, 55.0), SpeciesKind::Herb);

        assert_eq!(report.score, 100);
        assert_eq!(report.status, HealthStatus::Excellent);
        assert!(report.issues.is_empty());
        assert_eq!(report.metrics.moisture, MetricBand::Optimal);
    }

    #[test]
    fn stacked_stress_drops_to_poor() {
        // Severely dry + cold + dark: 100 - 30 - 20 - 15 = 35.
        let report = analyze_health(&reading(10.0, 5.0, 50.0, 10.0), SpeciesKind::Tomato);

        assert_eq!(report.score, 35);
        assert_eq!(report.status, HealthStatus::Poor);
        assert_eq!(report.issues.len(), 3);
        assert_eq!(report.issues.len(), report.recommendations.len());
    }

    #[test]
    fn worst_case_deductions_accumulate() {
        // Severely dry + cold + dry air + dark is the deepest combined cut:
        // 100 - 30 - 20 - 10 - 15 = 25.
        let worst = analyze_health(&reading(5.0, 5.0, 10.0, 5.0), SpeciesKind::Other);

        assert_eq!(worst.score, 25);
        assert_eq!(worst.status, HealthStatus::Poor);
        assert_eq!(worst.issues.len(), 4);
    }

    #[test]
    fn metric_bands_follow_fixed_cutoffs() {
        let report = analyze_health(&reading(25.0, 32.0, 78.0, 85.0), SpeciesKind::Flower);

        assert_eq!(report.metrics.moisture, MetricBand::Low);
        assert_eq!(report.metrics.temperature, MetricBand::High);
        assert_eq!(report.metrics.humidity, MetricBand::High);
        assert_eq!(report.metrics.light, MetricBand::High);
    }
}
