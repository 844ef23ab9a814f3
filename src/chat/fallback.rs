//! Rule-based chat replies for when the provider chain is exhausted.
//!
//! Keyword intent detection routes the message to the matching rule-engine
//! computation; the reply is deterministic given the stored sensor state.

use chrono::Datelike;
use std::fmt::Write as _;

use crate::care::{
    HealthStatus, Season, SensorReading, SpeciesKind, analyze_health, assess_watering,
};
use crate::db::PlantRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackIntent {
    Watering,
    Health,
    General,
}

const WATERING_KEYWORDS: &[&str] = &[
    "water", "watering", "irrigat", "thirst", "dry", "drought", "moisture",
];

const HEALTH_KEYWORDS: &[&str] = &[
    "health", "sick", "disease", "yellow", "wilt", "droop", "spots", "fungus", "pest", "dying",
];

/// Classify a user message by keyword. Watering wins ties: a message naming
/// both concerns ("yellow leaves, should I water?") gets the actionable
/// watering answer.
pub fn detect_intent(message: &str) -> FallbackIntent {
    let lower = message.to_ascii_lowercase();

    if WATERING_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FallbackIntent::Watering
    } else if HEALTH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        FallbackIntent::Health
    } else {
        FallbackIntent::General
    }
}

/// Compose a reply without an upstream model.
pub fn compose_fallback_reply(
    message: &str,
    plant: &PlantRecord,
    latest: Option<&SensorReading>,
) -> String {
    let species = plant.species_kind();

    let Some(reading) = latest else {
        return format!(
            "I don't have any sensor readings for {} yet, so I can only give \
             general advice. Check the top few centimeters of soil with a \
             finger: water when it feels dry, and make sure the pot drains. \
             Once readings arrive I can be more specific.",
            plant.name
        );
    };

    match detect_intent(message) {
        FallbackIntent::Watering => watering_reply(plant, reading, species),
        FallbackIntent::Health => health_reply(plant, reading, species),
        FallbackIntent::General => status_reply(plant, reading, species),
    }
}

fn watering_reply(plant: &PlantRecord, reading: &SensorReading, species: SpeciesKind) -> String {
    let season = Season::from_month(reading.recorded_at.month());
    let assessment = assess_watering(reading, species, plant.soil_kind(), Some(season));

    let mut reply = format!(
        "{}. Soil moisture for {} is currently {:.0}%.",
        assessment.recommendation, plant.name, reading.soil_moisture
    );
    if assessment.needs_watering {
        let _ = write!(
            reply,
            " Suggested amount: about {:.0} ml. Check again in {} hours.",
            assessment.volume_ml, assessment.next_check_hours
        );
    } else {
        let _ = write!(
            reply,
            " Check again in {} hours.",
            assessment.next_check_hours
        );
    }
    reply
}

fn health_reply(plant: &PlantRecord, reading: &SensorReading, species: SpeciesKind) -> String {
    let report = analyze_health(reading, species);

    let mut reply = format!(
        "{} scores {}/100 ({}) on the latest reading.",
        plant.name,
        report.score,
        status_word(report.status)
    );

    if report.issues.is_empty() {
        reply.push_str(" All monitored conditions look comfortable.");
    } else {
        reply.push_str(" Issues: ");
        reply.push_str(&report.issues.join("; "));
        reply.push_str(". Suggested actions: ");
        reply.push_str(&report.recommendations.join("; "));
        reply.push('.');
    }
    reply
}

fn status_reply(plant: &PlantRecord, reading: &SensorReading, species: SpeciesKind) -> String {
    let report = analyze_health(reading, species);

    format!(
        "I can help with plant care for {}. Current conditions: soil moisture \
         {:.0}%, temperature {:.0}\u{b0}C, humidity {:.0}%, light {:.0}%, \
         overall health {}/100 ({}). Ask me about watering, light, soil or \
         anything else plant-related.",
        plant.name,
        reading.soil_moisture,
        reading.temperature,
        reading.humidity,
        reading.light_level,
        report.score,
        status_word(report.status),
    )
}

fn status_word(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Excellent => "excellent",
        HealthStatus::Good => "good",
        HealthStatus::Fair => "fair",
        HealthStatus::Poor => "poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plant(species: &str) -> PlantRecord {
        PlantRecord {
            id: 1,
            name: "Balcony tomato".to_string(),
            species: species.to_string(),
            soil: None,
            location: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn reading(moisture: f64) -> SensorReading {
        SensorReading {
            soil_moisture: moisture,
            temperature: 24.0,
            humidity: 55.0,
            light_level: 60.0,
            soil_ph: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn intent_detection_routes_keywords() {
        assert_eq!(
            detect_intent("When should I water my fern?"),
            FallbackIntent::Watering
        );
        assert_eq!(
            detect_intent("The leaves are turning yellow"),
            FallbackIntent::Health
        );
        assert_eq!(detect_intent("Hello there"), FallbackIntent::General);
        // Watering wins when both concerns appear.
        assert_eq!(
            detect_intent("Leaves look sick, is the soil too dry?"),
            FallbackIntent::Watering
        );
    }

    #[test]
    fn watering_reply_includes_volume_when_dry() {
        let reply = compose_fallback_reply(
            "should I water it?",
            &plant("tomato"),
            Some(&reading(12.0)),
        );

        assert!(reply.contains("Water immediately"));
        assert!(reply.contains("ml"));
    }

    #[test]
    fn health_reply_summarizes_issues() {
        let reply = compose_fallback_reply(
            "is it healthy?",
            &plant("tomato"),
            Some(&reading(10.0)),
        );

        assert!(reply.contains("/100"));
        assert!(reply.contains("Severely dry soil"));
    }

    #[test]
    fn missing_reading_gets_general_advice() {
        let reply = compose_fallback_reply("should I water it?", &plant("fern"), None);
        assert!(reply.contains("don't have any sensor readings"));
    }
}
