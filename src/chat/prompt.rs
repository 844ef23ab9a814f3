//! System-prompt construction for the chat providers.

use std::fmt::Write as _;

use crate::care::SensorReading;
use crate::db::{PlantRecord, WateringEventRecord};

/// Scope-restricted advisor persona. Embedded plant context follows so every
/// provider (including those with a top-level system field) sees one string.
const SYSTEM_PREAMBLE: &str = "\
You are a plant-care advisor for a plant monitoring system.

Scope rules:
- Only answer questions about plants: care, watering, light, soil, \
fertilizer, pests, diseases, propagation, and the monitored sensor values.
- If a question is unrelated to plants, reply that you can only help with \
plant care and invite a plant question instead.
- Keep answers short and practical (under 200 words), grounded in the \
sensor context below when it is relevant.
- Prefer concrete, immediately applicable advice over generic tips.";

/// Compose the full system prompt: persona plus current plant context.
pub fn build_system_prompt(
    plant: &PlantRecord,
    latest: Option<&SensorReading>,
    waterings: &[WateringEventRecord],
) -> String {
    let mut prompt = String::from(SYSTEM_PREAMBLE);

    let _ = write!(
        prompt,
        "\n\nPlant context:\n- Name: {}\n- Species: {}",
        plant.name,
        plant.species_kind()
    );
    if let Some(location) = plant.location.as_deref() {
        let _ = write!(prompt, "\n- Location: {location}");
    }
    if let Some(notes) = plant.notes.as_deref() {
        let _ = write!(prompt, "\n- Notes: {notes}");
    }

    match latest {
        Some(reading) => {
            let _ = write!(
                prompt,
                "\n\nLatest sensor reading ({}):\n- Soil moisture: {:.1}%\n- Temperature: {:.1}\u{b0}C\n- Air humidity: {:.1}%\n- Light level: {:.1}%",
                reading.recorded_at.to_rfc3339(),
                reading.soil_moisture,
                reading.temperature,
                reading.humidity,
                reading.light_level,
            );
            if let Some(ph) = reading.soil_ph {
                let _ = write!(prompt, "\n- Soil pH: {ph:.1}");
            }
        }
        None => {
            prompt.push_str("\n\nNo sensor readings are available for this plant yet.");
        }
    }

    if !waterings.is_empty() {
        prompt.push_str("\n\nRecent watering events (newest first):");
        for event in waterings {
            let _ = write!(
                prompt,
                "\n- {}: {} ml ({})",
                event.occurred_at.format("%Y-%m-%d %H:%M"),
                event.amount_ml,
                event.method,
            );
        }
    }

    prompt
}
