//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `plants` (registered plants and their care context)
/// - `sensor_readings` (time series per plant)
/// - `watering_events` (manual/automatic watering log)
/// - `chat_messages` (chatbot turns keyed by session)
/// - `assessments` (persisted watering/health/warning results, JSON payload)
/// - `alerts` (early-warning alerts with acknowledge state)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Plants
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS plants (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    species TEXT NOT NULL DEFAULT 'other',
    soil TEXT NULL,
    location TEXT NULL,
    notes TEXT NULL,
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL  -- RFC3339
);

-- ---------------------------------------------------------------------------
-- Sensor readings (one row per measurement)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS sensor_readings (
    id INTEGER PRIMARY KEY NOT NULL,
    plant_id INTEGER NOT NULL,
    soil_moisture REAL NOT NULL,
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    light_level REAL NOT NULL,
    soil_ph REAL NULL,
    recorded_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_sensor_readings_plant_time
    ON sensor_readings(plant_id, recorded_at);

-- ---------------------------------------------------------------------------
-- Watering events
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS watering_events (
    id INTEGER PRIMARY KEY NOT NULL,
    plant_id INTEGER NOT NULL,
    amount_ml INTEGER NOT NULL,
    duration_secs INTEGER NULL,
    method TEXT NOT NULL DEFAULT 'manual',
    occurred_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_watering_events_plant
    ON watering_events(plant_id, occurred_at);

-- ---------------------------------------------------------------------------
-- Chat messages (user and assistant turns, keyed by session)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS chat_messages (
    id INTEGER PRIMARY KEY NOT NULL,
    session_id TEXT NOT NULL,
    plant_id INTEGER NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    source TEXT NULL, -- provider name or 'rule-based' for assistant turns
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_chat_messages_session
    ON chat_messages(session_id, id);

-- ---------------------------------------------------------------------------
-- Assessments (persisted rule-engine outputs)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS assessments (
    id INTEGER PRIMARY KEY NOT NULL,
    plant_id INTEGER NOT NULL,
    kind TEXT NOT NULL, -- 'watering' | 'health' | 'warning'
    payload TEXT NOT NULL, -- JSON
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_assessments_plant
    ON assessments(plant_id, kind, created_at);

-- ---------------------------------------------------------------------------
-- Alerts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY NOT NULL,
    plant_id INTEGER NOT NULL,
    category TEXT NOT NULL,
    severity TEXT NOT NULL,
    title TEXT NOT NULL,
    message TEXT NOT NULL,
    acknowledged INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_alerts_plant_open
    ON alerts(plant_id, acknowledged);
"#;
