use crate::db::models::{
    AlertCreate, AlertRecord, AssessmentRecord, ChatMessageCreate, ChatMessageRecord, PlantCreate,
    PlantRecord, ReadingCreate, SensorReadingRecord, WateringCreate, WateringEventRecord,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::VerdraError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Create a plant record and return its id.
    CreatePlant(PlantCreate, RpcReplyPort<Result<i64, VerdraError>>),

    /// Fetch a plant by id (None when absent).
    GetPlant(i64, RpcReplyPort<Result<Option<PlantRecord>, VerdraError>>),

    /// List all plants, oldest first.
    ListPlants(RpcReplyPort<Result<Vec<PlantRecord>, VerdraError>>),

    /// Store a sensor reading and return its id.
    InsertReading(i64, ReadingCreate, RpcReplyPort<Result<i64, VerdraError>>),

    /// Most recent reading for a plant.
    LatestReading(
        i64,
        RpcReplyPort<Result<Option<SensorReadingRecord>, VerdraError>>,
    ),

    /// Up to `limit` readings, newest first.
    RecentReadings(
        i64,
        i64,
        RpcReplyPort<Result<Vec<SensorReadingRecord>, VerdraError>>,
    ),

    /// Log a watering event and return its id.
    InsertWatering(i64, WateringCreate, RpcReplyPort<Result<i64, VerdraError>>),

    /// Up to `limit` watering events, newest first.
    RecentWaterings(
        i64,
        i64,
        RpcReplyPort<Result<Vec<WateringEventRecord>, VerdraError>>,
    ),

    /// Append a chat turn and return its id.
    AppendChatMessage(ChatMessageCreate, RpcReplyPort<Result<i64, VerdraError>>),

    /// Up to `limit` turns of a session, newest first.
    SessionHistory(
        String,
        i64,
        RpcReplyPort<Result<Vec<ChatMessageRecord>, VerdraError>>,
    ),

    /// Persist a rule-engine output (kind + JSON payload) and return its id.
    InsertAssessment(
        i64,
        String,
        String,
        RpcReplyPort<Result<i64, VerdraError>>,
    ),

    /// Assessment history for a plant, optionally filtered by kind, newest first.
    AssessmentHistory(
        i64,
        Option<String>,
        i64,
        RpcReplyPort<Result<Vec<AssessmentRecord>, VerdraError>>,
    ),

    /// Store a batch of alerts; returns how many were written.
    InsertAlerts(Vec<AlertCreate>, RpcReplyPort<Result<u64, VerdraError>>),

    /// Unacknowledged alerts for a plant, newest first.
    OpenAlerts(i64, RpcReplyPort<Result<Vec<AlertRecord>, VerdraError>>),

    /// Mark an alert acknowledged; false when the id does not exist.
    AcknowledgeAlert(i64, RpcReplyPort<Result<bool, VerdraError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

macro_rules! db_rpc {
    ($self:ident, $variant:ident $(, $arg:expr)*) => {
        ractor::call!($self.actor, DbActorMessage::$variant $(, $arg)*)
            .map_err(|e| VerdraError::RactorError(format!(
                "DbActor {} RPC failed: {e}", stringify!($variant)
            )))?
    };
}

impl DbActorHandle {
    pub async fn create_plant(&self, create: PlantCreate) -> Result<i64, VerdraError> {
        db_rpc!(self, CreatePlant, create)
    }

    pub async fn get_plant(&self, id: i64) -> Result<Option<PlantRecord>, VerdraError> {
        db_rpc!(self, GetPlant, id)
    }

    pub async fn list_plants(&self) -> Result<Vec<PlantRecord>, VerdraError> {
        db_rpc!(self, ListPlants)
    }

    pub async fn insert_reading(
        &self,
        plant_id: i64,
        create: ReadingCreate,
    ) -> Result<i64, VerdraError> {
        db_rpc!(self, InsertReading, plant_id, create)
    }

    pub async fn latest_reading(
        &self,
        plant_id: i64,
    ) -> Result<Option<SensorReadingRecord>, VerdraError> {
        db_rpc!(self, LatestReading, plant_id)
    }

    pub async fn recent_readings(
        &self,
        plant_id: i64,
        limit: i64,
    ) -> Result<Vec<SensorReadingRecord>, VerdraError> {
        db_rpc!(self, RecentReadings, plant_id, limit)
    }

    pub async fn insert_watering(
        &self,
        plant_id: i64,
        create: WateringCreate,
    ) -> Result<i64, VerdraError> {
        db_rpc!(self, InsertWatering, plant_id, create)
    }

    pub async fn recent_waterings(
        &self,
        plant_id: i64,
        limit: i64,
    ) -> Result<Vec<WateringEventRecord>, VerdraError> {
        db_rpc!(self, RecentWaterings, plant_id, limit)
    }

    pub async fn append_chat_message(
        &self,
        create: ChatMessageCreate,
    ) -> Result<i64, VerdraError> {
        db_rpc!(self, AppendChatMessage, create)
    }

    pub async fn session_history(
        &self,
        session_id: String,
        limit: i64,
    ) -> Result<Vec<ChatMessageRecord>, VerdraError> {
        db_rpc!(self, SessionHistory, session_id, limit)
    }

    pub async fn insert_assessment(
        &self,
        plant_id: i64,
        kind: String,
        payload: String,
    ) -> Result<i64, VerdraError> {
        db_rpc!(self, InsertAssessment, plant_id, kind, payload)
    }

    pub async fn assessment_history(
        &self,
        plant_id: i64,
        kind: Option<String>,
        limit: i64,
    ) -> Result<Vec<AssessmentRecord>, VerdraError> {
        db_rpc!(self, AssessmentHistory, plant_id, kind, limit)
    }

    pub async fn insert_alerts(&self, alerts: Vec<AlertCreate>) -> Result<u64, VerdraError> {
        db_rpc!(self, InsertAlerts, alerts)
    }

    pub async fn open_alerts(&self, plant_id: i64) -> Result<Vec<AlertRecord>, VerdraError> {
        db_rpc!(self, OpenAlerts, plant_id)
    }

    pub async fn acknowledge_alert(&self, alert_id: i64) -> Result<bool, VerdraError> {
        db_rpc!(self, AcknowledgeAlert, alert_id)
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        let pool = &state.pool;
        match message {
            DbActorMessage::CreatePlant(create, reply) => {
                let _ = reply.send(create_plant(pool, create).await);
            }
            DbActorMessage::GetPlant(id, reply) => {
                let _ = reply.send(get_plant(pool, id).await);
            }
            DbActorMessage::ListPlants(reply) => {
                let _ = reply.send(list_plants(pool).await);
            }
            DbActorMessage::InsertReading(plant_id, create, reply) => {
                let _ = reply.send(insert_reading(pool, plant_id, create).await);
            }
            DbActorMessage::LatestReading(plant_id, reply) => {
                let _ = reply.send(latest_reading(pool, plant_id).await);
            }
            DbActorMessage::RecentReadings(plant_id, limit, reply) => {
                let _ = reply.send(recent_readings(pool, plant_id, limit).await);
            }
            DbActorMessage::InsertWatering(plant_id, create, reply) => {
                let _ = reply.send(insert_watering(pool, plant_id, create).await);
            }
            DbActorMessage::RecentWaterings(plant_id, limit, reply) => {
                let _ = reply.send(recent_waterings(pool, plant_id, limit).await);
            }
            DbActorMessage::AppendChatMessage(create, reply) => {
                let _ = reply.send(append_chat_message(pool, create).await);
            }
            DbActorMessage::SessionHistory(session_id, limit, reply) => {
                let _ = reply.send(session_history(pool, &session_id, limit).await);
            }
            DbActorMessage::InsertAssessment(plant_id, kind, payload, reply) => {
                let _ = reply.send(insert_assessment(pool, plant_id, &kind, &payload).await);
            }
            DbActorMessage::AssessmentHistory(plant_id, kind, limit, reply) => {
                let _ = reply.send(assessment_history(pool, plant_id, kind.as_deref(), limit).await);
            }
            DbActorMessage::InsertAlerts(alerts, reply) => {
                let _ = reply.send(insert_alerts(pool, alerts).await);
            }
            DbActorMessage::OpenAlerts(plant_id, reply) => {
                let _ = reply.send(open_alerts(pool, plant_id).await);
            }
            DbActorMessage::AcknowledgeAlert(alert_id, reply) => {
                let _ = reply.send(acknowledge_alert(pool, alert_id).await);
            }
        }
        Ok(())
    }
}

async fn create_plant(pool: &SqlitePool, create: PlantCreate) -> Result<i64, VerdraError> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO plants (name, species, soil, location, notes, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(create.name)
    .bind(create.species)
    .bind(create.soil)
    .bind(create.location)
    .bind(create.notes)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn get_plant(pool: &SqlitePool, id: i64) -> Result<Option<PlantRecord>, VerdraError> {
    let row = sqlx::query_as::<_, PlantRecord>(
        r#"
    SELECT id, name, species, soil, location, notes, created_at, updated_at
    FROM plants
    WHERE id = ?
    "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn list_plants(pool: &SqlitePool) -> Result<Vec<PlantRecord>, VerdraError> {
    let rows = sqlx::query_as::<_, PlantRecord>(
        r#"
    SELECT id, name, species, soil, location, notes, created_at, updated_at
    FROM plants
    ORDER BY id
    "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn insert_reading(
    pool: &SqlitePool,
    plant_id: i64,
    create: ReadingCreate,
) -> Result<i64, VerdraError> {
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO sensor_readings (
        plant_id, soil_moisture, temperature, humidity, light_level, soil_ph, recorded_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(plant_id)
    .bind(create.soil_moisture)
    .bind(create.temperature)
    .bind(create.humidity)
    .bind(create.light_level)
    .bind(create.soil_ph)
    .bind(create.recorded_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn latest_reading(
    pool: &SqlitePool,
    plant_id: i64,
) -> Result<Option<SensorReadingRecord>, VerdraError> {
    let row = sqlx::query_as::<_, SensorReadingRecord>(
        r#"
    SELECT id, plant_id, soil_moisture, temperature, humidity, light_level, soil_ph, recorded_at
    FROM sensor_readings
    WHERE plant_id = ?
    ORDER BY recorded_at DESC, id DESC
    LIMIT 1
    "#,
    )
    .bind(plant_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

async fn recent_readings(
    pool: &SqlitePool,
    plant_id: i64,
    limit: i64,
) -> Result<Vec<SensorReadingRecord>, VerdraError> {
    let rows = sqlx::query_as::<_, SensorReadingRecord>(
        r#"
    SELECT id, plant_id, soil_moisture, temperature, humidity, light_level, soil_ph, recorded_at
    FROM sensor_readings
    WHERE plant_id = ?
    ORDER BY recorded_at DESC, id DESC
    LIMIT ?
    "#,
    )
    .bind(plant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn insert_watering(
    pool: &SqlitePool,
    plant_id: i64,
    create: WateringCreate,
) -> Result<i64, VerdraError> {
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO watering_events (plant_id, amount_ml, duration_secs, method, occurred_at)
    VALUES (?, ?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(plant_id)
    .bind(create.amount_ml)
    .bind(create.duration_secs)
    .bind(create.method)
    .bind(create.occurred_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn recent_waterings(
    pool: &SqlitePool,
    plant_id: i64,
    limit: i64,
) -> Result<Vec<WateringEventRecord>, VerdraError> {
    let rows = sqlx::query_as::<_, WateringEventRecord>(
        r#"
    SELECT id, plant_id, amount_ml, duration_secs, method, occurred_at
    FROM watering_events
    WHERE plant_id = ?
    ORDER BY occurred_at DESC, id DESC
    LIMIT ?
    "#,
    )
    .bind(plant_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn append_chat_message(
    pool: &SqlitePool,
    create: ChatMessageCreate,
) -> Result<i64, VerdraError> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO chat_messages (session_id, plant_id, role, content, source, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(create.session_id)
    .bind(create.plant_id)
    .bind(create.role)
    .bind(create.content)
    .bind(create.source)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn session_history(
    pool: &SqlitePool,
    session_id: &str,
    limit: i64,
) -> Result<Vec<ChatMessageRecord>, VerdraError> {
    let rows = sqlx::query_as::<_, ChatMessageRecord>(
        r#"
    SELECT id, session_id, plant_id, role, content, source, created_at
    FROM chat_messages
    WHERE session_id = ?
    ORDER BY id DESC
    LIMIT ?
    "#,
    )
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn insert_assessment(
    pool: &SqlitePool,
    plant_id: i64,
    kind: &str,
    payload: &str,
) -> Result<i64, VerdraError> {
    let now = Utc::now();
    let id: i64 = sqlx::query_scalar(
        r#"
    INSERT INTO assessments (plant_id, kind, payload, created_at)
    VALUES (?, ?, ?, ?)
    RETURNING id
    "#,
    )
    .bind(plant_id)
    .bind(kind)
    .bind(payload)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

async fn assessment_history(
    pool: &SqlitePool,
    plant_id: i64,
    kind: Option<&str>,
    limit: i64,
) -> Result<Vec<AssessmentRecord>, VerdraError> {
    let rows = match kind {
        Some(kind) => {
            sqlx::query_as::<_, AssessmentRecord>(
                r#"
            SELECT id, plant_id, kind, payload, created_at
            FROM assessments
            WHERE plant_id = ? AND kind = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
            )
            .bind(plant_id)
            .bind(kind)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, AssessmentRecord>(
                r#"
            SELECT id, plant_id, kind, payload, created_at
            FROM assessments
            WHERE plant_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
            )
            .bind(plant_id)
            .bind(limit)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows)
}

async fn insert_alerts(pool: &SqlitePool, alerts: Vec<AlertCreate>) -> Result<u64, VerdraError> {
    let now = Utc::now();
    let mut written = 0u64;
    for alert in alerts {
        let result = sqlx::query(
            r#"
        INSERT INTO alerts (plant_id, category, severity, title, message, acknowledged, created_at)
        VALUES (?, ?, ?, ?, ?, 0, ?)
        "#,
        )
        .bind(alert.plant_id)
        .bind(alert.category)
        .bind(alert.severity)
        .bind(alert.title)
        .bind(alert.message)
        .bind(now)
        .execute(pool)
        .await?;
        written += result.rows_affected();
    }
    Ok(written)
}

async fn open_alerts(pool: &SqlitePool, plant_id: i64) -> Result<Vec<AlertRecord>, VerdraError> {
    let rows = sqlx::query_as::<_, AlertRecord>(
        r#"
    SELECT id, plant_id, category, severity, title, message, acknowledged, created_at
    FROM alerts
    WHERE plant_id = ? AND acknowledged = 0
    ORDER BY created_at DESC, id DESC
    "#,
    )
    .bind(plant_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

async fn acknowledge_alert(pool: &SqlitePool, alert_id: i64) -> Result<bool, VerdraError> {
    let result = sqlx::query(
        r#"
    UPDATE alerts SET acknowledged = 1 WHERE id = ?
    "#,
    )
    .bind(alert_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(
        Some("DbActor".to_string()),
        DbActor,
        database_url.to_string(),
    )
    .await
    .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), VerdraError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
