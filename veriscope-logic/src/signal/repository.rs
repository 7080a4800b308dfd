use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use entity::{port_daily_baselines, signals};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

const TRAILING_WINDOW_DAYS: i64 = 30;

/// Baseline rows for `day`, optionally restricted to `port_ids`.
pub async fn baselines_for_day(
    db: &DatabaseConnection,
    day: NaiveDate,
    port_ids: Option<&[Uuid]>,
) -> anyhow::Result<Vec<port_daily_baselines::Model>> {
    let mut query = port_daily_baselines::Entity::find().filter(port_daily_baselines::Column::Day.eq(day));
    if let Some(ids) = port_ids {
        query = query.filter(port_daily_baselines::Column::PortId.is_in(ids.to_vec()));
    }
    Ok(query.all(db).await?)
}

/// Count of baseline rows present in `[day-30, day-1]`, used for the
/// `MIN_HISTORY_DAYS` guardrail and the completeness percentage.
pub async fn history_days(db: &DatabaseConnection, port_id: Uuid, day: NaiveDate) -> anyhow::Result<u32> {
    let window_start = day - ChronoDuration::days(TRAILING_WINDOW_DAYS);
    let count = port_daily_baselines::Entity::find()
        .filter(port_daily_baselines::Column::PortId.eq(port_id))
        .filter(port_daily_baselines::Column::Day.gte(window_start))
        .filter(port_daily_baselines::Column::Day.lt(day))
        .count(db)
        .await?;
    Ok(count as u32)
}

#[allow(clippy::too_many_arguments)]
pub struct NewSignal {
    pub signal_type: &'static str,
    pub entity_type: &'static str,
    pub entity_id: String,
    pub day: NaiveDate,
    pub severity: String,
    pub value: f64,
    pub baseline: f64,
    pub stddev: Option<f64>,
    pub zscore: Option<f64>,
    pub delta_pct: f64,
    pub confidence_score: f64,
    pub confidence_band: String,
    pub method: String,
    pub cluster_id: String,
    pub cluster_key: String,
    pub cluster_type: &'static str,
    pub cluster_severity: String,
    pub cluster_summary: String,
    pub explanation: String,
    pub metadata: serde_json::Value,
}

/// Upserts one signal row on the `(signal_type, entity_type, entity_id, day)` unique
/// key. Re-running with identical inputs yields zero net-new rows and bit-identical
/// columns except `created_at`.
pub async fn upsert_signal(db: &DatabaseConnection, signal: NewSignal) -> anyhow::Result<()> {
    let model = signals::ActiveModel {
        id: Set(Uuid::new_v4()),
        signal_type: Set(signal.signal_type.to_string()),
        entity_type: Set(signal.entity_type.to_string()),
        entity_id: Set(signal.entity_id),
        day: Set(signal.day),
        severity: Set(signal.severity),
        value: Set(signal.value),
        baseline: Set(signal.baseline),
        stddev: Set(signal.stddev),
        zscore: Set(signal.zscore),
        delta_pct: Set(Some(signal.delta_pct)),
        confidence_score: Set(signal.confidence_score),
        confidence_band: Set(signal.confidence_band),
        method: Set(signal.method),
        cluster_id: Set(signal.cluster_id),
        cluster_key: Set(signal.cluster_key),
        cluster_type: Set(signal.cluster_type.to_string()),
        cluster_severity: Set(signal.cluster_severity),
        cluster_summary: Set(signal.cluster_summary),
        explanation: Set(signal.explanation),
        metadata: Set(signal.metadata),
        created_at: Set(Utc::now()),
    };

    signals::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                signals::Column::SignalType,
                signals::Column::EntityType,
                signals::Column::EntityId,
                signals::Column::Day,
            ])
            .update_columns([
                signals::Column::Severity,
                signals::Column::Value,
                signals::Column::Baseline,
                signals::Column::Stddev,
                signals::Column::Zscore,
                signals::Column::DeltaPct,
                signals::Column::ConfidenceScore,
                signals::Column::ConfidenceBand,
                signals::Column::Method,
                signals::Column::ClusterId,
                signals::Column::ClusterKey,
                signals::Column::ClusterType,
                signals::Column::ClusterSeverity,
                signals::Column::ClusterSummary,
                signals::Column::Explanation,
                signals::Column::Metadata,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}
