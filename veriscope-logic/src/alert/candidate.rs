use chrono::NaiveDate;
use entity::{ports, signals};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::Severity;

/// One representative signal per cluster, selected by severity then confidence.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub cluster_id: String,
    pub cluster_severity: Severity,
    pub confidence_score: f64,
    pub confidence_band: String,
    pub day: NaiveDate,
    pub entity_type: String,
    pub entity_id: String,
    /// Human-readable name for `entity_id`: the port's `name` when
    /// `entity_type` is `PORT` and the port still exists, `entity_id` itself
    /// otherwise.
    pub entity_name: String,
    pub signal: signals::Model,
}

#[derive(Debug, Default, Clone)]
pub struct CandidateFilter {
    pub day: Option<NaiveDate>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub severity_min: Option<Severity>,
}

/// Returns one candidate per `cluster_id` matching `filter`. If `filter.day` is
/// absent, the latest day with any matching cluster is used. Ordered by
/// `cluster_severity desc, confidence_score desc, created_at desc`.
pub async fn select_candidates(
    db: &DatabaseConnection,
    filter: &CandidateFilter,
) -> anyhow::Result<Vec<Candidate>> {
    let mut query = signals::Entity::find();
    if let Some(entity_type) = &filter.entity_type {
        query = query.filter(signals::Column::EntityType.eq(entity_type.clone()));
    }
    if let Some(entity_id) = &filter.entity_id {
        query = query.filter(signals::Column::EntityId.eq(entity_id.clone()));
    }

    let day = match filter.day {
        Some(day) => Some(day),
        None => latest_matching_day(db, filter).await?,
    };
    let Some(day) = day else {
        return Ok(Vec::new());
    };
    query = query.filter(signals::Column::Day.eq(day));

    let rows = query
        .order_by(signals::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?;

    let mut by_cluster: HashMap<String, signals::Model> = HashMap::new();
    for row in rows {
        by_cluster
            .entry(row.cluster_id.clone())
            .and_modify(|current| {
                if is_better_representative(&row, current) {
                    *current = row.clone();
                }
            })
            .or_insert(row);
    }

    let rows: Vec<signals::Model> = by_cluster.into_values().collect();
    let port_names = port_names_for(db, rows.iter()).await?;

    let mut candidates: Vec<Candidate> = rows
        .into_iter()
        .filter_map(|row| to_candidate(row, &port_names))
        .filter(|c| match filter.severity_min {
            Some(min) => c.cluster_severity >= min,
            None => true,
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.cluster_severity
            .cmp(&a.cluster_severity)
            .then_with(|| b.confidence_score.partial_cmp(&a.confidence_score).unwrap_or(std::cmp::Ordering::Equal))
            .then_with(|| b.signal.created_at.cmp(&a.signal.created_at))
    });

    Ok(candidates)
}

/// Picks the higher-severity member of a cluster, tie-breaking by confidence desc
/// then `created_at` desc. `rows` are scanned newest-first so an equal
/// severity+confidence tie keeps the first (newest) row seen.
fn is_better_representative(candidate: &signals::Model, current: &signals::Model) -> bool {
    let candidate_severity: Severity = candidate.cluster_severity.parse().unwrap_or(Severity::Low);
    let current_severity: Severity = current.cluster_severity.parse().unwrap_or(Severity::Low);
    if candidate_severity != current_severity {
        return candidate_severity > current_severity;
    }
    candidate.confidence_score > current.confidence_score
}

fn to_candidate(row: signals::Model, port_names: &HashMap<Uuid, String>) -> Option<Candidate> {
    let cluster_severity: Severity = row.cluster_severity.parse().ok()?;
    let entity_name = resolve_entity_name(&row.entity_type, &row.entity_id, port_names);
    Some(Candidate {
        cluster_id: row.cluster_id.clone(),
        cluster_severity,
        confidence_score: row.confidence_score,
        confidence_band: row.confidence_band.clone(),
        day: row.day,
        entity_type: row.entity_type.clone(),
        entity_id: row.entity_id.clone(),
        entity_name,
        signal: row,
    })
}

/// Looks up every `PORT`-scoped `entity_id` among `rows` in one query.
async fn port_names_for<'a>(
    db: &DatabaseConnection,
    rows: impl Iterator<Item = &'a signals::Model>,
) -> anyhow::Result<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = rows
        .filter(|row| row.entity_type == "PORT")
        .filter_map(|row| Uuid::parse_str(&row.entity_id).ok())
        .collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let found = ports::Entity::find()
        .filter(ports::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(found.into_iter().map(|port| (port.id, port.name)).collect())
}

/// `entity_id` resolved to a human-readable name: the port's `name` for a
/// `PORT`-scoped signal whose port is still in `port_names`, `entity_id`
/// unchanged for every other scope (or a port that was since deleted).
fn resolve_entity_name(entity_type: &str, entity_id: &str, port_names: &HashMap<Uuid, String>) -> String {
    if entity_type == "PORT" {
        if let Ok(id) = Uuid::parse_str(entity_id) {
            if let Some(name) = port_names.get(&id) {
                return name.clone();
            }
        }
    }
    entity_id.to_string()
}

/// Looks up the current representative signal for a cluster, irrespective of day.
/// Used by the DLQ drainer to re-render a payload for a delivery queued earlier.
pub async fn find_by_cluster_id(db: &DatabaseConnection, cluster_id: &str) -> anyhow::Result<Option<Candidate>> {
    let rows = signals::Entity::find()
        .filter(signals::Column::ClusterId.eq(cluster_id.to_string()))
        .order_by(signals::Column::CreatedAt, Order::Desc)
        .all(db)
        .await?;
    let mut best: Option<signals::Model> = None;
    for row in rows {
        match &best {
            Some(current) if !is_better_representative(&row, current) => {}
            _ => best = Some(row),
        }
    }
    let Some(row) = best else {
        return Ok(None);
    };
    let port_names = port_names_for(db, std::iter::once(&row)).await?;
    Ok(to_candidate(row, &port_names))
}

async fn latest_matching_day(
    db: &DatabaseConnection,
    filter: &CandidateFilter,
) -> anyhow::Result<Option<NaiveDate>> {
    let mut query = signals::Entity::find();
    if let Some(entity_type) = &filter.entity_type {
        query = query.filter(signals::Column::EntityType.eq(entity_type.clone()));
    }
    if let Some(entity_id) = &filter.entity_id {
        query = query.filter(signals::Column::EntityId.eq(entity_id.clone()));
    }
    let latest = query
        .order_by(signals::Column::Day, Order::Desc)
        .one(db)
        .await?;
    Ok(latest.map(|row| row.day))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn signal_row(cluster_id: &str, cluster_severity: &str, confidence: f64, created_at_offset_secs: i64) -> signals::Model {
        signals::Model {
            id: Uuid::new_v4(),
            signal_type: "PORT_ARRIVALS_ANOMALY".to_string(),
            entity_type: "PORT".to_string(),
            entity_id: Uuid::new_v4().to_string(),
            day: Utc::now().date_naive(),
            severity: cluster_severity.to_string(),
            value: 0.0,
            baseline: 0.0,
            stddev: None,
            zscore: None,
            delta_pct: None,
            confidence_score: confidence,
            confidence_band: "HIGH".to_string(),
            method: "zscore_30d".to_string(),
            cluster_id: cluster_id.to_string(),
            cluster_key: cluster_id.to_string(),
            cluster_type: "PORT_DISRUPTION".to_string(),
            cluster_severity: cluster_severity.to_string(),
            cluster_summary: String::new(),
            explanation: String::new(),
            metadata: serde_json::json!({}),
            created_at: Utc::now() + chrono::Duration::seconds(created_at_offset_secs),
        }
    }

    #[test]
    fn picks_higher_severity_member_as_representative() {
        let low = signal_row("c1", "LOW", 0.9, 0);
        let high = signal_row("c1", "HIGH", 0.1, -10);
        assert!(is_better_representative(&high, &low));
        assert!(!is_better_representative(&low, &high));
    }

    #[test]
    fn ties_on_severity_break_by_confidence() {
        let a = signal_row("c1", "HIGH", 0.5, 0);
        let b = signal_row("c1", "HIGH", 0.9, 0);
        assert!(is_better_representative(&b, &a));
    }
}
