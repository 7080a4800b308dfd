use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::metrics;
use crate::types::{ConfidenceBand, Severity};

use super::cluster;
use super::confidence;
use super::detectors::{self, Finding};
use super::explanation::{self, DataQuality};
use super::repository::{self, NewSignal};

/// Baseline rows need at least this many history days in `[D-30, D-1]` before a
/// port is evaluated for day `D`.
pub const MIN_HISTORY_DAYS: u32 = 10;

pub const ENTITY_TYPE_PORT: &str = "PORT";

/// Result of evaluating one day across every (filtered) port.
#[derive(Debug, Default)]
pub struct EvalSummary {
    pub ports_evaluated: u32,
    pub ports_skipped_insufficient_history: u32,
    pub signals_upserted: u32,
    pub clusters: u32,
}

/// Evaluates detectors for `day` across every port in `port_ids` (or all ports with
/// a baseline row that day if `None`), clusters co-triggering signals per port, and
/// upserts the resulting signal rows.
pub async fn evaluate_day(
    db: &DatabaseConnection,
    day: NaiveDate,
    port_ids: Option<&[Uuid]>,
) -> anyhow::Result<EvalSummary> {
    let timer = metrics::SIGNAL_EVAL_TIME.start_timer();
    let mut summary = EvalSummary::default();

    let baselines = repository::baselines_for_day(db, day, port_ids).await?;
    for row in &baselines {
        let history = repository::history_days(db, row.port_id, day).await?;
        if history < MIN_HISTORY_DAYS {
            summary.ports_skipped_insufficient_history += 1;
            continue;
        }
        summary.ports_evaluated += 1;

        let findings = detectors::detect_all(row);
        if findings.is_empty() {
            continue;
        }

        let completeness_pct = ((history as f64 / 30.0) * 100.0).round() as u32;
        let missing_points = 30u32.saturating_sub(history);
        let port_id = row.port_id.to_string();
        let day_str = day.to_string();
        let cluster = cluster::build(&port_id, &day_str, &findings);
        summary.clusters += 1;

        for finding in &findings {
            upsert_finding(
                db,
                &port_id,
                day,
                completeness_pct,
                missing_points,
                history,
                finding,
                &cluster,
            )
            .await?;
            summary.signals_upserted += 1;
            metrics::SIGNALS_EMITTED.inc();
        }
    }

    timer.observe_duration();
    Ok(summary)
}

#[allow(clippy::too_many_arguments)]
async fn upsert_finding(
    db: &DatabaseConnection,
    port_id: &str,
    day: NaiveDate,
    completeness_pct: u32,
    missing_points: u32,
    history_days_used: u32,
    finding: &Finding,
    cluster: &cluster::Cluster,
) -> anyhow::Result<()> {
    let raw_score = confidence::raw_confidence(finding);
    let raw_band = confidence::band_from_score(raw_score);
    let (score, band) = confidence::apply_completeness(raw_score, raw_band, completeness_pct);

    let data_quality = DataQuality {
        history_days_used,
        completeness_pct,
        missing_points,
    };
    let metadata = explanation::build_metadata(finding, data_quality);
    let explanation_text = explanation::build_explanation(finding, completeness_pct);

    repository::upsert_signal(
        db,
        NewSignal {
            signal_type: finding.signal_type,
            entity_type: ENTITY_TYPE_PORT,
            entity_id: port_id.to_string(),
            day,
            severity: finding.severity.as_str().to_string(),
            value: finding.value,
            baseline: finding.baseline,
            stddev: finding.stddev,
            zscore: finding.zscore,
            delta_pct: finding.delta_pct,
            confidence_score: score,
            confidence_band: band_str(band),
            method: finding.method.as_str().to_string(),
            cluster_id: cluster.cluster_id.clone(),
            cluster_key: cluster.cluster_key.clone(),
            cluster_type: cluster.cluster_type,
            cluster_severity: severity_str(cluster.cluster_severity),
            cluster_summary: cluster.cluster_summary.clone(),
            explanation: explanation_text,
            metadata: serde_json::to_value(&metadata)?,
        },
    )
    .await
}

fn band_str(band: ConfidenceBand) -> String {
    band.as_str().to_string()
}

fn severity_str(severity: Severity) -> String {
    severity.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::MIN_HISTORY_DAYS;

    #[test]
    fn minimum_history_guardrail_matches_spec() {
        assert_eq!(MIN_HISTORY_DAYS, 10);
    }
}
