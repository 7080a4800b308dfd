use serde_json::Value;

use crate::alert::Candidate;

/// `[Veriscope] {severity} {cluster_type} — {entity_name} — {day}`.
pub fn render_subject(candidate: &Candidate) -> String {
    format!(
        "[Veriscope] {} {} — {} — {}",
        candidate.cluster_severity, candidate.signal.cluster_type, candidate.entity_name, candidate.day
    )
}

/// Plain-text body: summary line, drivers, impact, followups, and an optional
/// dashboard link. The webhook payload carries the same metadata as
/// structured JSON; this renders the human-readable equivalent.
pub fn render_body(candidate: &Candidate, dashboard_link: Option<&str>) -> String {
    let metadata = &candidate.signal.metadata;
    let mut body = String::new();
    body.push_str(&candidate.signal.cluster_summary);
    body.push('\n');
    body.push_str(&format!(
        "Confidence: {} ({:.2})\n\n",
        candidate.confidence_band, candidate.confidence_score
    ));

    body.push_str("Drivers:\n");
    for line in json_lines(metadata, "drivers", "label") {
        body.push_str(&format!("  - {line}\n"));
    }

    body.push_str("\nImpact:\n");
    for line in string_array(metadata, "impact") {
        body.push_str(&format!("  - {line}\n"));
    }

    body.push_str("\nRecommended follow-ups:\n");
    for line in string_array(metadata, "recommended_followups") {
        body.push_str(&format!("  - {line}\n"));
    }

    if let Some(link) = dashboard_link {
        body.push_str(&format!("\nView in Veriscope: {link}\n"));
    }

    body
}

/// Transport is a stub: logs the rendered message instead of sending it. A real
/// SMTP/SES client plugs in here without touching `render_subject`/`render_body`.
pub async fn send_email(to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
    tracing::info!(to, subject, body_len = body.len(), "email delivery stub: would send");
    Ok(())
}

fn string_array(metadata: &Value, key: &str) -> Vec<String> {
    metadata
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

fn json_lines(metadata: &Value, key: &str, label_field: &str) -> Vec<String> {
    metadata
        .get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|item| item.get(label_field).and_then(|v| v.as_str()).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use entity::signals;
    use uuid::Uuid;

    fn sample_candidate() -> Candidate {
        let signal = signals::Model {
            id: Uuid::new_v4(),
            signal_type: "PORT_ARRIVALS_ANOMALY".to_string(),
            entity_type: "PORT".to_string(),
            entity_id: "port-123".to_string(),
            day: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            severity: "HIGH".to_string(),
            value: 25.0,
            baseline: 5.0,
            stddev: Some(1.0),
            zscore: Some(20.0),
            delta_pct: Some(400.0),
            confidence_score: 0.9,
            confidence_band: "HIGH".to_string(),
            method: "zscore_30d".to_string(),
            cluster_id: "PORT_DISRUPTION:port-123:2026-01-01".to_string(),
            cluster_key: "port-123:2026-01-01".to_string(),
            cluster_type: "PORT_DISRUPTION".to_string(),
            cluster_severity: "HIGH".to_string(),
            cluster_summary: "Arrivals +400.0% vs. baseline".to_string(),
            explanation: "explanation".to_string(),
            metadata: serde_json::json!({
                "drivers": [{"label": "Arrivals anomaly", "multiplier": 5.0}],
                "impact": ["Possible congestion buildup"],
                "recommended_followups": ["Check AIS coverage for gaps"],
                "data_quality": {"completeness": 1.0},
            }),
            created_at: chrono::Utc::now(),
        };
        Candidate {
            cluster_id: signal.cluster_id.clone(),
            cluster_severity: Severity::High,
            confidence_score: signal.confidence_score,
            confidence_band: signal.confidence_band.clone(),
            day: signal.day,
            entity_type: signal.entity_type.clone(),
            entity_id: signal.entity_id.clone(),
            entity_name: "Port of Rotterdam".to_string(),
            signal,
        }
    }

    #[test]
    fn subject_uses_the_resolved_entity_name_not_the_raw_id() {
        let candidate = sample_candidate();
        let subject = render_subject(&candidate);
        assert_eq!(subject, "[Veriscope] HIGH PORT_DISRUPTION — Port of Rotterdam — 2026-01-01");
    }

    #[test]
    fn body_includes_drivers_impact_and_followups() {
        let candidate = sample_candidate();
        let body = render_body(&candidate, Some("https://app.veriscope.example/clusters/1"));
        assert!(body.contains("Arrivals anomaly"));
        assert!(body.contains("Possible congestion buildup"));
        assert!(body.contains("Check AIS coverage for gaps"));
        assert!(body.contains("https://app.veriscope.example/clusters/1"));
    }

    #[test]
    fn body_omits_link_line_when_absent() {
        let candidate = sample_candidate();
        let body = render_body(&candidate, None);
        assert!(!body.contains("View in Veriscope"));
    }

    #[tokio::test]
    async fn send_email_stub_never_fails() {
        let candidate = sample_candidate();
        let subject = render_subject(&candidate);
        let body = render_body(&candidate, None);
        send_email("ops@example.com", &subject, &body).await.unwrap();
    }
}
