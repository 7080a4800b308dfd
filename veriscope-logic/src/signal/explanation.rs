use serde::Serialize;

use super::detectors::Finding;

/// One metric behind a signal. `zscore`/`multiplier` are mutually exclusive,
/// matching whichever method produced the finding.
#[derive(Debug, Clone, Serialize)]
pub struct Driver {
    pub metric: &'static str,
    pub value: f64,
    pub baseline: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stddev: Option<f64>,
    pub delta_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zscore: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataQuality {
    pub history_days_used: u32,
    pub completeness_pct: u32,
    pub missing_points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalMetadata {
    pub drivers: Vec<Driver>,
    pub data_quality: DataQuality,
    pub impact: Vec<&'static str>,
    pub recommended_followups: Vec<&'static str>,
}

/// Builds `metadata` for one signal row: its own driver plus the shared data-quality
/// block for the (port, day) being evaluated.
pub fn build_metadata(finding: &Finding, data_quality: DataQuality) -> SignalMetadata {
    SignalMetadata {
        drivers: vec![Driver {
            metric: finding.signal_type,
            value: finding.value,
            baseline: finding.baseline,
            stddev: finding.stddev,
            delta_pct: finding.delta_pct,
            zscore: finding.zscore,
            multiplier: finding.multiplier,
        }],
        data_quality,
        impact: impact_lines(finding.signal_type),
        recommended_followups: followup_lines(finding.signal_type),
    }
}

/// Deterministic human-readable explanation: a metric detail line, a rationale
/// line, a fixed impact line, and a fixed followups list.
pub fn build_explanation(finding: &Finding, completeness_pct: u32) -> String {
    let detail = metric_detail(finding);
    let rationale = rationale_line(finding, completeness_pct);
    let impact = impact_lines(finding.signal_type).join(" ");
    let followups = followup_lines(finding.signal_type).join("; ");
    format!("{detail} {rationale} {impact} Recommended follow-ups: {followups}.")
}

fn metric_detail(finding: &Finding) -> String {
    match finding.zscore {
        Some(z) => format!(
            "{} is {:.2} ({:+.1}% vs a 30-day baseline of {:.2}, z={:.2}).",
            driver_name(finding.signal_type),
            finding.value,
            finding.delta_pct,
            finding.baseline,
            z
        ),
        None => format!(
            "{} is {:.2} ({:+.1}% vs a 30-day baseline of {:.2}, {:.2}x baseline).",
            driver_name(finding.signal_type),
            finding.value,
            finding.delta_pct,
            finding.baseline,
            finding.multiplier.unwrap_or(1.0)
        ),
    }
}

fn rationale_line(finding: &Finding, completeness_pct: u32) -> String {
    format!(
        "Severity {} was assigned from {} baseline history ({completeness_pct}% complete).",
        finding.severity, finding.method
    )
}

fn driver_name(signal_type: &str) -> &'static str {
    match signal_type {
        "PORT_ARRIVALS_ANOMALY" => "Daily arrivals",
        "PORT_DWELL_SPIKE" => "Average dwell time",
        "PORT_CONGESTION_BUILDUP" => "Open call count",
        _ => "This metric",
    }
}

fn impact_lines(signal_type: &str) -> Vec<&'static str> {
    match signal_type {
        "PORT_ARRIVALS_ANOMALY" => {
            vec!["Unusual arrival volume can strain berth allocation and pilotage scheduling."]
        }
        "PORT_DWELL_SPIKE" => {
            vec!["Extended dwell times reduce effective berth throughput for following vessels."]
        }
        "PORT_CONGESTION_BUILDUP" => {
            vec!["Sustained open-call growth is a leading indicator of anchorage queuing."]
        }
        _ => vec!["This condition may affect normal port operations."],
    }
}

fn followup_lines(signal_type: &str) -> Vec<&'static str> {
    match signal_type {
        "PORT_ARRIVALS_ANOMALY" => vec![
            "Confirm the spike against scheduled vessel ETAs",
            "Check for upstream weather or canal delays funneling traffic",
        ],
        "PORT_DWELL_SPIKE" => vec![
            "Review berth occupancy and cargo-handling throughput",
            "Check for customs or documentation holds affecting departures",
        ],
        "PORT_CONGESTION_BUILDUP" => vec![
            "Cross-check anchorage occupancy for queuing vessels",
            "Escalate to port operations if the trend continues past 48h",
        ],
        _ => vec!["Review the underlying baseline for context"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DetectorKind, Severity};

    fn finding() -> Finding {
        Finding {
            signal_type: "PORT_ARRIVALS_ANOMALY",
            value: 25.0,
            baseline: 5.0,
            stddev: Some(1.0),
            zscore: Some(20.0),
            multiplier: None,
            delta_pct: 400.0,
            severity: Severity::Critical,
            method: DetectorKind::ZScore30d,
        }
    }

    #[test]
    fn explanation_mentions_severity_and_zscore() {
        let text = build_explanation(&finding(), 100);
        assert!(text.contains("CRITICAL"));
        assert!(text.contains("z=20.00"));
    }

    #[test]
    fn metadata_driver_carries_the_finding_values() {
        let dq = DataQuality {
            history_days_used: 30,
            completeness_pct: 100,
            missing_points: 0,
        };
        let metadata = build_metadata(&finding(), dq);
        assert_eq!(metadata.drivers.len(), 1);
        assert_eq!(metadata.drivers[0].zscore, Some(20.0));
        assert!(metadata.drivers[0].multiplier.is_none());
    }
}
