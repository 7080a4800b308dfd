use crate::types::Severity;

use super::detectors::Finding;

/// All detectors firing for the same `(port, day)` share one cluster.
/// Today the only producer is `PORT_DISRUPTION`; left open for future variants.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub cluster_id: String,
    pub cluster_key: String,
    pub cluster_type: &'static str,
    pub cluster_severity: Severity,
    pub cluster_summary: String,
}

/// Builds the shared cluster envelope for every finding on `(port_id, day)`.
///
/// `findings` must be non-empty; `cluster_severity` is the max severity among
/// members and `cluster_summary` joins each member's signed delta, e.g.
/// `"Arrivals +40.0%, Dwell +20.3%"`.
pub fn build(port_id: &str, day: &str, findings: &[Finding]) -> Cluster {
    let cluster_severity = findings
        .iter()
        .map(|f| f.severity)
        .max()
        .expect("build is only called with at least one finding");

    let cluster_summary = findings
        .iter()
        .map(|f| format!("{} {:+.1}%", driver_label(f.signal_type), f.delta_pct))
        .collect::<Vec<_>>()
        .join(", ");

    Cluster {
        cluster_id: format!("PORT_DISRUPTION:{port_id}:{day}"),
        cluster_key: format!("{port_id}:{day}"),
        cluster_type: "PORT_DISRUPTION",
        cluster_severity,
        cluster_summary,
    }
}

fn driver_label(signal_type: &str) -> &'static str {
    match signal_type {
        "PORT_ARRIVALS_ANOMALY" => "Arrivals",
        "PORT_DWELL_SPIKE" => "Dwell",
        "PORT_CONGESTION_BUILDUP" => "Congestion",
        _ => "Metric",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectorKind;

    fn finding(signal_type: &'static str, delta_pct: f64, severity: Severity) -> Finding {
        Finding {
            signal_type,
            value: 0.0,
            baseline: 0.0,
            stddev: None,
            zscore: None,
            multiplier: None,
            delta_pct,
            severity,
            method: DetectorKind::ZScore30d,
        }
    }

    #[test]
    fn cluster_id_matches_spec_format() {
        let findings = vec![finding("PORT_ARRIVALS_ANOMALY", 40.0, Severity::High)];
        let cluster = build("port-1", "2026-01-01", &findings);
        assert_eq!(cluster.cluster_id, "PORT_DISRUPTION:port-1:2026-01-01");
        assert_eq!(cluster.cluster_type, "PORT_DISRUPTION");
    }

    #[test]
    fn severity_is_the_max_among_members() {
        let findings = vec![
            finding("PORT_ARRIVALS_ANOMALY", 40.0, Severity::Medium),
            finding("PORT_DWELL_SPIKE", 20.3, Severity::Critical),
        ];
        let cluster = build("port-1", "2026-01-01", &findings);
        assert_eq!(cluster.cluster_severity, Severity::Critical);
    }

    #[test]
    fn summary_comma_joins_signed_deltas_in_finding_order() {
        let findings = vec![
            finding("PORT_ARRIVALS_ANOMALY", 40.0, Severity::High),
            finding("PORT_DWELL_SPIKE", 20.3, Severity::Medium),
        ];
        let cluster = build("port-1", "2026-01-01", &findings);
        assert_eq!(cluster.cluster_summary, "Arrivals +40.0%, Dwell +20.3%");
    }
}
