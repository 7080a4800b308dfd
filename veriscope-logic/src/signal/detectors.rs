use entity::port_daily_baselines::Model as BaselineRow;

use crate::types::{DetectorKind, Severity};

/// One detector's verdict against a single `(port, day)` baseline row.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub signal_type: &'static str,
    pub value: f64,
    pub baseline: f64,
    pub stddev: Option<f64>,
    pub zscore: Option<f64>,
    pub multiplier: Option<f64>,
    pub delta_pct: f64,
    pub severity: Severity,
    pub method: DetectorKind,
}

/// Runs every detector against one baseline row.
pub fn detect_all(row: &BaselineRow) -> Vec<Finding> {
    [
        detect_arrivals_anomaly(row),
        detect_dwell_spike(row),
        detect_congestion_buildup(row),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn detect_arrivals_anomaly(row: &BaselineRow) -> Option<Finding> {
    let avg = row.arrivals_30d_avg?;
    let std = row.arrivals_30d_std?;
    if std <= 0.0 {
        return None;
    }
    let value = row.arrivals as f64;
    let z = (value - avg) / std;
    if z.abs() < 2.0 {
        return None;
    }
    Some(Finding {
        signal_type: "PORT_ARRIVALS_ANOMALY",
        value,
        baseline: avg,
        stddev: Some(std),
        zscore: Some(z),
        multiplier: None,
        delta_pct: delta_pct(value, avg),
        severity: severity_from_zscore(z.abs()),
        method: DetectorKind::ZScore30d,
    })
}

fn detect_dwell_spike(row: &BaselineRow) -> Option<Finding> {
    let value = row.avg_dwell_hours?;
    let avg = row.dwell_30d_avg?;
    let std = row.dwell_30d_std?;
    if std <= 0.0 {
        return None;
    }
    // positive-only: a shorter-than-usual dwell is not a spike
    let z = (value - avg) / std;
    if z < 2.0 {
        return None;
    }
    Some(Finding {
        signal_type: "PORT_DWELL_SPIKE",
        value,
        baseline: avg,
        stddev: Some(std),
        zscore: Some(z),
        multiplier: None,
        delta_pct: delta_pct(value, avg),
        severity: severity_from_zscore(z),
        method: DetectorKind::ZScore30d,
    })
}

fn detect_congestion_buildup(row: &BaselineRow) -> Option<Finding> {
    let avg = row.open_calls_30d_avg?;
    if avg < 5.0 {
        return None;
    }
    let value = row.open_calls as f64;
    let multiplier = value / avg;
    if multiplier < 1.5 {
        return None;
    }
    Some(Finding {
        signal_type: "PORT_CONGESTION_BUILDUP",
        value,
        baseline: avg,
        stddev: None,
        zscore: None,
        multiplier: Some(multiplier),
        delta_pct: delta_pct(value, avg),
        severity: severity_from_multiplier(multiplier),
        method: DetectorKind::Multiplier30d,
    })
}

/// Percent change of `value` over `baseline`. A zero baseline makes the
/// ratio undefined (not infinite-in-practice), so it reports flat.
fn delta_pct(value: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (value - baseline) / baseline * 100.0
}

fn severity_from_zscore(abs_z: f64) -> Severity {
    if abs_z >= 5.0 {
        Severity::Critical
    } else if abs_z >= 3.0 {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn severity_from_multiplier(m: f64) -> Severity {
    if m >= 4.0 {
        Severity::Critical
    } else if m >= 2.0 {
        Severity::High
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn row(arrivals: i32, avg: f64, std: f64) -> BaselineRow {
        BaselineRow {
            port_id: Uuid::new_v4(),
            day: Utc::now().date_naive(),
            arrivals,
            departures: 0,
            unique_vessels: 0,
            avg_dwell_hours: None,
            open_calls: 0,
            arrivals_30d_avg: Some(avg),
            arrivals_30d_std: Some(std),
            dwell_30d_avg: None,
            dwell_30d_std: None,
            open_calls_30d_avg: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn seed_scenario_s1_arrivals_spike_is_critical() {
        let r = row(25, 5.0, 1.0);
        let findings = detect_all(&r);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.signal_type, "PORT_ARRIVALS_ANOMALY");
        assert_eq!(f.zscore, Some(20.0));
        assert_eq!(f.severity, Severity::Critical);
        assert!((f.delta_pct - 400.0).abs() < 1e-9);
    }

    #[test]
    fn arrivals_anomaly_fires_against_a_zero_average() {
        let r = row(4, 0.0, 0.5);
        let findings = detect_all(&r);
        let arrivals = findings
            .iter()
            .find(|f| f.signal_type == "PORT_ARRIVALS_ANOMALY")
            .unwrap();
        assert_eq!(arrivals.zscore, Some(8.0));
        assert_eq!(arrivals.delta_pct, 0.0);
    }

    #[test]
    fn below_threshold_zscore_does_not_fire() {
        let r = row(6, 5.0, 1.0);
        assert!(detect_all(&r).is_empty());
    }

    #[test]
    fn dwell_spike_ignores_negative_zscore() {
        let mut r = row(5, 5.0, 1.0);
        r.avg_dwell_hours = Some(3.0);
        r.dwell_30d_avg = Some(10.0);
        r.dwell_30d_std = Some(2.0);
        assert!(detect_all(&r).iter().all(|f| f.signal_type != "PORT_DWELL_SPIKE"));
    }

    #[test]
    fn congestion_buildup_requires_minimum_average_load() {
        let mut r = row(5, 5.0, 1.0);
        r.open_calls = 10;
        r.open_calls_30d_avg = Some(4.0); // below the 5-call floor
        assert!(detect_all(&r)
            .iter()
            .all(|f| f.signal_type != "PORT_CONGESTION_BUILDUP"));
    }

    #[test]
    fn congestion_buildup_fires_and_scales_severity_with_multiplier() {
        let mut r = row(5, 5.0, 1.0);
        r.open_calls = 20;
        r.open_calls_30d_avg = Some(5.0); // multiplier = 4.0
        let findings = detect_all(&r);
        let congestion = findings
            .iter()
            .find(|f| f.signal_type == "PORT_CONGESTION_BUILDUP")
            .unwrap();
        assert_eq!(congestion.multiplier, Some(4.0));
        assert_eq!(congestion.severity, Severity::Critical);
    }
}
