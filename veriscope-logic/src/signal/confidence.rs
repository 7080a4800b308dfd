use crate::types::{ConfidenceBand, DetectorKind};

use super::detectors::Finding;

/// `score = min(1, |z|/6)` for z-score detectors, `score = clamp((m-1)/3, 0, 1)` for
/// multiplier detectors.
pub fn raw_confidence(finding: &Finding) -> f64 {
    match finding.method {
        DetectorKind::ZScore30d => (finding.zscore.unwrap_or(0.0).abs() / 6.0).min(1.0),
        DetectorKind::Multiplier30d => ((finding.multiplier.unwrap_or(1.0) - 1.0) / 3.0).clamp(0.0, 1.0),
    }
}

pub fn band_from_score(score: f64) -> ConfidenceBand {
    if score >= 0.8 {
        ConfidenceBand::High
    } else if score >= 0.5 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

/// Downgrades `(score, band)` when baseline history is incomplete. Below 90%
/// completeness the score is discounted by 25%; below 85% the band is forced to
/// LOW, otherwise a HIGH band is demoted to MEDIUM.
pub fn apply_completeness(score: f64, band: ConfidenceBand, completeness_pct: u32) -> (f64, ConfidenceBand) {
    if completeness_pct >= 90 {
        return (score, band);
    }
    let score = score * 0.75;
    let band = if completeness_pct < 85 {
        ConfidenceBand::Low
    } else if band == ConfidenceBand::High {
        ConfidenceBand::Medium
    } else {
        band
    };
    (score, band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn zscore_finding(z: f64) -> Finding {
        Finding {
            signal_type: "PORT_ARRIVALS_ANOMALY",
            value: 0.0,
            baseline: 0.0,
            stddev: Some(1.0),
            zscore: Some(z),
            multiplier: None,
            delta_pct: 0.0,
            severity: Severity::High,
            method: DetectorKind::ZScore30d,
        }
    }

    #[test]
    fn zscore_of_six_or_more_saturates_confidence() {
        assert_eq!(raw_confidence(&zscore_finding(6.0)), 1.0);
        assert_eq!(raw_confidence(&zscore_finding(12.0)), 1.0);
    }

    #[test]
    fn band_thresholds_match_spec() {
        assert_eq!(band_from_score(0.81), ConfidenceBand::High);
        assert_eq!(band_from_score(0.5), ConfidenceBand::Medium);
        assert_eq!(band_from_score(0.1), ConfidenceBand::Low);
    }

    #[test]
    fn incomplete_history_below_85_forces_low_band() {
        let (score, band) = apply_completeness(0.9, ConfidenceBand::High, 80);
        assert_eq!(band, ConfidenceBand::Low);
        assert!((score - 0.675).abs() < 1e-9);
    }

    #[test]
    fn incomplete_history_between_85_and_90_demotes_high_only() {
        let (_, band) = apply_completeness(0.9, ConfidenceBand::High, 87);
        assert_eq!(band, ConfidenceBand::Medium);

        let (_, band) = apply_completeness(0.6, ConfidenceBand::Medium, 87);
        assert_eq!(band, ConfidenceBand::Medium);
    }

    #[test]
    fn complete_history_leaves_score_and_band_untouched() {
        let (score, band) = apply_completeness(0.9, ConfidenceBand::High, 100);
        assert_eq!(score, 0.9);
        assert_eq!(band, ConfidenceBand::High);
    }
}
