use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::NavStatus;

/// A normalized AIS position report, independent of the upstream wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct AisMessage {
    pub mmsi: String,
    pub timestamp_utc: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub sog: Option<f64>,
    pub cog: Option<f64>,
    pub heading: Option<f64>,
    pub nav_status: NavStatus,
    pub destination: Option<String>,
    pub eta: Option<DateTime<Utc>>,
}

impl AisMessage {
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// 64-bit dedup fingerprint: `SHA256(mmsi|time_utc|lat|lon)[0..16]`.
    pub fn fingerprint(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let input = format!(
            "{}|{}|{}|{}",
            self.mmsi,
            self.timestamp_utc.to_rfc3339(),
            self.lat,
            self.lon
        );
        let digest = Sha256::digest(input.as_bytes());
        u64::from_be_bytes(digest[0..8].try_into().expect("digest is >=8 bytes"))
    }
}

/// Wire shape of an upstream record.
#[derive(Debug, Deserialize)]
struct UpstreamRecord {
    #[serde(rename = "MetaData")]
    meta: UpstreamMetaData,
    #[serde(rename = "Message")]
    message: UpstreamMessage,
}

#[derive(Debug, Deserialize)]
struct UpstreamMetaData {
    #[serde(rename = "MMSI")]
    mmsi: i64,
    time_utc: DateTime<Utc>,
    #[serde(rename = "Destination")]
    destination: Option<String>,
    #[serde(rename = "ETA")]
    eta: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct UpstreamMessage {
    #[serde(rename = "PositionReport")]
    position_report: UpstreamPositionReport,
}

#[derive(Debug, Deserialize)]
struct UpstreamPositionReport {
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Sog")]
    sog: Option<f64>,
    #[serde(rename = "Cog")]
    cog: Option<f64>,
    #[serde(rename = "TrueHeading")]
    true_heading: Option<f64>,
    #[serde(rename = "NavigationalStatus")]
    navigational_status: i64,
}

/// Parses a single raw upstream JSON record into a normalized message.
///
/// Returns `None` (rather than erroring) for records missing a `PositionReport`,
/// which the upstream also uses for other message types we don't subscribe to.
pub fn parse_upstream_record(raw: &str) -> anyhow::Result<Option<AisMessage>> {
    let record: UpstreamRecord = match serde_json::from_str(raw) {
        Ok(r) => r,
        Err(_) => return Ok(None),
    };

    let pr = record.message.position_report;
    Ok(Some(AisMessage {
        mmsi: format!("{:09}", record.meta.mmsi),
        timestamp_utc: record.meta.time_utc,
        lat: pr.latitude,
        lon: pr.longitude,
        sog: pr.sog,
        cog: pr.cog,
        heading: pr.true_heading,
        nav_status: NavStatus::from_upstream_code(pr.navigational_status),
        destination: record.meta.destination,
        eta: record.meta.eta,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AisMessage {
        AisMessage {
            mmsi: "123456789".to_string(),
            timestamp_utc: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            lat: 51.9,
            lon: 4.48,
            sog: Some(12.0),
            cog: Some(180.0),
            heading: Some(181.0),
            nav_status: NavStatus::Underway,
            destination: None,
            eta: None,
        }
    }

    #[test]
    fn fingerprint_is_stable_for_identical_inputs() {
        assert_eq!(sample().fingerprint(), sample().fingerprint());
    }

    #[test]
    fn fingerprint_differs_when_position_differs() {
        let mut other = sample();
        other.lat += 0.0001;
        assert_ne!(sample().fingerprint(), other.fingerprint());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let mut m = sample();
        m.lat = 91.0;
        assert!(!m.is_valid());
    }

    #[test]
    fn parses_upstream_position_report() {
        let raw = r#"{
            "MetaData": {"MMSI": 123456789, "time_utc": "2026-01-01T00:00:00Z", "Destination": "ROTTERDAM", "ETA": null},
            "Message": {"PositionReport": {"Latitude": 51.9, "Longitude": 4.48, "Sog": 12.0, "Cog": 180.0, "TrueHeading": 181.0, "NavigationalStatus": 5}}
        }"#;
        let msg = parse_upstream_record(raw).unwrap().unwrap();
        assert_eq!(msg.mmsi, "123456789");
        assert_eq!(msg.nav_status, NavStatus::Moored);
        assert_eq!(msg.destination.as_deref(), Some("ROTTERDAM"));
    }

    #[test]
    fn non_position_report_records_are_skipped() {
        let raw = r#"{"some": "other shape"}"#;
        assert!(parse_upstream_record(raw).unwrap().is_none());
    }
}
