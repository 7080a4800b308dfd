//! Tagged sum types standing in for the source's untyped dictionaries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(anyhow::anyhow!("unknown severity: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::Low => "LOW",
            ConfidenceBand::Medium => "MEDIUM",
            ConfidenceBand::High => "HIGH",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceBand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(ConfidenceBand::Low),
            "MEDIUM" => Ok(ConfidenceBand::Medium),
            "HIGH" => Ok(ConfidenceBand::High),
            other => Err(anyhow::anyhow!("unknown confidence band: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Webhook,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Webhook => "WEBHOOK",
            Channel::Email => "EMAIL",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEBHOOK" => Ok(Channel::Webhook),
            "EMAIL" => Ok(Channel::Email),
            other => Err(anyhow::anyhow!("unknown channel: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Port,
    Global,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Port => "PORT",
            Scope::Global => "GLOBAL",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PORT" => Ok(Scope::Port),
            "GLOBAL" => Ok(Scope::Global),
            other => Err(anyhow::anyhow!("unknown scope: {other}")),
        }
    }
}

/// The two statistical methods a detector can use. Carried in `signals.method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectorKind {
    ZScore30d,
    Multiplier30d,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::ZScore30d => "zscore_30d",
            DetectorKind::Multiplier30d => "multiplier_30d",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Left open for future variants: today only `PortDisruption` is ever produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ClusterType {
    PortDisruption,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::PortDisruption => "PORT_DISRUPTION",
        }
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavStatus {
    Underway,
    Anchored,
    Moored,
    NotUnderCommand,
    Restricted,
    ConstrainedByDraft,
    Aground,
    Fishing,
    UnderwaySailing,
    Unknown,
}

impl NavStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NavStatus::Underway => "underway",
            NavStatus::Anchored => "anchored",
            NavStatus::Moored => "moored",
            NavStatus::NotUnderCommand => "not_under_command",
            NavStatus::Restricted => "restricted",
            NavStatus::ConstrainedByDraft => "constrained_by_draft",
            NavStatus::Aground => "aground",
            NavStatus::Fishing => "fishing",
            NavStatus::UnderwaySailing => "underway_sailing",
            NavStatus::Unknown => "unknown",
        }
    }

    /// Maps the upstream AIS `NavigationalStatus` integer code.
    pub fn from_upstream_code(code: i64) -> Self {
        match code {
            0 => NavStatus::Underway,
            1 => NavStatus::Anchored,
            2 => NavStatus::NotUnderCommand,
            3 => NavStatus::Restricted,
            4 => NavStatus::ConstrainedByDraft,
            5 => NavStatus::Moored,
            6 => NavStatus::Aground,
            7 => NavStatus::Fishing,
            8 => NavStatus::UnderwaySailing,
            _ => NavStatus::Unknown,
        }
    }
}

impl fmt::Display for NavStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "underway" => NavStatus::Underway,
            "anchored" => NavStatus::Anchored,
            "moored" => NavStatus::Moored,
            "not_under_command" => NavStatus::NotUnderCommand,
            "restricted" => NavStatus::Restricted,
            "constrained_by_draft" => NavStatus::ConstrainedByDraft,
            "aground" => NavStatus::Aground,
            "fishing" => NavStatus::Fishing,
            "underway_sailing" => NavStatus::UnderwaySailing,
            _ => NavStatus::Unknown,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCallStatus {
    InPort,
    Completed,
}

impl PortCallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortCallStatus::InPort => "in_port",
            PortCallStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for PortCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
    SkippedDedupe,
    SkippedRateLimit,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Failed => "FAILED",
            DeliveryStatus::SkippedDedupe => "SKIPPED_DEDUPE",
            DeliveryStatus::SkippedRateLimit => "SKIPPED_RATE_LIMIT",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "SUCCESS",
            RunStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_status_upstream_mapping_matches_spec_table() {
        assert_eq!(NavStatus::from_upstream_code(0), NavStatus::Underway);
        assert_eq!(NavStatus::from_upstream_code(5), NavStatus::Moored);
        assert_eq!(NavStatus::from_upstream_code(8), NavStatus::UnderwaySailing);
        assert_eq!(NavStatus::from_upstream_code(99), NavStatus::Unknown);
    }

    #[test]
    fn severity_roundtrips_through_its_string_form() {
        for s in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(s.to_string().parse::<Severity>().unwrap(), s);
        }
    }
}
