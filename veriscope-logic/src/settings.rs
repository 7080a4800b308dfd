use std::time;

use serde::Deserialize;
use serde_with::serde_as;

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AisSettings {
    /// Upstream AIS WebSocket URL. Absent together with `api_key` means simulation mode.
    pub upstream_url: Option<url::Url>,
    pub api_key: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
    #[serde(default = "default_max_hash_set_size")]
    pub max_hash_set_size: usize,
    #[serde(default = "default_dedup_cleanup_interval")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub dedup_cleanup_interval: time::Duration,
    #[serde(default = "default_simulation_interval")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub simulation_interval: time::Duration,
    #[serde(default = "default_reconnect_base_delay")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub reconnect_base_delay: time::Duration,
    #[serde(default = "default_reconnect_max_delay")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub reconnect_max_delay: time::Duration,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

fn default_batch_size() -> usize {
    50
}
fn default_max_queue_size() -> usize {
    5_000
}
fn default_max_hash_set_size() -> usize {
    10_000
}
fn default_dedup_cleanup_interval() -> time::Duration {
    time::Duration::from_secs(60)
}
fn default_simulation_interval() -> time::Duration {
    time::Duration::from_secs(30)
}
fn default_reconnect_base_delay() -> time::Duration {
    time::Duration::from_secs(1)
}
fn default_reconnect_max_delay() -> time::Duration {
    time::Duration::from_secs(60)
}
fn default_max_reconnect_attempts() -> u32 {
    10
}

impl Default for AisSettings {
    fn default() -> Self {
        Self {
            upstream_url: None,
            api_key: None,
            batch_size: default_batch_size(),
            max_queue_size: default_max_queue_size(),
            max_hash_set_size: default_max_hash_set_size(),
            dedup_cleanup_interval: default_dedup_cleanup_interval(),
            simulation_interval: default_simulation_interval(),
            reconnect_base_delay: default_reconnect_base_delay(),
            reconnect_max_delay: default_reconnect_max_delay(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PortCallSettings {
    #[serde(default = "default_check_interval")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub check_interval: time::Duration,
}

fn default_check_interval() -> time::Duration {
    time::Duration::from_secs(60)
}

impl Default for PortCallSettings {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BaselineSettings {
    /// Trailing window width for rolling stats, and the backfill depth each
    /// rebuild tick walks from today.
    #[serde(default = "default_history_days")]
    pub history_days: u32,
    #[serde(default = "default_baseline_interval")]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub rebuild_interval: time::Duration,
}

fn default_history_days() -> u32 {
    30
}
fn default_baseline_interval() -> time::Duration {
    time::Duration::from_secs(24 * 3600)
}

impl Default for BaselineSettings {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            rebuild_interval: default_baseline_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AlertingSettings {
    #[serde(default = "default_rate_limit_per_endpoint")]
    pub rate_limit_per_endpoint: u32,
    #[serde(default = "default_dedupe_ttl_hours")]
    pub dedupe_ttl_hours: u32,
    #[serde(default = "default_webhook_timeout_ms")]
    pub webhook_timeout_ms: u64,
    #[serde(default = "default_webhook_retry_attempts")]
    pub webhook_retry_attempts: u32,
    #[serde(default = "default_dlq_max_attempts")]
    pub dlq_max_attempts: u32,
    #[serde(default = "default_dlq_batch_size")]
    pub dlq_batch_size: u64,
}

fn default_rate_limit_per_endpoint() -> u32 {
    50
}
fn default_dedupe_ttl_hours() -> u32 {
    24
}
fn default_webhook_timeout_ms() -> u64 {
    5_000
}
fn default_webhook_retry_attempts() -> u32 {
    3
}
fn default_dlq_max_attempts() -> u32 {
    10
}
fn default_dlq_batch_size() -> u64 {
    100
}

impl Default for AlertingSettings {
    fn default() -> Self {
        Self {
            rate_limit_per_endpoint: default_rate_limit_per_endpoint(),
            dedupe_ttl_hours: default_dedupe_ttl_hours(),
            webhook_timeout_ms: default_webhook_timeout_ms(),
            webhook_retry_attempts: default_webhook_retry_attempts(),
            dlq_max_attempts: default_dlq_max_attempts(),
            dlq_batch_size: default_dlq_batch_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let ais = AisSettings::default();
        assert_eq!(ais.max_queue_size, 5_000);
        assert_eq!(ais.max_hash_set_size, 10_000);
        assert_eq!(ais.batch_size, 50);

        let alerting = AlertingSettings::default();
        assert_eq!(alerting.rate_limit_per_endpoint, 50);
        assert_eq!(alerting.webhook_retry_attempts, 3);
        assert_eq!(alerting.dlq_max_attempts, 10);
    }
}
