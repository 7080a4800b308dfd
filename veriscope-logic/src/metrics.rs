use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Histogram, IntCounter, IntGauge,
};

lazy_static! {
    pub static ref AIS_MESSAGES_RECEIVED: IntCounter = register_int_counter!(
        "veriscope_ais_messages_received_total",
        "total number of AIS position reports received from the upstream feed",
    )
    .unwrap();
    pub static ref AIS_MESSAGES_DROPPED: IntCounter = register_int_counter!(
        "veriscope_ais_messages_dropped_total",
        "number of AIS messages dropped because the ingest queue was full",
    )
    .unwrap();
    pub static ref AIS_DUPLICATES_FILTERED: IntCounter = register_int_counter!(
        "veriscope_ais_duplicates_filtered_total",
        "number of AIS messages dropped as duplicates",
    )
    .unwrap();
    pub static ref AIS_RECONNECT_ATTEMPTS: IntCounter = register_int_counter!(
        "veriscope_ais_reconnect_attempts_total",
        "number of upstream reconnect attempts made",
    )
    .unwrap();
    pub static ref AIS_QUEUE_SIZE: IntGauge = register_int_gauge!(
        "veriscope_ais_queue_size",
        "current number of queued AIS messages awaiting persistence",
    )
    .unwrap();
    pub static ref PORT_CALLS_OPENED: IntCounter = register_int_counter!(
        "veriscope_port_calls_opened_total",
        "number of port calls opened by the port-call detector",
    )
    .unwrap();
    pub static ref PORT_CALLS_CLOSED: IntCounter = register_int_counter!(
        "veriscope_port_calls_closed_total",
        "number of port calls closed by the port-call detector",
    )
    .unwrap();
    pub static ref BASELINE_ROWS_UPSERTED: IntCounter = register_int_counter!(
        "veriscope_baseline_rows_upserted_total",
        "number of port_daily_baselines rows upserted",
    )
    .unwrap();
    pub static ref BASELINE_BUILD_TIME: Histogram = register_histogram!(
        "veriscope_baseline_build_time_seconds",
        "time spent computing and upserting baselines for one backfill run",
    )
    .unwrap();
    pub static ref SIGNALS_EMITTED: IntCounter = register_int_counter!(
        "veriscope_signals_emitted_total",
        "number of signal rows upserted by the signal engine",
    )
    .unwrap();
    pub static ref SIGNAL_EVAL_TIME: Histogram = register_histogram!(
        "veriscope_signal_eval_time_seconds",
        "time spent evaluating detectors for one day across all ports",
    )
    .unwrap();
    pub static ref ALERTS_SENT: IntCounter = register_int_counter!(
        "veriscope_alerts_sent_total",
        "number of alert deliveries that completed with status SENT",
    )
    .unwrap();
    pub static ref ALERTS_FAILED: IntCounter = register_int_counter!(
        "veriscope_alerts_failed_total",
        "number of alert deliveries that exhausted retries and failed",
    )
    .unwrap();
    pub static ref ALERTS_SKIPPED_DEDUPE: IntCounter = register_int_counter!(
        "veriscope_alerts_skipped_dedupe_total",
        "number of alert candidates skipped because of an active dedupe TTL",
    )
    .unwrap();
    pub static ref ALERTS_SKIPPED_RATE_LIMIT: IntCounter = register_int_counter!(
        "veriscope_alerts_skipped_rate_limit_total",
        "number of alert candidates skipped because of the per-endpoint rate limit",
    )
    .unwrap();
    pub static ref WEBHOOK_ATTEMPTS: IntCounter = register_int_counter!(
        "veriscope_webhook_attempts_total",
        "number of physical webhook HTTP POST attempts made",
    )
    .unwrap();
    pub static ref DLQ_DEPTH: IntGauge = register_int_gauge!(
        "veriscope_dlq_depth",
        "number of deliveries currently sitting in the dead-letter queue",
    )
    .unwrap();
}
