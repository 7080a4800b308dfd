//! Supervised background tasks: the AIS ingestor, the port-call ticker, the
//! combined baseline-rebuild-then-signal-evaluation ticker, and the DLQ
//! drainer. Each owns a `stop()` handle that cancels its interval timer.

use std::time::Duration;

use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::task::JoinHandle;

use logic::ais::Ingestor;
use logic::port_call::PortCallDetector;

use crate::settings::Settings;

/// Everything spawned for the lifetime of the process.
pub struct BackgroundTasks {
    ais_ingestor: JoinHandle<()>,
    port_call: JoinHandle<()>,
    baseline: JoinHandle<()>,
    dlq_drainer: JoinHandle<()>,
}

impl BackgroundTasks {
    /// Aborts every task. In-flight ticks are not given a grace window here —
    /// the process-level shutdown grace window belongs to the HTTP
    /// server's own graceful-shutdown handling, not this call.
    pub fn stop_all(&self) {
        self.ais_ingestor.abort();
        self.port_call.abort();
        self.baseline.abort();
        self.dlq_drainer.abort();
    }
}

/// Spawns every long-lived task against `db` using `settings`. The DLQ
/// drainer runs across all tenants; per-subscription delivery happens inside it.
pub async fn spawn(db: DatabaseConnection, settings: &Settings) -> anyhow::Result<BackgroundTasks> {
    let ais_ingestor = {
        let ingestor = Arc::new(Ingestor::new(settings.ais.clone(), db.clone()));
        tokio::spawn(async move { ingestor.run().await })
    };

    let port_call = {
        let mut detector = PortCallDetector::bootstrap(db.clone()).await?;
        let interval = settings.port_call.check_interval;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                if let Err(err) = detector.tick().await {
                    tracing::error!(error = %err, "port-call detector tick failed");
                }
            }
        })
    };

    let baseline = {
        let db = db.clone();
        let interval = settings.baseline.rebuild_interval;
        let history_days = settings.baseline.history_days as i64;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                timer.tick().await;
                let today = chrono::Utc::now().date_naive();
                let window_start = today - chrono::Duration::days(history_days);
                let mut day = window_start;
                let mut rebuilt_ok = true;
                while day <= today {
                    if let Err(err) = logic::baseline::build_for_day(&db, day).await {
                        tracing::error!(error = %err, day = %day, "baseline build tick failed");
                        rebuilt_ok = false;
                        break;
                    }
                    day += chrono::Duration::days(1);
                }
                if !rebuilt_ok {
                    continue;
                }
                // `today`'s baseline row can't reflect a complete day yet, so the
                // signal engine evaluates the most recently closed UTC day instead.
                let evaluated_day = today - chrono::Duration::days(1);
                if let Err(err) = logic::signal::evaluate_day(&db, evaluated_day, None).await {
                    tracing::error!(error = %err, day = %evaluated_day, "signal engine tick failed");
                }
            }
        })
    };

    let dlq_drainer = {
        let db = db.clone();
        let alerting = settings.alerting.clone();
        let batch_size = settings.alerting.dlq_batch_size;
        tokio::spawn(async move {
            let mut timer = tokio::time::interval(Duration::from_secs(60));
            loop {
                timer.tick().await;
                match logic::dispatcher::drain_dlq(&db, &alerting, batch_size).await {
                    Ok(redrained) if redrained > 0 => {
                        tracing::info!(redrained, "DLQ drain tick redrained deliveries");
                    }
                    Ok(_) => {}
                    Err(err) => tracing::error!(error = %err, "DLQ drain tick failed"),
                }
            }
        })
    };

    Ok(BackgroundTasks {
        ais_ingestor,
        port_call,
        baseline,
        dlq_drainer,
    })
}
