use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::types::NavStatus;

use super::message::AisMessage;
use super::queue::IngestQueue;

const DESTINATIONS: &[&str] = &["ROTTERDAM", "ANTWERP", "HAMBURG", "SINGAPORE", "SHANGHAI"];

/// `(status, weight)`, matched by cumulative weight out of 100.
const NAV_STATUS_WEIGHTS: &[(NavStatus, u32)] = &[
    (NavStatus::Underway, 65),
    (NavStatus::Anchored, 15),
    (NavStatus::Moored, 15),
    (NavStatus::NotUnderCommand, 5),
];

/// The last known position of a vessel the simulator can advance.
#[derive(Debug, Clone)]
pub struct VesselSeed {
    pub mmsi: String,
    pub lat: f64,
    pub lon: f64,
}

/// Supplies the simulator with the roster of vessels to synthesize positions for.
/// Backed by `port_calls`/`vessel_positions` queries in the server wiring; every
/// vessel with at least one persisted position is eligible.
#[async_trait]
pub trait VesselRoster: Send + Sync {
    async fn known_vessels(&self) -> anyhow::Result<Vec<VesselSeed>>;
}

/// Fallback AIS source used when no upstream feed is configured. Advances each
/// known vessel with a small random walk on a fixed tick.
pub struct Simulator<R: VesselRoster> {
    roster: R,
    queue: Arc<IngestQueue>,
    interval: Duration,
}

impl<R: VesselRoster> Simulator<R> {
    pub fn new(roster: R, queue: Arc<IngestQueue>, interval: Duration) -> Self {
        Self {
            roster,
            queue,
            interval,
        }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            let vessels = match self.roster.known_vessels().await {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(error = %err, "simulator failed to load vessel roster");
                    continue;
                }
            };
            for seed in vessels {
                self.queue.push(synthesize_next(&seed));
            }
        }
    }
}

fn synthesize_next(seed: &VesselSeed) -> AisMessage {
    let mut rng = rand::thread_rng();
    let lat = (seed.lat + rng.gen_range(-0.001..=0.001)).clamp(-90.0, 90.0);
    let lon = (seed.lon + rng.gen_range(-0.001..=0.001)).clamp(-180.0, 180.0);

    AisMessage {
        mmsi: seed.mmsi.clone(),
        timestamp_utc: Utc::now(),
        lat,
        lon,
        sog: Some(rng.gen_range(0.0..=15.0)),
        cog: Some(rng.gen_range(0.0..360.0)),
        heading: Some(rng.gen_range(0.0..360.0)),
        nav_status: weighted_nav_status(&mut rng),
        destination: Some(DESTINATIONS[rng.gen_range(0..DESTINATIONS.len())].to_string()),
        eta: None,
    }
}

fn weighted_nav_status(rng: &mut impl Rng) -> NavStatus {
    let total: u32 = NAV_STATUS_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (status, weight) in NAV_STATUS_WEIGHTS {
        if roll < *weight {
            return *status;
        }
        roll -= weight;
    }
    NavStatus::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_position_stays_within_a_small_step_of_the_seed() {
        let seed = VesselSeed {
            mmsi: "123456789".to_string(),
            lat: 51.9,
            lon: 4.48,
        };
        let msg = synthesize_next(&seed);
        assert!((msg.lat - seed.lat).abs() <= 0.001 + f64::EPSILON);
        assert!((msg.lon - seed.lon).abs() <= 0.001 + f64::EPSILON);
        assert!(msg.is_valid());
    }

    #[test]
    fn weighted_nav_status_never_panics_across_the_full_roll_range() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            weighted_nav_status(&mut rng);
        }
    }
}
