use std::collections::HashMap;

use chrono::{DateTime, Utc};
use entity::{ports, vessel_positions};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::geo::haversine_km;

use super::repository;

#[derive(Debug, Clone, Copy)]
struct OpenCall {
    id: Uuid,
    port_id: Uuid,
    arrival_time: DateTime<Utc>,
}

/// Per-vessel geofence state machine. Holds the currently-open call per vessel
/// (rebuilt from the database at startup) and the port catalog in memory, and
/// advances on each tick by folding newly-arrived positions.
pub struct PortCallDetector {
    db: DatabaseConnection,
    ports: Vec<ports::Model>,
    open_calls: HashMap<String, OpenCall>,
    watermark: i64,
}

impl PortCallDetector {
    pub async fn bootstrap(db: DatabaseConnection) -> anyhow::Result<Self> {
        let ports = repository::load_ports(&db).await?;
        let open_calls = repository::load_open_calls(&db)
            .await?
            .into_iter()
            .map(|(mmsi, (id, port_id, arrival_time))| {
                (
                    mmsi,
                    OpenCall {
                        id,
                        port_id,
                        arrival_time,
                    },
                )
            })
            .collect();
        let watermark = repository::max_position_id(&db).await?;
        Ok(Self {
            db,
            ports,
            open_calls,
            watermark,
        })
    }

    /// Processes every position persisted since the last tick. Returns the number
    /// of vessels whose state was evaluated.
    pub async fn tick(&mut self) -> anyhow::Result<usize> {
        let positions = repository::positions_after(&self.db, self.watermark).await?;
        if positions.is_empty() {
            return Ok(0);
        }

        let mut latest_per_vessel: HashMap<String, vessel_positions::Model> = HashMap::new();
        let mut max_id = self.watermark;
        for position in positions {
            max_id = max_id.max(position.id);
            latest_per_vessel.insert(position.vessel_mmsi.clone(), position);
        }

        let count = latest_per_vessel.len();
        for (mmsi, position) in latest_per_vessel {
            self.evaluate(&mmsi, &position).await?;
        }
        // Only advance the watermark once every vessel in this batch evaluated
        // without error, so a failed write doesn't skip the retry on next tick.
        self.watermark = max_id;
        Ok(count)
    }

    async fn evaluate(&mut self, mmsi: &str, position: &vessel_positions::Model) -> anyhow::Result<()> {
        let nearest = nearest_port_within_geofence(&self.ports, position.lat, position.lon);
        let open = self.open_calls.get(mmsi).copied();

        match (open, nearest) {
            (None, Some(port)) => {
                let call_id = repository::open_call(&self.db, mmsi, port.id, position.timestamp_utc).await?;
                self.open_calls.insert(
                    mmsi.to_string(),
                    OpenCall {
                        id: call_id,
                        port_id: port.id,
                        arrival_time: position.timestamp_utc,
                    },
                );
            }
            (Some(open), Some(port)) if open.port_id == port.id => {
                // still within the same port's geofence, nothing to do
            }
            (Some(open), Some(port)) => {
                repository::close_call(&self.db, open.id, open.arrival_time, position.timestamp_utc).await?;
                let call_id = repository::open_call(&self.db, mmsi, port.id, position.timestamp_utc).await?;
                self.open_calls.insert(
                    mmsi.to_string(),
                    OpenCall {
                        id: call_id,
                        port_id: port.id,
                        arrival_time: position.timestamp_utc,
                    },
                );
            }
            (Some(open), None) => {
                repository::close_call(&self.db, open.id, open.arrival_time, position.timestamp_utc).await?;
                self.open_calls.remove(mmsi);
            }
            (None, None) => {}
        }

        Ok(())
    }
}

/// Nearest port whose geofence contains `(lat, lon)`, breaking ties by port id
/// ascending when two geofences overlap at equal distance.
fn nearest_port_within_geofence(ports: &[ports::Model], lat: f64, lon: f64) -> Option<&ports::Model> {
    ports
        .iter()
        .map(|p| (haversine_km(lat, lon, p.lat, p.lon), p))
        .filter(|(distance, p)| *distance <= p.geofence_radius_km)
        .min_by(|(d1, p1), (d2, p2)| {
            d1.partial_cmp(d2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| p1.id.cmp(&p2.id))
        })
        .map(|(_, p)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(id: Uuid, lat: f64, lon: f64, radius_km: f64) -> ports::Model {
        ports::Model {
            id,
            unlocode: "XXYYY".to_string(),
            name: "Test Port".to_string(),
            lat,
            lon,
            geofence_radius_km: radius_km,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn picks_nearest_port_among_overlapping_geofences() {
        let near = port(Uuid::from_u128(1), 51.90, 4.48, 20.0);
        let far = port(Uuid::from_u128(2), 51.95, 4.50, 20.0);
        let ports = vec![far.clone(), near.clone()];
        let found = nearest_port_within_geofence(&ports, 51.90, 4.48).unwrap();
        assert_eq!(found.id, near.id);
    }

    #[test]
    fn ties_break_on_port_id_ascending() {
        let a = port(Uuid::from_u128(5), 0.0, 0.0, 100.0);
        let b = port(Uuid::from_u128(3), 0.0, 0.0, 100.0);
        let ports = vec![a, b];
        let found = nearest_port_within_geofence(&ports, 0.0, 0.0).unwrap();
        assert_eq!(found.id, Uuid::from_u128(3));
    }

    #[test]
    fn returns_none_outside_every_geofence() {
        let p = port(Uuid::from_u128(1), 0.0, 0.0, 1.0);
        let ports = vec![p];
        assert!(nearest_port_within_geofence(&ports, 10.0, 10.0).is_none());
    }
}
