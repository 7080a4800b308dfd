use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use entity::{port_calls, port_daily_baselines, ports};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::metrics;

const TRAILING_WINDOW_DAYS: i64 = 30;

struct TodayAggregate {
    arrivals: i32,
    departures: i32,
    unique_vessels: i32,
    avg_dwell_hours: Option<f64>,
    open_calls: i32,
}

/// Computes and upserts `port_daily_baselines` for every port for `target_day`,
/// including the trailing 30-day rolling mean/stddev of arrivals, dwell time, and
/// open-call count.
pub async fn build_for_day(db: &DatabaseConnection, target_day: NaiveDate) -> anyhow::Result<()> {
    let timer = metrics::BASELINE_BUILD_TIME.start_timer();
    let ports = ports::Entity::find().all(db).await?;

    for port in &ports {
        let today = compute_today_aggregate(db, port.id, target_day).await?;
        let history = trailing_history(db, port.id, target_day).await?;

        // the 30-day window is [day-30, day-1]; today's own aggregate never
        // contributes to its own baseline
        let arrivals_30d = rolling_stats(history.iter().map(|h| h.0 as f64));
        let dwell_30d = rolling_stats(history.iter().filter_map(|h| h.1));
        let open_calls_30d = rolling_stats(history.iter().map(|h| h.2 as f64));

        let now = Utc::now();
        let model = port_daily_baselines::ActiveModel {
            port_id: Set(port.id),
            day: Set(target_day),
            arrivals: Set(today.arrivals),
            departures: Set(today.departures),
            unique_vessels: Set(today.unique_vessels),
            avg_dwell_hours: Set(today.avg_dwell_hours),
            open_calls: Set(today.open_calls),
            arrivals_30d_avg: Set(arrivals_30d.0),
            arrivals_30d_std: Set(arrivals_30d.1),
            dwell_30d_avg: Set(dwell_30d.0),
            dwell_30d_std: Set(dwell_30d.1),
            open_calls_30d_avg: Set(open_calls_30d.0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        port_daily_baselines::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    port_daily_baselines::Column::PortId,
                    port_daily_baselines::Column::Day,
                ])
                .update_columns([
                    port_daily_baselines::Column::Arrivals,
                    port_daily_baselines::Column::Departures,
                    port_daily_baselines::Column::UniqueVessels,
                    port_daily_baselines::Column::AvgDwellHours,
                    port_daily_baselines::Column::OpenCalls,
                    port_daily_baselines::Column::Arrivals30dAvg,
                    port_daily_baselines::Column::Arrivals30dStd,
                    port_daily_baselines::Column::Dwell30dAvg,
                    port_daily_baselines::Column::Dwell30dStd,
                    port_daily_baselines::Column::OpenCalls30dAvg,
                    port_daily_baselines::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(db)
            .await?;
        metrics::BASELINE_ROWS_UPSERTED.inc();
    }

    timer.observe_duration();
    Ok(())
}

async fn compute_today_aggregate(
    db: &DatabaseConnection,
    port_id: Uuid,
    target_day: NaiveDate,
) -> anyhow::Result<TodayAggregate> {
    let day_start = target_day.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let day_end = day_start + ChronoDuration::days(1);

    let calls = port_calls::Entity::find()
        .filter(port_calls::Column::PortId.eq(port_id))
        .filter(port_calls::Column::ArrivalTime.lt(day_end))
        .filter(
            port_calls::Column::DepartureTime
                .is_null()
                .or(port_calls::Column::DepartureTime.gte(day_start)),
        )
        .all(db)
        .await?;

    let arrivals = calls
        .iter()
        .filter(|c| c.arrival_time >= day_start && c.arrival_time < day_end)
        .count() as i32;
    let departed_today: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c.departure_time, Some(d) if d >= day_start && d < day_end))
        .collect();
    let departures = departed_today.len() as i32;
    let avg_dwell_hours = if departed_today.is_empty() {
        None
    } else {
        let sum: f64 = departed_today.iter().filter_map(|c| c.berth_time_hours).sum();
        Some(sum / departed_today.len() as f64)
    };
    let open_calls = calls.iter().filter(|c| c.departure_time.is_none()).count() as i32;

    let mut vessels: Vec<&str> = calls.iter().map(|c| c.vessel_mmsi.as_str()).collect();
    vessels.sort_unstable();
    vessels.dedup();

    Ok(TodayAggregate {
        arrivals,
        departures,
        unique_vessels: vessels.len() as i32,
        avg_dwell_hours,
        open_calls,
    })
}

/// `(arrivals, avg_dwell_hours, open_calls)` for `[target_day-30, target_day-1]`.
async fn trailing_history(
    db: &DatabaseConnection,
    port_id: Uuid,
    target_day: NaiveDate,
) -> anyhow::Result<Vec<(i32, Option<f64>, i32)>> {
    let window_start = target_day - ChronoDuration::days(TRAILING_WINDOW_DAYS);
    let rows = port_daily_baselines::Entity::find()
        .filter(port_daily_baselines::Column::PortId.eq(port_id))
        .filter(port_daily_baselines::Column::Day.gte(window_start))
        .filter(port_daily_baselines::Column::Day.lt(target_day))
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| (r.arrivals, r.avg_dwell_hours, r.open_calls))
        .collect())
}

/// Sample mean and standard deviation. `None` stddev when fewer than 2 observations.
fn rolling_stats(values: impl Iterator<Item = f64>) -> (Option<f64>, Option<f64>) {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return (None, None);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (Some(mean), None);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (Some(mean), Some(variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_stats_of_single_value_has_no_stddev() {
        let (mean, std) = rolling_stats(std::iter::once(5.0));
        assert_eq!(mean, Some(5.0));
        assert_eq!(std, None);
    }

    #[test]
    fn rolling_stats_matches_known_sample_stddev() {
        let (mean, std) = rolling_stats(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter());
        assert!((mean.unwrap() - 5.0).abs() < 1e-9);
        assert!((std.unwrap() - 2.1380899).abs() < 1e-6);
    }

    #[test]
    fn rolling_stats_of_empty_iterator_is_none() {
        let (mean, std) = rolling_stats(std::iter::empty());
        assert_eq!(mean, None);
        assert_eq!(std, None);
    }
}
