pub mod alert_dedupe;
pub mod alert_delivery_attempts;
pub mod alert_deliveries;
pub mod alert_dlq;
pub mod alert_runs;
pub mod alert_subscriptions;
pub mod api_keys;
pub mod port_calls;
pub mod port_daily_baselines;
pub mod ports;
pub mod signals;
pub mod vessel_positions;
pub mod vessels;

pub mod prelude {
    pub use super::alert_dedupe::Entity as AlertDedupe;
    pub use super::alert_deliveries::Entity as AlertDeliveries;
    pub use super::alert_delivery_attempts::Entity as AlertDeliveryAttempts;
    pub use super::alert_dlq::Entity as AlertDlq;
    pub use super::alert_runs::Entity as AlertRuns;
    pub use super::alert_subscriptions::Entity as AlertSubscriptions;
    pub use super::api_keys::Entity as ApiKeys;
    pub use super::port_calls::Entity as PortCalls;
    pub use super::port_daily_baselines::Entity as PortDailyBaselines;
    pub use super::ports::Entity as Ports;
    pub use super::signals::Entity as Signals;
    pub use super::vessel_positions::Entity as VesselPositions;
    pub use super::vessels::Entity as Vessels;
}
