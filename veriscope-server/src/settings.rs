use blockscout_service_launcher::{
    database::DatabaseSettings,
    launcher::{ConfigSettings, MetricsSettings, ServerSettings},
    tracing::{JaegerSettings, TracingSettings},
};
use logic::settings::{AisSettings, AlertingSettings, BaselineSettings, PortCallSettings};
use serde::Deserialize;
use uuid::Uuid;

/// Process-wide configuration.
/// Each sub-struct owns the defaults for its component; this struct only adds the
/// ambient server/database/observability sections and the auth overrides.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    #[serde(default)]
    pub jaeger: JaegerSettings,
    pub database: DatabaseSettings,

    /// Required in production; absent only in tests where auth is bypassed.
    pub api_key_pepper: Option<String>,
    /// Env-auth override: when both are set, requests may authenticate without an
    /// `Authorization` header by running as this tenant/user.
    pub alerts_api_key: Option<String>,
    pub alerts_user_id: Option<Uuid>,

    #[serde(default)]
    pub ais: AisSettings,
    #[serde(default)]
    pub port_call: PortCallSettings,
    #[serde(default)]
    pub baseline: BaselineSettings,
    #[serde(default)]
    pub alerting: AlertingSettings,
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "VERISCOPE";
}

impl Settings {
    /// A `Settings` pointed at `database_url` with every other section at its
    /// default, for tests that only care about wiring up a real database.
    pub fn default(database_url: String) -> Self {
        use blockscout_service_launcher::database::DatabaseConnectSettings;
        Self {
            server: Default::default(),
            metrics: Default::default(),
            tracing: Default::default(),
            jaeger: Default::default(),
            database: DatabaseSettings {
                connect: DatabaseConnectSettings::Url(database_url),
                create_database: Default::default(),
                run_migrations: Default::default(),
            },
            api_key_pepper: None,
            alerts_api_key: None,
            alerts_user_id: None,
            ais: Default::default(),
            port_call: Default::default(),
            baseline: Default::default(),
            alerting: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockscout_service_launcher::database::DatabaseConnectSettings;

    #[test]
    fn database_settings_accept_a_bare_url() {
        let settings = DatabaseSettings {
            connect: DatabaseConnectSettings::Url("postgres://localhost/veriscope".to_string()),
            create_database: false,
            run_migrations: false,
        };
        assert!(matches!(settings.connect, DatabaseConnectSettings::Url(_)));
    }
}
