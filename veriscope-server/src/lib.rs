mod scheduler;
mod server;
mod settings;

pub use scheduler::BackgroundTasks;
pub use server::run as run_server;
pub use settings::Settings;

use blockscout_service_launcher::database;
use migration::Migrator;

const SERVICE_NAME: &str = "veriscope";

/// Migrates the database, spawns every long-lived task, and then runs
/// the HTTP server until it exits or one of the background tasks panics past its
/// reconnect budget.
pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    blockscout_service_launcher::tracing::init_logs(SERVICE_NAME, &settings.tracing, &settings.jaeger)?;

    let db_connection = database::initialize_postgres::<Migrator>(&settings.database).await?;

    let background = scheduler::spawn(db_connection.clone(), &settings).await?;

    let result = run_server(settings, db_connection).await;
    background.stop_all();
    result
}
