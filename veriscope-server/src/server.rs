use actix_web::web;
use blockscout_service_launcher::launcher::{self, LaunchSettings};
use sea_orm::DatabaseConnection;

use crate::settings::Settings;

const SERVICE_NAME: &str = "veriscope";

/// Liveness/readiness probe. The REST read/write surface (signals, alert
/// deliveries, subscriptions CRUD) is an external collaborator's concern —
/// this process owns the tables, not that API, so it exposes only health and
/// the ambient metrics endpoint the launcher wires up separately.
async fn health() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

#[derive(Clone)]
struct Router {
    db: web::Data<DatabaseConnection>,
}

impl Router {
    /// No gRPC surface; launcher still wants a router to drive its
    /// (disabled-by-default) grpc server future.
    fn grpc_router(&self) -> tonic::transport::server::Router {
        tonic::transport::Server::builder()
    }
}

impl launcher::HttpRouter for Router {
    fn register_routes(&self, service_config: &mut web::ServiceConfig) {
        service_config
            .app_data(self.db.clone())
            .route("/health", web::get().to(health));
    }
}

pub async fn run(settings: Settings, db_connection: DatabaseConnection) -> Result<(), anyhow::Error> {
    let router = Router {
        db: web::Data::new(db_connection),
    };

    let grpc_router = router.grpc_router();
    let http_router = router;

    let launch_settings = LaunchSettings {
        service_name: SERVICE_NAME.to_string(),
        server: settings.server,
        metrics: settings.metrics,
        graceful_shutdown: Default::default(),
    };

    launcher::launch(launch_settings, http_router, grpc_router).await
}
