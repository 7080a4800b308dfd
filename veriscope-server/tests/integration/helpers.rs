use blockscout_service_launcher::test_server;
use url::Url;
use veriscope_server::Settings;

pub async fn init_server_with_setup<F>(db_url: String, settings_setup: F) -> Url
where
    F: Fn(Settings) -> Settings,
{
    let (settings, base) = {
        let mut settings = Settings::default(db_url);
        let (server_settings, base) = test_server::get_test_server_settings();
        settings.server = server_settings;
        settings.metrics.enabled = false;
        settings.tracing.enabled = false;
        settings.jaeger.enabled = false;

        (settings_setup(settings), base)
    };

    test_server::init_server(|| veriscope_server::run(settings), &base).await;
    base
}

pub async fn init_server(db_url: String) -> Url {
    init_server_with_setup(db_url, |x| x).await
}
