mod config;
mod llm;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config_path =
        std::env::var("CHATARENA_CONFIG").unwrap_or_else(|_| "chatarena.toml".into());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let config = config::AppConfig::load(&config_path).expect("config load failed");
    tracing::info!(%config_path, models = ?config.model_ids(), "configuration loaded");

    let state = state::AppState::new(config).expect("http client build failed");

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "chatarena listening");
    axum::serve(listener, app).await.expect("server failed");
}
