use knighttodo_core::{init_logging, open_db, HttpExperienceClient};
use knighttodo_server::{app, AppState, Config, SharedExperienceClient};
use log::{error, info};
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    init_logging(&config.log_level, &config.log_target)?;

    let conn = open_db(&config.database_path).inspect_err(|err| {
        error!(
            "event=db_open module=server status=error path={} error={err}",
            config.database_path.display()
        );
    })?;

    // The blocking client owns its own runtime; it has to be created and
    // dropped outside of tokio.
    let experience: SharedExperienceClient = Arc::new(HttpExperienceClient::new(
        config.experience_url.as_str(),
        config.experience_timeout,
        config.experience_retry,
    )?);
    let state = AppState::new(conn, Arc::clone(&experience));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(config, state))?;
    drop(runtime);
    drop(experience);
    Ok(())
}

async fn serve(config: Config, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        "event=server_start module=server status=ok addr={} db={} log_target={} experience_url={}",
        config.bind_addr,
        config.database_path.display(),
        config.log_target,
        config.experience_url
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=server status=error error={err}");
    }
}
