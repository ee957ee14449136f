mod action;
mod app;
mod app_state;
mod audio;
mod component;
mod components;
mod focus;
mod mpv;
mod theme;
mod widgets;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use playlist_core::catalog::Catalog;
use playlist_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = playlist_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("playlist-radio.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Config is read before logging starts so its filter can apply; a bad
    // file is reported once the subscriber is up.
    let config_result = Config::load();
    let config = config_result.as_ref().cloned().unwrap_or_default();

    // RUST_LOG wins over the config file.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log.filter.clone());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("playlist-radio log: {}", log_path.display());

    tracing::info!("playlist-radio starting…");
    if let Err(e) = &config_result {
        tracing::warn!(
            "ignoring unreadable config {}: {}",
            Config::config_path().display(),
            e
        );
    }

    let catalog = Catalog::builtin()?;
    tracing::info!("loaded {} stations", catalog.len());

    let backend =
        audio::MpvBackend::new(&config.player).with_stderr_log(data_dir.join("mpv-stderr.log"));

    app::App::new(catalog, Arc::new(backend)).run().await
}
