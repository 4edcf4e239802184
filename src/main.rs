use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use memory_pairs::game::GameConfig;
use memory_pairs::settings::Settings;

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Settings::load_default().and_then(|settings| settings.into_config()) {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "falling back to default settings");
            GameConfig::default()
        }
    };
    info!(symbols = ?config.symbols(), "starting Memory Pairs");

    memory_pairs::ui::app::run(config)
}
