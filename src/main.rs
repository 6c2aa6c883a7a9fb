#[macro_use]
extern crate rocket;

use cancer_detection_server::api;
use cancer_detection_server::config::Settings;
use cancer_detection_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[launch]
fn rocket() -> _ {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env();
    let state = AppState::from_settings(&settings);
    api::rocket(state)
}
