//! Provider for Wollongong using the waste-info API and Open-Meteo forecasts.

use std::sync::Arc;

use binday_core::{
    clock::Clock,
    config::EngineConfig,
    plugin::{MunicipalityMeta, MunicipalityPlugin},
    ports::PortError,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

mod open_meteo;
mod waste_info;

pub use open_meteo::OpenMeteoForecastPort;
pub use waste_info::{WollongongReferencePort, WollongongSchedulePort};

const USER_AGENT: &str = "binday/0.1";

/// HTTP client with the engine's request timeout applied.
///
/// # Errors
///
/// Returns the builder error when the TLS backend cannot be initialised.
pub fn http_client(config: &EngineConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.request_timeout)
        .build()
}

/// Build the plugin bundle for the Wollongong provider.
#[must_use]
pub fn plugin(client: Client, config: &EngineConfig, clock: Arc<dyn Clock>) -> MunicipalityPlugin {
    let reference_port = Arc::new(WollongongReferencePort::new(client.clone(), config));
    let schedule_port = Arc::new(WollongongSchedulePort::new(
        client.clone(),
        config,
        Arc::clone(&clock),
    ));
    let forecast_port = Arc::new(OpenMeteoForecastPort::new(client, config));

    MunicipalityPlugin {
        meta: municipality_meta(),
        reference_port,
        schedule_port,
        forecast_port,
    }
}

fn municipality_meta() -> MunicipalityMeta {
    MunicipalityMeta {
        id: String::from("wollongong"),
        name: String::from("Wollongong"),
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    let response = req.send().await.map_err(PortError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(PortError::Status(status));
    }

    response.json().await.map_err(PortError::Decode)
}
