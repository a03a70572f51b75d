//! HTTP clients for the two geocoding providers.
//!
//! Both clients make a single attempt per call. Suggestion lookups are
//! user-driven and debounced upstream; falling through to the next provider
//! is the recovery path.

mod open;
mod places;

pub use open::{OpenFeature, OpenGeocoderClient, PointGeometry};
pub use places::{
    AddressComponent, GeocodeResult, Geometry, LatLng, PlaceDetails, PlacesClient, Prediction,
    StructuredFormatting,
};

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GeoError;
use crate::types::ProviderKind;

fn build_http_client(timeout: Duration, user_agent: &str) -> Result<Client, GeoError> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()?)
}

fn parse_base_url(base_url: &str) -> Result<Url, GeoError> {
    let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })
}

fn endpoint(base: &Url, path: &str, query: &[(&str, &str)]) -> Result<Url, GeoError> {
    let mut url = base.join(path).map_err(|e| GeoError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut().extend_pairs(query);
    Ok(url)
}

/// GETs `url` and deserializes the body; any non-success status is an error.
async fn get_json<T: DeserializeOwned>(
    client: &Client,
    provider: ProviderKind,
    context: &str,
    url: Url,
) -> Result<T, GeoError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(GeoError::HttpStatus {
            provider,
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}
