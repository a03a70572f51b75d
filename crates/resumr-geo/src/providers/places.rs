use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use super::{build_http_client, endpoint, get_json, parse_base_url};
use crate::error::GeoError;
use crate::types::ProviderKind;

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const DETAIL_FIELDS: &str = "address_components,geometry,formatted_address";

#[derive(Debug, Clone, Deserialize)]
pub struct StructuredFormatting {
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub place_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
}

impl Prediction {
    /// The short name of the place: `main_text` when present, otherwise the
    /// first comma segment of the description.
    #[must_use]
    pub fn main_text(&self) -> &str {
        self.structured_formatting
            .as_ref()
            .map(|f| f.main_text.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| first_segment(&self.description))
    }
}

fn first_segment(s: &str) -> &str {
    s.split(',').next().unwrap_or_default().trim()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    result: Option<PlaceDetails>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Client for the key-gated places/geocoding API.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl PlacesClient {
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`GeoError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            client: build_http_client(timeout, user_agent)?,
            api_key: api_key.to_owned(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Autocomplete predictions for `input`, filtered by the provider's
    /// `types` parameter. `ZERO_RESULTS` is an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Transport, HTTP status, body, or provider status failures.
    pub async fn autocomplete(
        &self,
        input: &str,
        types: &str,
    ) -> Result<Vec<Prediction>, GeoError> {
        let url = endpoint(
            &self.base_url,
            "place/autocomplete/json",
            &[("input", input), ("key", self.api_key.as_str()), ("types", types)],
        )?;
        let body: AutocompleteResponse =
            get_json(&self.client, ProviderKind::Places, "place autocomplete", url).await?;
        check_status(&body.status, body.error_message)?;
        Ok(body.predictions)
    }

    /// # Errors
    ///
    /// Transport, HTTP status, body, or provider status failures, including
    /// an `OK` response with no `result`.
    pub async fn details(&self, place_id: &str) -> Result<PlaceDetails, GeoError> {
        let url = endpoint(
            &self.base_url,
            "place/details/json",
            &[
                ("place_id", place_id),
                ("key", self.api_key.as_str()),
                ("fields", DETAIL_FIELDS),
            ],
        )?;
        let body: DetailsResponse =
            get_json(&self.client, ProviderKind::Places, "place details", url).await?;
        if body.status != STATUS_OK {
            return Err(provider_error(body.status, body.error_message));
        }
        body.result
            .ok_or_else(|| provider_error(body.status, Some("missing result".to_owned())))
    }

    /// Forward geocode of a one-line address.
    ///
    /// # Errors
    ///
    /// Transport, HTTP status, body, or provider status failures.
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, GeoError> {
        let url = endpoint(
            &self.base_url,
            "geocode/json",
            &[("address", address), ("key", self.api_key.as_str())],
        )?;
        self.geocode_at(url).await
    }

    /// # Errors
    ///
    /// Transport, HTTP status, body, or provider status failures.
    pub async fn reverse_geocode(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<GeocodeResult>, GeoError> {
        let latlng = format!("{latitude},{longitude}");
        let url = endpoint(
            &self.base_url,
            "geocode/json",
            &[("latlng", latlng.as_str()), ("key", self.api_key.as_str())],
        )?;
        self.geocode_at(url).await
    }

    async fn geocode_at(&self, url: Url) -> Result<Vec<GeocodeResult>, GeoError> {
        let body: GeocodeResponse =
            get_json(&self.client, ProviderKind::Places, "geocode", url).await?;
        check_status(&body.status, body.error_message)?;
        Ok(body.results)
    }
}

fn check_status(status: &str, message: Option<String>) -> Result<(), GeoError> {
    match status {
        STATUS_OK | STATUS_ZERO_RESULTS => Ok(()),
        other => Err(provider_error(other.to_owned(), message)),
    }
}

fn provider_error(status: String, message: Option<String>) -> GeoError {
    GeoError::Provider {
        provider: ProviderKind::Places,
        status,
        message: message.unwrap_or_default(),
    }
}
