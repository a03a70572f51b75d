use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{build_http_client, endpoint, get_json, parse_base_url};
use crate::error::GeoError;
use crate::types::{Coordinates, ProviderKind};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

/// One GeoJSON feature. Properties are kept free-form: the provider may put
/// address parts at the top level or under an `address` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenFeature {
    #[serde(default)]
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
}

impl OpenFeature {
    /// First non-blank string (or number) among `keys`, checked in order at
    /// the top level and then under `properties.address`.
    #[must_use]
    pub fn property(&self, keys: &[&str]) -> Option<String> {
        let nested = self.properties.get("address").and_then(Value::as_object);
        keys.iter().find_map(|key| {
            scalar(self.properties.get(*key))
                .or_else(|| nested.and_then(|address| scalar(address.get(*key))))
        })
    }

    /// GeoJSON points are `[longitude, latitude]`.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self.geometry.as_ref()?.coordinates.as_slice() {
            [longitude, latitude, ..] => Some(Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            }),
            _ => None,
        }
    }
}

fn scalar(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<OpenFeature>,
}

/// Client for the keyless open geocoder (GeoJSON output).
#[derive(Debug, Clone)]
pub struct OpenGeocoderClient {
    client: Client,
    base_url: Url,
}

impl OpenGeocoderClient {
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`GeoError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, GeoError> {
        Ok(Self {
            client: build_http_client(timeout, user_agent)?,
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Free-text search, optionally restricted to one `featuretype`.
    ///
    /// # Errors
    ///
    /// Transport, HTTP status, or body failures.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
        feature_type: Option<&str>,
    ) -> Result<Vec<OpenFeature>, GeoError> {
        let limit = limit.to_string();
        let mut params = vec![
            ("q", query),
            ("format", "geojson"),
            ("addressdetails", "1"),
            ("limit", limit.as_str()),
        ];
        if let Some(feature_type) = feature_type {
            params.push(("featuretype", feature_type));
        }
        let url = endpoint(&self.base_url, "search", &params)?;
        let body: FeatureCollection = get_json(&self.client, ProviderKind::Open, "search", url).await?;
        Ok(body.features)
    }

    /// Nearest feature to a point. A provider "unable to geocode" body has no
    /// features and yields `None`.
    ///
    /// # Errors
    ///
    /// Transport, HTTP status, or body failures.
    pub async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<OpenFeature>, GeoError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let url = endpoint(
            &self.base_url,
            "reverse",
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "geojson"),
                ("addressdetails", "1"),
            ],
        )?;
        let body: FeatureCollection =
            get_json(&self.client, ProviderKind::Open, "reverse", url).await?;
        Ok(body.features.into_iter().next())
    }
}
