//! Two-provider suggestion pipeline.
//!
//! A lookup moves `Idle → QueryTooShort`, or `Idle → places → open → empty`,
//! stopping at the first provider that yields at least one labelled record.

use std::time::Duration;

use futures::future::join_all;
use resumr_core::AppConfig;

use crate::error::GeoError;
use crate::normalize;
use crate::providers::{OpenGeocoderClient, PlacesClient, Prediction};
use crate::types::{
    AddressInput, AddressValidation, Lookup, Miss, ProviderAttempt, ProviderKind, Suggestion,
    SuggestionKind,
};

type Step = Result<Vec<Suggestion>, Miss>;

/// Address suggestions and validation over an optional primary (places)
/// provider and an optional secondary (open) provider.
///
/// No method returns an error; provider failures are logged and fall through
/// to the next provider.
#[derive(Debug, Clone, Default)]
pub struct AddressAggregator {
    places: Option<PlacesClient>,
    open: Option<OpenGeocoderClient>,
}

impl AddressAggregator {
    #[must_use]
    pub fn new(places: Option<PlacesClient>, open: Option<OpenGeocoderClient>) -> Self {
        Self { places, open }
    }

    /// Builds whichever providers the config enables. Places needs both an
    /// API key and a base URL; the open provider needs only a base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] if a configured base URL is invalid or an HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, GeoError> {
        let timeout = Duration::from_secs(config.geocoder_timeout_secs);
        let places = match (&config.places_api_key, &config.places_base_url) {
            (Some(key), Some(base)) => Some(PlacesClient::new(
                key,
                base,
                timeout,
                &config.user_agent,
            )?),
            _ => None,
        };
        let open = config
            .open_geocoder_base_url
            .as_deref()
            .map(|base| OpenGeocoderClient::new(base, timeout, &config.user_agent))
            .transpose()?;

        tracing::debug!(
            places = places.is_some(),
            open = open.is_some(),
            "address aggregator configured"
        );
        Ok(Self::new(places, open))
    }

    pub async fn get_address_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.lookup_address(query, limit).await.into_suggestions()
    }

    pub async fn get_street_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.lookup_street(query, limit).await.into_suggestions()
    }

    pub async fn get_city_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.lookup_city(query, limit).await.into_suggestions()
    }

    pub async fn get_state_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.lookup_state(query, limit).await.into_suggestions()
    }

    pub async fn get_country_suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        self.lookup_country(query, limit).await.into_suggestions()
    }

    pub async fn lookup_address(&self, query: &str, limit: usize) -> Lookup {
        self.lookup(SuggestionKind::Address, query, limit).await
    }

    pub async fn lookup_street(&self, query: &str, limit: usize) -> Lookup {
        self.lookup(SuggestionKind::Street, query, limit).await
    }

    pub async fn lookup_city(&self, query: &str, limit: usize) -> Lookup {
        self.lookup(SuggestionKind::City, query, limit).await
    }

    pub async fn lookup_state(&self, query: &str, limit: usize) -> Lookup {
        self.lookup(SuggestionKind::State, query, limit).await
    }

    pub async fn lookup_country(&self, query: &str, limit: usize) -> Lookup {
        self.lookup(SuggestionKind::Country, query, limit).await
    }

    /// Runs the provider chain for one field kind. A `limit` of zero is
    /// treated as one.
    pub async fn lookup(&self, kind: SuggestionKind, query: &str, limit: usize) -> Lookup {
        let query = query.trim();
        if query.chars().count() < kind.min_query_len() {
            return Lookup::QueryTooShort;
        }
        let limit = limit.max(1);

        let mut attempts = Vec::with_capacity(2);

        match self.try_places(kind, query, limit).await {
            Ok(suggestions) => {
                tracing::debug!(?kind, count = suggestions.len(), "places provider hit");
                return Lookup::Found {
                    provider: ProviderKind::Places,
                    suggestions,
                };
            }
            Err(miss) => {
                tracing::debug!(?kind, ?miss, "places provider missed, trying open provider");
                attempts.push(ProviderAttempt {
                    provider: ProviderKind::Places,
                    miss,
                });
            }
        }

        match self.try_open(kind, query, limit).await {
            Ok(suggestions) => {
                tracing::debug!(?kind, count = suggestions.len(), "open provider hit");
                Lookup::Found {
                    provider: ProviderKind::Open,
                    suggestions,
                }
            }
            Err(miss) => {
                tracing::debug!(?kind, ?miss, "open provider missed");
                attempts.push(ProviderAttempt {
                    provider: ProviderKind::Open,
                    miss,
                });
                Lookup::Exhausted { attempts }
            }
        }
    }

    async fn try_places(&self, kind: SuggestionKind, query: &str, limit: usize) -> Step {
        let places = self.places.as_ref().ok_or(Miss::Unavailable)?;
        let predictions = places
            .autocomplete(query, kind.places_types())
            .await
            .map_err(|e| failed(ProviderKind::Places, &e))?;

        let suggestions = match kind {
            SuggestionKind::Address => Self::with_details(places, &predictions, limit).await,
            SuggestionKind::Street => predictions
                .iter()
                .map(normalize::street_from_prediction)
                .collect(),
            SuggestionKind::City | SuggestionKind::State | SuggestionKind::Country => predictions
                .iter()
                .map(|p| normalize::category_from_prediction(kind, p))
                .collect(),
        };
        non_empty(normalize::finalize(kind, suggestions, limit))
    }

    /// Fetches details for up to `limit` predictions concurrently. Output
    /// order follows prediction order; a failed lookup keeps a partial record.
    async fn with_details(
        places: &PlacesClient,
        predictions: &[Prediction],
        limit: usize,
    ) -> Vec<Suggestion> {
        let lookups = predictions.iter().take(limit).map(|prediction| async move {
            match places.details(&prediction.place_id).await {
                Ok(details) => normalize::from_place_details(prediction, &details),
                Err(e) => {
                    tracing::warn!(
                        place_id = %prediction.place_id,
                        error = %e,
                        "place details lookup failed, keeping partial suggestion"
                    );
                    normalize::partial(prediction)
                }
            }
        });
        join_all(lookups).await
    }

    async fn try_open(&self, kind: SuggestionKind, query: &str, limit: usize) -> Step {
        let open = self.open.as_ref().ok_or(Miss::Unavailable)?;
        let features = open
            .search(query, limit, kind.open_feature_type())
            .await
            .map_err(|e| failed(ProviderKind::Open, &e))?;

        let suggestions = features
            .iter()
            .map(|f| {
                if kind.is_category() {
                    normalize::category_from_open_feature(kind, f)
                } else {
                    normalize::from_open_feature(f)
                }
            })
            .collect();
        non_empty(normalize::finalize(kind, suggestions, limit))
    }

    /// Checks that a four-field address resolves to a real place.
    ///
    /// Never fails: if no provider can answer, the address is accepted with
    /// an optimistic message.
    pub async fn validate_address(&self, address: &AddressInput) -> AddressValidation {
        if !address.is_complete() {
            return AddressValidation::incomplete();
        }
        let one_line = address.one_line();

        if let Some(places) = &self.places {
            match places.geocode(&one_line).await {
                Ok(results) => {
                    if let Some(first) = results.first() {
                        return AddressValidation {
                            is_valid: true,
                            message: format!("Address verified: {}", first.formatted_address),
                            coordinates: normalize::from_geocode_result(first).coordinates,
                        };
                    }
                    tracing::debug!("places geocode returned no results");
                }
                Err(e) => log_failure(ProviderKind::Places, &e),
            }
        }

        let Some(open) = &self.open else {
            return AddressValidation::optimistic();
        };
        match open.search(&one_line, 1, None).await {
            Ok(features) => match features.first() {
                Some(feature) => {
                    let found = normalize::from_open_feature(feature);
                    AddressValidation {
                        is_valid: true,
                        message: format!("Address found: {}", found.label),
                        coordinates: found.coordinates,
                    }
                }
                None => AddressValidation::not_found(),
            },
            Err(e) => {
                log_failure(ProviderKind::Open, &e);
                AddressValidation::optimistic()
            }
        }
    }

    /// Nearest labelled address to a point, places first.
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<Suggestion> {
        if let Some(places) = &self.places {
            match places.reverse_geocode(latitude, longitude).await {
                Ok(results) => {
                    if let Some(found) = results
                        .iter()
                        .map(normalize::from_geocode_result)
                        .find(|s| !s.label.is_empty())
                    {
                        return Some(found);
                    }
                }
                Err(e) => log_failure(ProviderKind::Places, &e),
            }
        }

        let open = self.open.as_ref()?;
        match open.reverse(latitude, longitude).await {
            Ok(feature) => feature
                .map(|f| normalize::from_open_feature(&f))
                .filter(|s| !s.label.is_empty()),
            Err(e) => {
                log_failure(ProviderKind::Open, &e);
                None
            }
        }
    }
}

fn log_failure(provider: ProviderKind, error: &GeoError) {
    tracing::warn!(%provider, error = %error, "geocoding provider request failed");
}

fn failed(provider: ProviderKind, error: &GeoError) -> Miss {
    log_failure(provider, error);
    Miss::Failed(error.to_string())
}

fn non_empty(suggestions: Vec<Suggestion>) -> Step {
    if suggestions.is_empty() {
        Err(Miss::Empty)
    } else {
        Ok(suggestions)
    }
}
