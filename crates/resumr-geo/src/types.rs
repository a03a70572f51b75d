use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized address candidate, whichever provider produced it.
///
/// Structured fields are empty strings when the provider had no value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: String,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Which form field a suggestion request is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Address,
    Street,
    City,
    State,
    Country,
}

impl SuggestionKind {
    /// Shortest trimmed query, in characters, that reaches a provider.
    #[must_use]
    pub fn min_query_len(self) -> usize {
        match self {
            SuggestionKind::Address | SuggestionKind::Street => 3,
            SuggestionKind::City | SuggestionKind::State | SuggestionKind::Country => 2,
        }
    }

    /// `types` filter for the places autocomplete endpoint.
    #[must_use]
    pub fn places_types(self) -> &'static str {
        match self {
            SuggestionKind::Address | SuggestionKind::Street => "address",
            SuggestionKind::City => "(cities)",
            SuggestionKind::State | SuggestionKind::Country => "(regions)",
        }
    }

    /// `featuretype` filter for the open provider's search endpoint.
    #[must_use]
    pub fn open_feature_type(self) -> Option<&'static str> {
        match self {
            SuggestionKind::Address | SuggestionKind::Street => None,
            SuggestionKind::City => Some("city"),
            SuggestionKind::State => Some("state"),
            SuggestionKind::Country => Some("country"),
        }
    }

    /// City, state, and country suggestions label by the field itself.
    #[must_use]
    pub fn is_category(self) -> bool {
        matches!(
            self,
            SuggestionKind::City | SuggestionKind::State | SuggestionKind::Country
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Places,
    Open,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Places => write!(f, "places"),
            ProviderKind::Open => write!(f, "open"),
        }
    }
}

/// Why a provider produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    /// Not configured (no base URL, or no API key for places).
    Unavailable,
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    pub miss: Miss,
}

/// Outcome of one suggestion request, with the reason when nothing came back.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Query below the minimum length; no provider was called.
    QueryTooShort,
    Found {
        provider: ProviderKind,
        suggestions: Vec<Suggestion>,
    },
    /// Every provider missed, in the order they were tried.
    Exhausted { attempts: Vec<ProviderAttempt> },
}

impl Lookup {
    /// Collapses the outcome to what a form field shows: the suggestions,
    /// or nothing.
    #[must_use]
    pub fn into_suggestions(self) -> Vec<Suggestion> {
        match self {
            Lookup::Found { suggestions, .. } => suggestions,
            Lookup::QueryTooShort | Lookup::Exhausted { .. } => Vec::new(),
        }
    }

    #[must_use]
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            Lookup::Found { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

/// The four address fields a form submits for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

impl AddressInput {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.street, &self.city, &self.state, &self.country]
            .iter()
            .all(|f| !f.trim().is_empty())
    }

    /// `"street, city, state, country"` with each field trimmed.
    #[must_use]
    pub fn one_line(&self) -> String {
        [&self.street, &self.city, &self.state, &self.country]
            .iter()
            .map(|f| f.trim())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressValidation {
    pub is_valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

pub(crate) const MSG_INCOMPLETE: &str = "Please fill in all address fields";
pub(crate) const MSG_OPTIMISTIC: &str = "Address format looks good";
pub(crate) const MSG_NOT_FOUND: &str = "Address not found. Please check the details and try again.";

impl AddressValidation {
    pub(crate) fn incomplete() -> Self {
        Self {
            is_valid: false,
            message: MSG_INCOMPLETE.to_owned(),
            coordinates: None,
        }
    }

    /// Used when no provider could answer; form submission is never blocked
    /// on geocoding availability.
    pub(crate) fn optimistic() -> Self {
        Self {
            is_valid: true,
            message: MSG_OPTIMISTIC.to_owned(),
            coordinates: None,
        }
    }

    pub(crate) fn not_found() -> Self {
        Self {
            is_valid: false,
            message: MSG_NOT_FOUND.to_owned(),
            coordinates: None,
        }
    }
}
