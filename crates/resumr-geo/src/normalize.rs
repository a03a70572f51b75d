//! Conversion of provider payloads into [`Suggestion`] records.

use std::collections::HashSet;

use crate::providers::{AddressComponent, GeocodeResult, LatLng, OpenFeature, PlaceDetails, Prediction};
use crate::types::{Coordinates, Suggestion, SuggestionKind};

const CITY_COMPONENTS: &[&str] = &[
    "locality",
    "postal_town",
    "sublocality",
    "administrative_area_level_2",
];

fn component<'a>(components: &'a [AddressComponent], kind: &str) -> Option<&'a str> {
    components
        .iter()
        .find(|c| c.types.iter().any(|t| t == kind))
        .map(|c| c.long_name.trim())
        .filter(|name| !name.is_empty())
}

fn from_components(components: &[AddressComponent]) -> Suggestion {
    let street = [
        component(components, "street_number"),
        component(components, "route"),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    Suggestion {
        street,
        city: CITY_COMPONENTS
            .iter()
            .find_map(|kind| component(components, kind))
            .unwrap_or_default()
            .to_owned(),
        state: component(components, "administrative_area_level_1")
            .unwrap_or_default()
            .to_owned(),
        country: component(components, "country")
            .unwrap_or_default()
            .to_owned(),
        postal_code: component(components, "postal_code")
            .unwrap_or_default()
            .to_owned(),
        ..Suggestion::default()
    }
}

fn coordinates(location: LatLng) -> Coordinates {
    Coordinates {
        latitude: location.lat,
        longitude: location.lng,
    }
}

/// Full record for an autocomplete prediction whose detail lookup succeeded.
#[must_use]
pub fn from_place_details(prediction: &Prediction, details: &PlaceDetails) -> Suggestion {
    let label = if prediction.description.trim().is_empty() {
        details.formatted_address.clone().unwrap_or_default()
    } else {
        prediction.description.trim().to_owned()
    };
    Suggestion {
        id: prediction.place_id.clone(),
        label,
        coordinates: details.geometry.as_ref().map(|g| coordinates(g.location)),
        ..from_components(&details.address_components)
    }
}

/// Label and id only; used when the detail lookup for a prediction failed.
#[must_use]
pub fn partial(prediction: &Prediction) -> Suggestion {
    Suggestion {
        id: prediction.place_id.clone(),
        label: prediction.description.trim().to_owned(),
        ..Suggestion::default()
    }
}

/// Street suggestion from a prediction: the main text is the street.
#[must_use]
pub fn street_from_prediction(prediction: &Prediction) -> Suggestion {
    Suggestion {
        street: prediction.main_text().to_owned(),
        ..partial(prediction)
    }
}

/// City, state, or country suggestion from a prediction. The category field
/// and the label are both the prediction's main text.
#[must_use]
pub fn category_from_prediction(kind: SuggestionKind, prediction: &Prediction) -> Suggestion {
    let name = prediction.main_text().to_owned();
    let mut suggestion = Suggestion {
        id: prediction.place_id.clone(),
        ..Suggestion::default()
    };
    set_category(&mut suggestion, kind, name);
    suggestion
}

#[must_use]
pub fn from_geocode_result(result: &GeocodeResult) -> Suggestion {
    Suggestion {
        id: result.place_id.clone(),
        label: result.formatted_address.trim().to_owned(),
        coordinates: result.geometry.as_ref().map(|g| coordinates(g.location)),
        ..from_components(&result.address_components)
    }
}

/// Normalizes an open-provider feature, filling each field from its first
/// present source property.
#[must_use]
pub fn from_open_feature(feature: &OpenFeature) -> Suggestion {
    let display_name = feature.property(&["display_name"]);
    let label = display_name
        .clone()
        .or_else(|| feature.property(&["name"]))
        .unwrap_or_default();

    let street = match feature.property(&["street", "road"]) {
        Some(road) => match feature.property(&["housenumber", "house_number"]) {
            Some(number) => format!("{number} {road}"),
            None => road,
        },
        None => display_name
            .as_deref()
            .and_then(|d| d.split(',').next())
            .map(|s| s.trim().to_owned())
            .unwrap_or_default(),
    };

    Suggestion {
        id: feature
            .property(&["place_id", "osm_id"])
            .unwrap_or_default(),
        label,
        street,
        city: feature
            .property(&["city", "town", "village"])
            .unwrap_or_default(),
        state: feature.property(&["state", "county"]).unwrap_or_default(),
        country: feature.property(&["country"]).unwrap_or_default(),
        postal_code: feature.property(&["postcode"]).unwrap_or_default(),
        coordinates: feature.coordinates(),
    }
}

/// Category suggestion from an open feature: the label becomes the category
/// field, empty when the feature lacks it.
#[must_use]
pub fn category_from_open_feature(kind: SuggestionKind, feature: &OpenFeature) -> Suggestion {
    let mut suggestion = from_open_feature(feature);
    let name = match kind {
        SuggestionKind::City => suggestion.city.clone(),
        SuggestionKind::State => suggestion.state.clone(),
        SuggestionKind::Country => suggestion.country.clone(),
        SuggestionKind::Address | SuggestionKind::Street => return suggestion,
    };
    suggestion.label = name;
    suggestion
}

fn set_category(suggestion: &mut Suggestion, kind: SuggestionKind, name: String) {
    match kind {
        SuggestionKind::City => suggestion.city.clone_from(&name),
        SuggestionKind::State => suggestion.state.clone_from(&name),
        SuggestionKind::Country => suggestion.country.clone_from(&name),
        SuggestionKind::Address | SuggestionKind::Street => {}
    }
    suggestion.label = name;
}

/// Drops records with an empty label, then (for category kinds) later
/// records whose label matches an earlier one case-insensitively. Truncates
/// to `limit`.
#[must_use]
pub fn finalize(kind: SuggestionKind, suggestions: Vec<Suggestion>, limit: usize) -> Vec<Suggestion> {
    let mut seen = HashSet::new();
    suggestions
        .into_iter()
        .filter(|s| !s.label.trim().is_empty())
        .filter(|s| !kind.is_category() || seen.insert(s.label.to_lowercase()))
        .take(limit)
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
