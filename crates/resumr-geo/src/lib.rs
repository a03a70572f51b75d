//! Address suggestion aggregation over two geocoding providers.
//!
//! [`AddressAggregator`] tries the key-gated places provider first and the
//! keyless open provider second, normalizing either response shape into
//! [`Suggestion`] records. Provider failures never reach the caller: the
//! plain operations return an empty list (or an optimistic validation), and
//! [`AddressAggregator::lookup`] exposes the per-provider reasons.

pub mod aggregator;
pub mod error;
pub mod normalize;
pub mod providers;
pub mod types;

pub use aggregator::AddressAggregator;
pub use error::GeoError;
pub use providers::{OpenGeocoderClient, PlacesClient};
pub use types::{
    AddressInput, AddressValidation, Coordinates, Lookup, Miss, ProviderAttempt, ProviderKind,
    Suggestion, SuggestionKind,
};
