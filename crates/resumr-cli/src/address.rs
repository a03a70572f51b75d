use clap::{Subcommand, ValueEnum};
use resumr_core::AppConfig;
use resumr_geo::{AddressAggregator, AddressInput, Lookup, SuggestionKind};

/// Form field a suggestion is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Field {
    Address,
    Street,
    City,
    State,
    Country,
}

impl From<Field> for SuggestionKind {
    fn from(field: Field) -> Self {
        match field {
            Field::Address => SuggestionKind::Address,
            Field::Street => SuggestionKind::Street,
            Field::City => SuggestionKind::City,
            Field::State => SuggestionKind::State,
            Field::Country => SuggestionKind::Country,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum AddressCommands {
    /// Suggest completions for a partially typed field
    Suggest {
        query: String,
        #[arg(long, value_enum, default_value = "address")]
        field: Field,
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Check that a full address resolves to a real place
    Validate {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        country: String,
    },
    /// Look up the address nearest to a coordinate
    Reverse {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
}

pub(crate) async fn run_address(config: &AppConfig, command: AddressCommands) -> anyhow::Result<()> {
    let aggregator = AddressAggregator::from_config(config)?;
    match command {
        AddressCommands::Suggest {
            query,
            field,
            limit,
        } => {
            let lookup = aggregator.lookup(field.into(), &query, limit).await;
            match &lookup {
                Lookup::QueryTooShort => {
                    tracing::info!(%query, "query too short, no provider called");
                }
                Lookup::Found { provider, suggestions } => {
                    tracing::info!(%provider, count = suggestions.len(), "suggestions found");
                }
                Lookup::Exhausted { attempts } => {
                    for attempt in attempts {
                        tracing::info!(provider = %attempt.provider, miss = ?attempt.miss, "provider missed");
                    }
                }
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&lookup.into_suggestions())?
            );
        }
        AddressCommands::Validate {
            street,
            city,
            state,
            country,
        } => {
            let input = AddressInput {
                street,
                city,
                state,
                country,
            };
            let validation = aggregator.validate_address(&input).await;
            println!("{}", serde_json::to_string_pretty(&validation)?);
        }
        AddressCommands::Reverse { lat, lon } => match aggregator.reverse_geocode(lat, lon).await {
            Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
            None => println!("no address found near {lat},{lon}"),
        },
    }
    Ok(())
}
