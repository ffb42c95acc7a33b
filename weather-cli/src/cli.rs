use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use weather_core::{
    Config, FileStore, HistoryEntry, HistoryStore, LocationCandidate, LocationResolver,
    Resolution, SearchOrchestrator, SearchOutcome, WeatherAggregator,
    provider::openweather_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Search locations, view weather and forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Search for a location and show its weather and forecast.
    Search {
        /// City or place name.
        query: String,

        /// Take the first match instead of prompting when there are several.
        #[arg(long)]
        first: bool,
    },

    /// Manage recent searches.
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    /// List recent searches, most recent first.
    List,

    /// Show weather for a recent search without re-geocoding.
    Show {
        /// Entry id, or its 1-based position in `history list`.
        entry: String,
    },

    /// Delete a recent search.
    Delete {
        /// Entry id, or its 1-based position in `history list`.
        entry: String,
    },

    /// Delete all recent searches.
    Clear,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Search { query, first } => search(&config, &query, first).await,
            Command::History { command } => history(&config, command).await,
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn history_store(config: &Config) -> Result<HistoryStore> {
    let dir = config.data_dir()?;
    Ok(HistoryStore::new(Arc::new(FileStore::new(dir))))
}

fn orchestrator(config: &Config) -> Result<SearchOrchestrator> {
    let client = Arc::new(openweather_from_config(config)?);
    Ok(SearchOrchestrator::new(
        WeatherAggregator::new(client),
        history_store(config)?,
    ))
}

async fn search(config: &Config, query: &str, first: bool) -> Result<()> {
    let client = Arc::new(openweather_from_config(config)?);
    let resolver = LocationResolver::with_quiet_window(client, config.debounce());

    let candidates = match resolver.resolve(query).await {
        Resolution::Candidates(found) => found,
        Resolution::Failed(e) => return Err(e).context("Could not look up location"),
        Resolution::Superseded => bail!("Location lookup was superseded"),
    };

    let Some(candidate) = pick(candidates, first)? else {
        println!("No locations found for '{}'.", query.trim());
        return Ok(());
    };

    let orchestrator = orchestrator(config)?;
    if let Err(e) = orchestrator.load_history().await {
        tracing::warn!(error = %e, "could not read search history");
    }

    let outcome = orchestrator.submit_new_search(&candidate).await;
    print_outcome(outcome)?;
    print!("\n{}", render::history(&orchestrator.view().history));
    Ok(())
}

fn pick(mut candidates: Vec<LocationCandidate>, first: bool) -> Result<Option<LocationCandidate>> {
    if candidates.len() <= 1 || first {
        return Ok(candidates.into_iter().next());
    }

    let labels: Vec<String> = candidates
        .iter()
        .map(|c| format!("{} ({:.2}, {:.2})", c.label(), c.lat, c.lon))
        .collect();
    let chosen = Select::new("Which location?", labels.clone())
        .prompt()
        .context("Failed to read selection")?;

    let idx = labels
        .iter()
        .position(|l| *l == chosen)
        .ok_or_else(|| anyhow!("Selected location not found"))?;
    Ok(Some(candidates.swap_remove(idx)))
}

async fn history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = history_store(config)?;

    match command {
        HistoryCommand::List => {
            let entries = store.list().await?;
            print!("{}", render::history(&entries));
        }
        HistoryCommand::Show { entry } => {
            let entry = find_entry(&store.list().await?, &entry)?;
            let orchestrator = orchestrator(config)?;
            print_outcome(orchestrator.replay_history(&entry).await)?;
        }
        HistoryCommand::Delete { entry } => {
            let entry = find_entry(&store.list().await?, &entry)?;
            store.remove(&entry.id).await?;
            println!("Deleted '{}' from recent searches.", entry.location_name);
        }
        HistoryCommand::Clear => {
            store.clear().await?;
            println!("Cleared recent searches.");
        }
    }

    Ok(())
}

fn find_entry(entries: &[HistoryEntry], selector: &str) -> Result<HistoryEntry> {
    let by_position = selector
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| entries.get(idx));

    by_position
        .or_else(|| entries.iter().find(|e| e.id == selector))
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "No recent search matches '{selector}'.\n\
                 Hint: run `weather history list` to see ids and positions."
            )
        })
}

fn print_outcome(outcome: SearchOutcome) -> Result<()> {
    match outcome {
        SearchOutcome::Completed(report) => {
            print!("{}", render::report(&report));
            Ok(())
        }
        SearchOutcome::Failed(message) => bail!("Error fetching weather data: {message}"),
        SearchOutcome::Superseded => bail!("Search was superseded by a newer one"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.into(),
            location_name: name.into(),
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn find_entry_by_position() {
        let entries = vec![entry("a", "Paris, FR"), entry("b", "Rome, IT")];
        assert_eq!(find_entry(&entries, "2").unwrap().id, "b");
    }

    #[test]
    fn find_entry_by_id() {
        let entries = vec![entry("a", "Paris, FR"), entry("b", "Rome, IT")];
        assert_eq!(find_entry(&entries, "a").unwrap().location_name, "Paris, FR");
    }

    #[test]
    fn find_entry_unknown_selector_errors() {
        let entries = vec![entry("a", "Paris, FR")];

        for selector in ["0", "5", "zzz"] {
            let err = find_entry(&entries, selector).unwrap_err();
            assert!(err.to_string().contains("No recent search matches"));
        }
    }

    #[test]
    fn pick_single_candidate_without_prompt() {
        let only = LocationCandidate {
            name: "Lagos".into(),
            country: "NG".into(),
            lat: 6.45,
            lon: 3.39,
        };

        let picked = pick(vec![only.clone()], false).unwrap();
        assert_eq!(picked, Some(only));
        assert_eq!(pick(Vec::new(), false).unwrap(), None);
    }

    #[test]
    fn cli_parses_history_show() {
        let cli = Cli::try_parse_from(["weather", "history", "show", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::History { command: HistoryCommand::Show { entry } } if entry == "3"
        ));
    }
}
