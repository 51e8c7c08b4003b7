mod args;

use anyhow::{Context, Result, bail};
use clap::Parser;
use moteworks_config::Config;
use moteworks_engine::{
    MemoryStore, MoteId, ParseOptions, get_allowed_speakers,
    parsing::{ComfortUpdateResult, GlobalLabels},
    parse_stringified_comfort, update_changes_from_parsed_comfort,
};
use std::path::{Path, PathBuf};

use args::{Command, MoteworksArgs};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = MoteworksArgs::parse();
    let config = load_config(args.store)?;

    match args.command {
        Command::Parse { file, no_spelling } => {
            let store = open_store(&config)?;
            let mut options = parse_options(&config);
            options.check_spelling &= !no_spelling;
            let result = parse_file(&file, &store, &options)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Commit { file, mote } => {
            let mut store = open_store(&config)?;
            let result = parse_file(&file, &store, &parse_options(&config))?;
            for diagnostic in &result.diagnostics {
                log::warn!(
                    "{}:{}..{}: {}",
                    file.display(),
                    diagnostic.range.start,
                    diagnostic.range.end,
                    diagnostic.message
                );
            }

            let mote_id = MoteId::new(mote);
            update_changes_from_parsed_comfort(
                &result.parsed,
                &mote_id,
                &mut store,
                &config.comfort_schema_id,
            )
            .with_context(|| format!("Failed to commit {} into {mote_id}", file.display()))?;
            println!(
                "Committed {} stage(s) into {mote_id} ({} diagnostic(s))",
                result.parsed.stages.len(),
                result.diagnostics.len()
            );
        }
        Command::Speakers => {
            let store = open_store(&config)?;
            let speakers = get_allowed_speakers(&store, &config.quest_schema_id)?;
            for speaker in speakers {
                println!("{}\t{}", speaker.id, speaker.label());
            }
        }
    }

    Ok(())
}

/// Reads the config file, letting `--store` fill in or override the store
/// location.
fn load_config(store_override: Option<PathBuf>) -> Result<Config> {
    let config_path = Config::config_path();
    log::debug!("Config path: {}", config_path.display());

    let loaded = Config::load_from_path(&config_path)
        .with_context(|| format!("Failed to load config file {}", config_path.display()))?;

    match (loaded, store_override) {
        (Some(config), Some(store)) => Ok(Config {
            store_path: store,
            ..config
        }),
        (Some(config), None) => Ok(config),
        (None, Some(store)) => Ok(Config::new(store)),
        (None, None) => bail!(
            "No store path given: pass --store or create a config file at {}",
            config_path.display()
        ),
    }
}

fn open_store(config: &Config) -> Result<MemoryStore> {
    let path = Config::expand_path(&config.store_path).unwrap_or(config.store_path.clone());
    log::info!("Opening store {}", path.display());
    MemoryStore::open(&path).with_context(|| format!("Failed to open store {}", path.display()))
}

fn parse_options(config: &Config) -> ParseOptions {
    ParseOptions {
        check_spelling: config.check_spelling,
        global_labels: GlobalLabels::new(&config.global_labels),
        quest_schema_id: config.quest_schema_id.clone(),
    }
}

fn parse_file(
    path: &Path,
    store: &MemoryStore,
    options: &ParseOptions,
) -> Result<ComfortUpdateResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_stringified_comfort(&text, store, options).map_err(|failure| {
        for entry in &failure.trace {
            log::error!("  {entry}");
        }
        anyhow::Error::new(failure).context(format!("Failed to parse {}", path.display()))
    })
}
