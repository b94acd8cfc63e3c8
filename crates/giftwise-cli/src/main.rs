use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use giftwise_core::{
    appeal_percentage, gift_emoji, DeterministicFallbackGenerator, GiftIdea, GiftRequest,
    ResponseNormalizer, SaveOutcome, SavedIdeas,
};
use giftwise_runtime::{GiftResponse, GiftService, ProviderRegistry, RuntimeConfig};

#[derive(Parser)]
#[command(name = "giftwise")]
#[command(about = "Gift ideas from an occasion and a list of interests")]
#[command(version)]
struct Cli {
    /// Print JSON instead of a readable listing
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the configured provider for gift ideas
    Generate {
        #[arg(long)]
        occasion: String,

        /// Recipient interest (repeatable)
        #[arg(long = "interest", required = true)]
        interests: Vec<String>,

        /// Runtime configuration file (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Provider type, overriding the configuration
        #[arg(long)]
        provider: Option<String>,
    },
    /// Turn raw model output into gift ideas
    Normalize {
        /// File with the raw text (stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Generate ideas without a provider
    Fallback {
        #[arg(long)]
        occasion: String,

        /// Recipient interest (repeatable)
        #[arg(long = "interest")]
        interests: Vec<String>,
    },
    /// Manage saved ideas
    Saved {
        #[command(subcommand)]
        action: SavedAction,

        /// Store file
        #[arg(long, default_value = "giftwise-store.json")]
        store: PathBuf,
    },
}

#[derive(Subcommand)]
enum SavedAction {
    /// List saved ideas
    List,
    /// Save an idea, or remove it if already saved
    Toggle {
        #[arg(long)]
        title: String,

        #[arg(long)]
        desc: String,

        #[arg(long, default_value = giftwise_core::DEFAULT_BUDGET)]
        budget: String,

        #[arg(long = "like-meter", default_value = giftwise_core::DEFAULT_APPEAL)]
        like_meter: String,
    },
    /// Remove every saved idea
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            occasion,
            interests,
            config,
            provider,
        } => generate(occasion, interests, config, provider, cli.json).await,
        Commands::Normalize { file } => normalize(file, cli.json),
        Commands::Fallback {
            occasion,
            interests,
        } => {
            let ideas = DeterministicFallbackGenerator::new().generate(&occasion, &interests);
            print_ideas(&ideas, cli.json)
        }
        Commands::Saved { action, store } => saved(action, &store, cli.json),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn generate(
    occasion: String,
    interests: Vec<String>,
    config_path: Option<PathBuf>,
    provider: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => RuntimeConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    if let Some(provider) = provider {
        config.provider = provider;
    }

    let request = GiftRequest::new(occasion, interests);
    let service = GiftService::from_config(config, &ProviderRegistry::with_defaults())
        .context("Failed to set up provider")?;

    match service.generate(&request).await {
        Ok(response) => print_response(&response, json),
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&e.to_body())?);
            }
            let status = e.status_code();
            Err(e).context(format!("Failed to generate gift ideas (status {})", status))
        }
    }
}

fn normalize(file: Option<PathBuf>, json: bool) -> Result<()> {
    let raw = match &file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let normalized = ResponseNormalizer::new().normalize_detailed(&raw);
    if !normalized.layer.is_extracted() {
        tracing::warn!("No gift ideas found in input, showing sample ideas");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        Ok(())
    } else {
        println!("Parsed with: {:?}", normalized.layer);
        print_ideas(&normalized.ideas, false)
    }
}

fn saved(action: SavedAction, store: &Path, json: bool) -> Result<()> {
    let mut ideas = SavedIdeas::load(store)
        .with_context(|| format!("Failed to load saved ideas from {}", store.display()))?;

    match action {
        SavedAction::List => {
            if json {
                println!("{}", serde_json::to_string_pretty(&ideas)?);
            } else if ideas.is_empty() {
                println!("No saved ideas.");
            } else {
                for (i, saved) in ideas.iter().enumerate() {
                    print_idea(i + 1, &saved.idea);
                    println!("   id: {}  saved: {}", saved.id, saved.saved_at.format("%Y-%m-%d %H:%M"));
                }
            }
            return Ok(());
        }
        SavedAction::Toggle {
            title,
            desc,
            budget,
            like_meter,
        } => {
            let idea = GiftIdea::new(title, desc, budget, like_meter);
            let outcome = ideas.toggle(&idea);
            match outcome {
                SaveOutcome::Saved => println!("Saved \"{}\"", idea.title),
                SaveOutcome::Removed => println!("Removed \"{}\"", idea.title),
            }
        }
        SavedAction::Clear => {
            let count = ideas.len();
            ideas.clear();
            println!("Cleared {} saved idea(s)", count);
        }
    }

    ideas
        .store(store)
        .with_context(|| format!("Failed to write saved ideas to {}", store.display()))
}

fn print_response(response: &GiftResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    if let Some(reason) = response.fallback_reason {
        println!("Provider unavailable ({}), showing generated ideas.\n", reason);
    }
    print_ideas(&response.gift_ideas, false)
}

fn print_ideas(ideas: &[GiftIdea], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(ideas)?);
        return Ok(());
    }

    for (i, idea) in ideas.iter().enumerate() {
        print_idea(i + 1, idea);
    }
    Ok(())
}

fn print_idea(index: usize, idea: &GiftIdea) {
    println!("{}. {} {}", index, gift_emoji(&idea.title), idea.title);
    println!("   {}", idea.description);
    println!(
        "   Budget: {}  Like meter: {}%",
        idea.budget_tier,
        appeal_percentage(&idea.appeal_score)
    );
}
