use std::sync::Arc;

use clap::{Parser, Subcommand};

use extbot::application::errors::BotError;
use extbot::application::lifecycle::{outcome_message, LifecycleManager};
use extbot::domain::entities::{OpKind, Outcome};
use extbot::infrastructure::config::{self, Config};
use extbot::infrastructure::discord::DiscordPlatform;
use extbot::infrastructure::extensions::LiveRegistry;

#[derive(Parser)]
#[command(name = "extbot")]
#[command(about = "A Discord bot that manages its own extensions at runtime", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(cli.config) {
                tracing::error!("Fatal: {e}");
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("extbot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            if let Err(e) = init_config() {
                tracing::error!("Failed to write config: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn init_config() -> Result<(), BotError> {
    let config = Config::default();
    let yaml = serde_yaml::to_string(&config)
        .map_err(|e| BotError::Platform(format!("serialize default config: {e}")))?;
    std::fs::write("config.yaml", yaml)
        .map_err(|e| BotError::Platform(format!("write config.yaml: {e}")))?;
    println!("Wrote default configuration to config.yaml");
    Ok(())
}

fn run_bot(config_path: String) -> Result<(), BotError> {
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {e}, using defaults");
            Config::default()
        })
    } else {
        Config::default()
    };

    tracing::info!("Starting extbot: {}", config.bot.name);

    // Required configuration is read before anything else happens; a missing
    // value aborts startup with no partial side effects.
    let token = config::bot_token()?;
    let guild_id = config::test_guild()?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Platform(format!("Failed to start runtime: {e}")))?;

    rt.block_on(async {
        let registry = LiveRegistry::new(&config.extensions.directory);
        let manager = Arc::new(LifecycleManager::new(registry));

        load_all_extensions(&manager).await;

        let mut platform =
            DiscordPlatform::new(token, guild_id, manager, config.bot.name.clone());
        platform.connect().await?;

        tokio::select! {
            _ = platform.wait() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
            }
        }
        platform.shutdown().await;

        Ok(())
    })
}

/// Load every discoverable extension concurrently. A single failure is
/// logged and skipped; the bot starts with whatever did load.
async fn load_all_extensions(manager: &Arc<LifecycleManager<LiveRegistry>>) {
    let names = match manager.candidates(OpKind::Load).await {
        Ok(names) => names,
        Err(e) => {
            tracing::warn!("Failed to scan extensions directory: {e}");
            return;
        }
    };

    let mut tasks = tokio::task::JoinSet::new();
    for name in names {
        let manager = Arc::clone(manager);
        tasks.spawn(async move {
            match manager.apply(OpKind::Load, &name).await {
                Outcome::Succeeded => {}
                other => tracing::warn!("{}", outcome_message(OpKind::Load, &name, &other)),
            }
        });
    }

    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::warn!("Extension load task failed: {e}");
        }
    }
}
