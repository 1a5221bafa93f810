use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use imgur_client::ImgurClient;
use nba_stats_client::StatsClient;
use reddit_client::{Credentials, RedditClient};
use shotbot_common::{ChartKind, Config};
use shotbot_worker::chart::CommandChartGenerator;
use shotbot_worker::directory::EntityDirectory;
use shotbot_worker::orchestrator::{BotDeps, RequestOrchestrator};
use shotbot_worker::resolver::EntityResolver;
use shotbot_worker::sources::{StatsEntitySource, SubredditFeed};
use shotbot_worker::store::{MemoryStore, RedisStore};
use shotbot_worker::traits::{ChartGenerator, KeyValueStore};

#[derive(Parser)]
#[command(name = "shotbot", about = "Answers [[First Last]] requests on Reddit with shot charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the subreddit and reply to chart requests (default)
    Run {
        /// Run a single iteration and exit
        #[arg(long)]
        once: bool,
        /// Keep the cache and dedup markers in memory instead of Redis
        #[arg(long)]
        no_redis: bool,
    },
    /// Render one chart locally without uploading or caching it
    Generate {
        /// Player name in "First Last" form
        name: String,
        #[arg(long, default_value_t = ChartKind::Scatter)]
        kind: ChartKind,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("shotbot=info".parse()?))
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run {
        once: false,
        no_redis: false,
    }) {
        Command::Run { once, no_redis } => run(once, no_redis).await,
        Command::Generate { name, kind } => generate(&name, kind).await,
    }
}

async fn run(once: bool, no_redis: bool) -> Result<()> {
    info!("Shotbot starting...");
    let config = Config::from_env();
    config.log_redacted();

    let store: Arc<dyn KeyValueStore> = if no_redis {
        warn!("Running without Redis, cache and dedup markers are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(RedisStore::connect(&config.redis_url).await?)
    };

    let reddit = Arc::new(RedditClient::new(Credentials {
        client_id: config.reddit_client_id.clone(),
        client_secret: config.reddit_client_secret.clone(),
        username: config.reddit_username.clone(),
        password: config.reddit_password.clone(),
        user_agent: config.reddit_user_agent.clone(),
    }));
    let feed = Arc::new(
        SubredditFeed::new(reddit, &config.subreddit).skip_author(&config.reddit_username),
    );

    let deps = BotDeps::builder()
        .comments(feed.clone())
        .replies(feed)
        .entities(Arc::new(StatsEntitySource::new(StatsClient::new(&config.nba_season))))
        .generator(Arc::new(CommandChartGenerator::new(
            &config.renderer_bin,
            &config.save_path,
        )))
        .uploader(Arc::new(ImgurClient::new(config.imgur_client_id.clone())))
        .store(store)
        .generate_timeout(config.generate_timeout)
        .upload_timeout(config.upload_timeout)
        .mark_policy(config.mark_policy)
        .build();
    let orchestrator = RequestOrchestrator::new(deps);

    if once {
        let stats = orchestrator.run_iteration().await?;
        info!("{stats}");
        return Ok(());
    }

    tokio::select! {
        _ = orchestrator.run(config.sleep_interval) => {}
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }
    Ok(())
}

async fn generate(name: &str, kind: ChartKind) -> Result<()> {
    let config = Config::generate_from_env();

    let source = Arc::new(StatsEntitySource::new(StatsClient::new(&config.nba_season)));
    let directory = EntityDirectory::new(source, Arc::new(MemoryStore::new()));
    let resolver = EntityResolver::new(Arc::new(directory));

    let entity = resolver
        .resolve(name)
        .await?
        .with_context(|| format!("No player matches {name:?}"))?;

    let generator = CommandChartGenerator::new(&config.renderer_bin, &config.save_path);
    match generator.generate(&entity, kind).await? {
        Some(path) => {
            println!("{}", path.display());
            println!("{} ({})", entity.canonical_name, entity.entity_id);
        }
        None => println!("No shot data for {} ({})", entity.canonical_name, entity.entity_id),
    }
    Ok(())
}
