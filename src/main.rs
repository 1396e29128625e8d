use log::info;
use movie_scout::services::MoviePipeline;
use movie_scout::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_scout=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let query: Vec<String> = std::env::args().skip(1).collect();
    if query.is_empty() {
        eprintln!("usage: movie-scout <free-text query>");
        return Ok(());
    }
    let query = query.join(" ");

    info!("Loading configuration...");
    let config = Config::from_env()?;
    let pipeline = MoviePipeline::new(&config);

    let today = chrono::Local::now().date_naive();
    let outcome = pipeline.handle_user_turn(&query, None, today).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
