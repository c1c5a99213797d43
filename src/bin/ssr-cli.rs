use std::path::PathBuf;

use clap::{Parser, Subcommand};

use site_ssr::config::load_effective;
use site_ssr::news::normalize_payload;
use site_ssr::SsrPipeline;

#[derive(Parser)]
#[command(name = "ssr-cli")]
#[command(about = "Inspect what crawlers will see for a news page", long_about = None)]
struct Cli {
    /// TOML configuration file (also SITE_SSR_CONFIG).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the patched HTML for a news id
    Render { id: String },
    /// Print the resolved share metadata as JSON
    Lookup { id: String },
    /// List the ids and slugs the upstream currently serves
    List,
    /// Validate and print the effective configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_effective(cli.config.as_deref())?;

    match cli.command {
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Render { id } => {
            let pipeline = SsrPipeline::from_config(&config)?;
            let rendered = pipeline.render(&id).await;
            if rendered.fallback {
                eprintln!("warning: fallback page served");
            }
            println!("{}", rendered.html);
        }
        Commands::Lookup { id } => {
            let pipeline = SsrPipeline::from_config(&config)?;
            let meta = pipeline.lookup(&id).await;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Commands::List => {
            let pipeline = SsrPipeline::from_config(&config)?;
            let fetcher = pipeline.fetcher();
            eprintln!(
                "fetching {} via {} strategies",
                fetcher.news_url(),
                fetcher.strategies().len()
            );
            let payload = fetcher.fetch().await?;
            for item in normalize_payload(&payload) {
                println!(
                    "{}\t{}\t{}",
                    item.id.as_deref().unwrap_or("-"),
                    item.slug.as_deref().unwrap_or("-"),
                    item.title.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}
