use clap::{Parser, Subcommand};
use tracing::{error, info};

use faculty_scraper::config::Config;
use faculty_scraper::directory::{DirectoryLookup, HttpDirectoryClient};
use faculty_scraper::logging;
use faculty_scraper::pipeline::HarvestPipeline;
use faculty_scraper::types::{FacultyName, RecordOutcome};
use faculty_scraper::warehouse::Warehouse;

const SNAPSHOT_DIR: &str = "snapshots";

#[derive(Parser)]
#[command(name = "faculty_scraper")]
#[command(about = "Faculty catalog scraper and people-directory cross-referencer")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract faculty records for configured catalog years
    Harvest {
        /// Academic-year label to harvest (e.g. "2015-16"); all years if omitted
        #[arg(long)]
        year: Option<String>,
    },
    /// Look up a single name in the online directory
    Lookup {
        /// Name in "First Last" form
        #[arg(long)]
        name: String,
    },
    /// Concatenate per-year snapshots into the warehouse CSV
    Assemble {
        #[arg(long, default_value = "output/faculty.csv")]
        output: String,
    },
    /// Harvest all years, then assemble the warehouse
    Run {
        #[arg(long, default_value = "output/faculty.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Harvest { year } => {
            harvest(&config, year.as_deref()).await?;
        }
        Commands::Lookup { name } => {
            lookup_one(&config, &name).await?;
        }
        Commands::Assemble { output } => {
            assemble(&output)?;
        }
        Commands::Run { output } => {
            harvest(&config, None).await?;
            assemble(&output)?;
        }
    }

    Ok(())
}

async fn harvest(config: &Config, year: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let sources: Vec<_> = config
        .catalogs
        .iter()
        .filter(|source| year.map_or(true, |label| source.label == label))
        .cloned()
        .collect();

    if sources.is_empty() {
        println!("⚠️  No catalog configured for the requested year");
        return Ok(());
    }

    let client = HttpDirectoryClient::new(&config.directory)?;
    let lookup = DirectoryLookup::new(Box::new(client), &config.directory)?;
    let pipeline = HarvestPipeline::new(config.clone(), lookup, SNAPSHOT_DIR);

    for source in &sources {
        let span = tracing::info_span!("Harvesting catalog", year = %source.label);
        let _enter = span.enter();

        match pipeline.harvest_year(source).await {
            Ok(result) => {
                info!("Harvest finished for {}", result.academic_year);
                println!("\n📊 Harvest results for {}:", result.academic_year);
                println!("   Total names: {}", result.total_names);
                println!("   Linked from catalog: {}", result.linked_from_catalog);
                println!("   Resolved via directory: {}", result.resolved_from_directory);
                println!("   Ambiguous: {}", result.ambiguous);
                println!("   Missing: {}", result.missing);
                println!("   Failed: {}", result.failed);
                println!("   Snapshot: {}", result.snapshot_file);

                if !result.diagnostics.is_empty() {
                    println!("\n⚠️  Diagnostics:");
                    for note in &result.diagnostics {
                        println!("   - {}", note);
                    }
                }
            }
            Err(e) => {
                error!("Harvest failed for {}: {}", source.label, e);
                println!("❌ Harvest failed for {}: {}", source.label, e);
            }
        }
    }

    Ok(())
}

async fn lookup_one(config: &Config, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (first, last) = match name.rsplit_once(' ') {
        Some(parts) => parts,
        None => ("", name),
    };
    let name = FacultyName::new(first, last);

    let client = HttpDirectoryClient::new(&config.directory)?;
    let lookup = DirectoryLookup::new(Box::new(client), &config.directory)?;

    println!("🔍 Looking up {}", name.display());
    match lookup.lookup(&name).await {
        RecordOutcome::Found { text, .. } => println!("✅ {}", text),
        RecordOutcome::Missing => println!("⚠️  No record found"),
        RecordOutcome::Ambiguous { text, chosen, discarded } => {
            println!("⚠️  Ambiguous: picked {} over {}", chosen, discarded.join(", "));
            match text {
                Some(text) => println!("✅ {}", text),
                None => println!("⚠️  No education section on the chosen profile"),
            }
        }
        RecordOutcome::Failed { reason } => println!("❌ Lookup failed: {}", reason),
    }

    Ok(())
}

fn assemble(output: &str) -> Result<(), Box<dyn std::error::Error>> {
    let warehouse = Warehouse::from_snapshots(SNAPSHOT_DIR)?;
    warehouse.to_csv(output)?;
    println!("📦 Assembled {} rows into {}", warehouse.rows().len(), output);
    Ok(())
}
