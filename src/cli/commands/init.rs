//! Init command - create and seed the catalog database.

use crate::catalog::SqliteCatalog;
use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Run the init command: set up directories and seed the catalog.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lese Setup");
    println!();

    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }

    let db_path = settings.sqlite_path();
    let existed = db_path.exists();

    let catalog = SqliteCatalog::open(&db_path)?;
    catalog.seed_demo_data()?;

    if existed {
        Output::success("Reset catalog database with demo data.");
    } else {
        Output::success(&format!("Created catalog database: {}", db_path.display()));
    }

    println!();
    println!("{}", style("Demo login credentials").bold());
    Output::kv("Admin", "name 'Admin', member ID 0");
    Output::kv("Member", "name 'Taha', member ID 1");
    println!();

    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY is not set; the chat assistant needs it.");
        println!(
            "  Set it in your shell configuration: {}",
            style("export OPENAI_API_KEY='sk-...'").green()
        );
    }

    Output::info("Try: lese chat --member-id 1 --name Taha");

    Ok(())
}
