//! Doctor command - verify system requirements and configuration.

use crate::catalog::SqliteCatalog;
use crate::cli::Output;
use crate::config::Settings;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Lese Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    checks.push(check_api_key());
    checks.last().unwrap().print();
    println!();

    println!("{}", style("Catalog Database").bold());
    checks.push(check_database(settings));
    checks.last().unwrap().print();
    println!();

    println!("{}", style("Configuration").bold());
    checks.push(check_config());
    checks.last().unwrap().print();
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks
        .iter()
        .filter(|c| c.status == CheckStatus::Warning)
        .count();

    if errors > 0 {
        Output::error(&format!("{} check(s) failed.", errors));
    } else if warnings > 0 {
        Output::warning(&format!("{} warning(s); Lese should still work.", warnings));
    } else {
        Output::success("All checks passed!");
    }

    Ok(())
}

fn check_api_key() -> CheckResult {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => CheckResult::ok("OPENAI_API_KEY", "configured"),
        _ => CheckResult::error(
            "OPENAI_API_KEY",
            "not set",
            "export OPENAI_API_KEY='sk-...' (required for chat)",
        ),
    }
}

fn check_database(settings: &Settings) -> CheckResult {
    let path = settings.sqlite_path();
    if !path.exists() {
        return CheckResult::warning(
            "catalog",
            "database not found",
            "run 'lese init' to create and seed it",
        );
    }

    match SqliteCatalog::open(&path) {
        Ok(catalog) => match catalog.book_count() {
            Ok(count) => CheckResult::ok("catalog", &format!("{} books indexed", count)),
            Err(e) => CheckResult::error("catalog", &format!("unreadable: {}", e), "run 'lese init'"),
        },
        Err(e) => CheckResult::error("catalog", &format!("cannot open: {}", e), "run 'lese init'"),
    }
}

fn check_config() -> CheckResult {
    let path = Settings::default_config_path();
    if path.exists() {
        CheckResult::ok("config file", &format!("{}", path.display()))
    } else {
        CheckResult::warning(
            "config file",
            "not found (using defaults)",
            "run 'lese config edit' to create one",
        )
    }
}
