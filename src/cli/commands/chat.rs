//! Interactive chat command: login followed by the assistant REPL.

use crate::assistant::{ChatSession, ToolContext};
use crate::catalog::SqliteCatalog;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::covers::CoverClient;
use console::style;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

/// Run the interactive chat command.
pub async fn run_chat(
    member_id: i64,
    name: &str,
    model: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'lese doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let catalog = Arc::new(SqliteCatalog::open(&settings.sqlite_path())?);

    // Authentication failure is user-facing text, not a crash
    let member = match catalog.find_member_by_credentials(member_id, name)? {
        Some(member) => member,
        None => {
            Output::error("Login failed. Name or ID is incorrect.");
            Output::info("New here? Sign up with: lese signup <name> <email>");
            return Ok(());
        }
    };

    let model = model.unwrap_or_else(|| settings.assistant.model.clone());
    let covers = CoverClient::new(&settings.covers);
    let tools = ToolContext::new(catalog, covers, member.clone());

    let mut session = ChatSession::new(
        tools,
        &model,
        settings.assistant.max_tool_iterations,
        Duration::from_secs(settings.assistant.request_timeout_seconds),
    )?;

    println!("\n{}", style("Lese Chat").bold().cyan());
    println!(
        "{}",
        style(format!("Logged in as {} (Member ID {})", member.name, member.id)).green()
    );
    println!(
        "{}\n",
        style("Ask about books or your account. Type 'exit' to quit, 'clear' to reset.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let turn = session.send_message(input).await;
        spinner.finish_and_clear();

        match turn {
            Ok(response) => {
                for record in &response.tool_calls {
                    println!("{}", style(format!("  [{}]", record.name)).dim());
                }
                println!("\n{} {}\n", style("Leo:").cyan().bold(), response.content);
            }
            Err(e) => {
                // Turn failed; the session survives so the user can retry
                Output::error(&format!("{}", e));
            }
        }
    }

    Ok(())
}
