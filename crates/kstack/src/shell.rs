// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kstack shell` command implementation.
//!
//! Interactive REPL that routes each line and prints the action, the
//! reason, and the template surface. `/status` shows the K-lens state.

use colored::Colorize;
use kstack_core::KStackError;
use kstack_router::{KRouter, RouteAction, RouteResult};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Runs the `kstack shell` interactive REPL.
pub async fn run_shell(router: KRouter) -> Result<(), KStackError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| KStackError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "kstack shell".bold().green());
    println!(
        "{} templates loaded, K-lens {}",
        router.corpus().len(),
        lens_label(&router)
    );
    println!("Type {} to exit, {} for K-lens state.\n", "/quit".yellow(), "/status".yellow());

    let prompt = format!("{}> ", "kstack".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed == "/status" {
                    print_status(&router).await;
                    continue;
                }

                let result = router.route(trimmed).await;
                print_result(&result);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

fn lens_label(router: &KRouter) -> &'static str {
    match router.lens() {
        Some(lens) if lens.is_ready() => "ready",
        Some(_) => "unavailable",
        None => "disabled",
    }
}

async fn print_status(router: &KRouter) {
    let Some(lens) = router.lens() else {
        println!("{}", "K-lens disabled (keyword classification only)".dimmed());
        return;
    };
    let state = lens.state().await;
    println!(
        "ready={} loading={} available={} progress={:?}",
        state.ready, state.loading, state.available, state.progress
    );
    if let Some(error) = state.error {
        println!("{}", error.red());
    }
}

fn print_result(result: &RouteResult) {
    let action = match result.action {
        RouteAction::Template => result.action.to_string().green(),
        RouteAction::Generate => result.action.to_string().yellow(),
        RouteAction::Escalate => result.action.to_string().magenta(),
    };
    println!("{} {}", action.bold(), result.reason.dimmed());
    if let Some(surface) = &result.surface {
        println!("{surface}");
    }
    println!();
}
