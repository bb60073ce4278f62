// SPDX-FileCopyrightText: 2026 K-Stack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! K-Stack - template-first query router.
//!
//! This is the binary entry point. Each subcommand loads configuration,
//! assembles the router, and reports the routing decision.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod shell;

use clap::{Args, Parser, Subcommand};
use kstack_core::{Rank, Voice};

use crate::app::RouterOptions;

/// K-Stack - decide template, generate, or escalate before any generation happens.
#[derive(Parser, Debug)]
#[command(name = "kstack", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Route one query and print the action, reason, and surface.
    Route {
        text: String,
        #[command(flatten)]
        routing: RoutingArgs,
    },
    /// Classify one query into a K-vector.
    Classify {
        text: String,
        /// Skip the semantic classifier.
        #[arg(long)]
        keyword_only: bool,
        /// Print the K-code for this rank (A, 2-10, J, Q, K).
        #[arg(long)]
        rank: Option<Rank>,
    },
    /// List the loaded template corpus.
    Templates,
    /// Launch an interactive routing REPL.
    Shell {
        #[command(flatten)]
        routing: RoutingArgs,
    },
}

/// Flags shared by `route` and `shell`.
#[derive(Args, Debug, Default)]
struct RoutingArgs {
    /// Fully-local mode: never escalate.
    #[arg(long)]
    local: bool,
    /// Skip the semantic classifier.
    #[arg(long)]
    keyword_only: bool,
    /// Voice variant for template responses.
    #[arg(long)]
    voice: Option<Voice>,
}

impl From<RoutingArgs> for RouterOptions {
    fn from(args: RoutingArgs) -> Self {
        RouterOptions {
            local: args.local,
            keyword_only: args.keyword_only,
            voice: args.voice,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match kstack_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            kstack_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Route { text, routing }) => {
            match app::build_router(&config, &routing.into()).await {
                Ok(router) => {
                    let result = router.route(&text).await;
                    print!("{}", app::format_route(&result));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::Classify {
            text,
            keyword_only,
            rank,
        }) => {
            let options = RouterOptions {
                keyword_only,
                ..RouterOptions::default()
            };
            match app::build_router(&config, &options).await {
                Ok(router) => {
                    let (kvector, source) = router.detect(&text).await;
                    println!("{}", app::format_classification(&kvector, source, rank));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::Templates) => {
            match kstack_router::TemplateCorpus::from_config(&config.corpus) {
                Ok(corpus) => {
                    print!("{}", app::format_templates(&corpus));
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Some(Commands::Shell { routing }) => {
            match app::build_router(&config, &routing.into()).await {
                Ok(router) => shell::run_shell(router).await,
                Err(e) => Err(e),
            }
        }
        None => {
            println!("kstack: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kstack={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
