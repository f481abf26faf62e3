// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::sync::Arc;
use std::time::Instant;
use the_reasoner::config::load_scenario;
use the_reasoner::resolution::{Answer, Reasoner, ResolutionRecorder};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

/// Prints an answer and, below it, every sub-answer it was derived from.
fn print_derivation(answer: &Answer, depth: usize) {
    for (resolver, sub_answer) in answer.derivation().answers() {
        println!(
            "{}└─ {} via {} [{}]",
            "   ".repeat(depth),
            sub_answer.concept_map(),
            sub_answer.pattern(),
            resolver
        );
        print_derivation(sub_answer, depth + 1);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|arg| arg == "--json");
    let Some(scenario_file) = args.iter().skip(1).find(|arg| !arg.starts_with("--")) else {
        eprintln!("Usage: {} <scenario.yaml> [--json]", args[0]);
        eprintln!("Example: {} configs/family.yaml", args[0]);
        std::process::exit(1);
    };

    let scenario = load_scenario(scenario_file)
        .with_context(|| format!("failed to load scenario {}", scenario_file))?;
    let query = scenario.query()?;
    let recorder = Arc::new(ResolutionRecorder::new());
    let reasoner = Reasoner::new(
        Arc::new(scenario.graph()?),
        scenario.rules()?,
        &scenario.config,
        Handle::current(),
    )?
    .with_recorder(recorder.clone());

    if !json {
        println!("🔎 Query: {}", query);
        for rule in reasoner.rules() {
            println!("📐 Rule {}: {} => {}", rule.label(), rule.when(), rule.then());
        }
        println!("═══════════════════════════════════");
    }

    let start = Instant::now();
    let mut answers = reasoner.query(query)?;
    let mut count = 0;
    while let Some(answer) = answers.next_async().await {
        let answer = answer?;
        count += 1;
        if json {
            println!("{}", serde_json::to_string(&answer)?);
            continue;
        }
        let marker = if answer.is_inferred() { "💡" } else { "📄" };
        println!("{} {}", marker, answer.concept_map());
        print_derivation(&answer, 1);
    }

    if !json {
        println!();
        println!(
            "✅ {} answers ({} inferred) in {:?}",
            count,
            recorder.len(),
            start.elapsed()
        );
    }
    Ok(())
}
