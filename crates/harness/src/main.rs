// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `smoke` binary entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use smoke_harness::cli::{Cli, Command, RunArgs, ScaffoldArgs};
use smoke_harness::{env, runner, HarnessConfig, Scenario, SmokeTest};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Scaffold(args) => scaffold(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::new(env::log_filter().unwrap_or_else(|| "warn".to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: RunArgs) -> Result<ExitCode> {
    let scenario = load(&args.scenario)?;
    let tool = runner::resolve_tool(args.tool.as_deref(), &scenario);
    let config = args.apply(runner::configure(&scenario, HarnessConfig::from_env()));

    let report = runner::run(&scenario, tool, config).await?;
    for step in &report.steps {
        match &step.result {
            Ok(_) => println!("PASS: {}", step.name),
            Err(e) => {
                println!("FAIL: {}", step.name);
                eprintln!("{e}");
            }
        }
    }
    for name in &report.skipped {
        println!("SKIP: {name}");
    }

    Ok(if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn scaffold(args: ScaffoldArgs) -> Result<ExitCode> {
    let scenario = load(&args.scenario)?;
    let tool = runner::resolve_tool(None, &scenario);
    let mut test = match args.dir {
        Some(dir) => SmokeTest::in_dir(tool, dir),
        None => SmokeTest::new(tool)?,
    };
    let config = test.config().clone().with_keep_scaffold(true);
    test = test.with_config(config);

    let layout = test.do_run(&scenario.project)?;
    println!("{}", layout.project_dir().display());
    Ok(ExitCode::SUCCESS)
}

fn load(path: &std::path::Path) -> Result<Scenario> {
    Scenario::load(path).with_context(|| format!("failed to load scenario {}", path.display()))
}
