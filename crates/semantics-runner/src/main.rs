mod cli;

use crate::cli::Args;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use evm_semantics::{
    CallProvider,
    Harness,
    LocalProvider,
    RpcProvider,
    fixtures::SEMANTIC_TESTS,
    scenarios::{
        self,
        Observation,
        ScenarioStatus,
        SuiteReport,
    },
};
use serde_json::{
    Value,
    json,
};
use tracing::info;
use tracing_subscriber::{
    EnvFilter,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let success = match &args.rpc_url {
        Some(rpc_url) => {
            info!(%rpc_url, "Running scenarios against node");
            let provider = RpcProvider::connect(rpc_url.as_str()).await?;
            run(Harness::with_fixtures(provider)?, &args).await?
        }
        None => {
            info!(chain_id = args.chain_id, "Running scenarios against the in-process chain");
            let provider = LocalProvider::new(args.chain_config());
            run(Harness::with_fixtures(provider)?, &args).await?
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

/// Runs the suite and prints the report. Returns whether every scenario passed.
async fn run<P: CallProvider>(harness: Harness<P>, args: &Args) -> Result<bool> {
    let report = scenarios::run_suite(&harness, args.suite_options()).await?;

    let return_length_limit = if args.probe_return_length {
        let address = harness.deploy(SEMANTIC_TESTS).await?;
        scenarios::find_return_length_limit(&harness, address, None).await?
    } else {
        None
    };

    if args.json {
        println!("{}", report_document(&report, return_length_limit));
    } else {
        print_report(&report);
        if args.probe_return_length {
            match return_length_limit {
                Some(limit) => {
                    println!(
                        "\nLargest view call return length: {}",
                        limit.to_string().bold()
                    )
                }
                None => {
                    println!(
                        "\n{}",
                        "No view call return length fits the gas limit".yellow()
                    )
                }
            }
        }
    }

    Ok(report.is_success())
}

/// The single JSON document printed with `--json`.
fn report_document(report: &SuiteReport, return_length_limit: Option<usize>) -> Value {
    json!({
        "status": if report.is_success() { "success" } else { "failure" },
        "report": report,
        "return_length_limit": return_length_limit,
    })
}

fn print_report(report: &SuiteReport) {
    println!("{}", format!("Scenarios on chain {}", report.chain_id).bold());
    for scenario in &report.scenarios {
        match scenario.status {
            ScenarioStatus::Passed => {
                let detail = match &scenario.observation {
                    Some(Observation::Reverted { revert }) => revert.to_string(),
                    Some(Observation::ReturnLength { returned, overflow }) => {
                        format!("returned {returned} bytes, then: {overflow}")
                    }
                    None => String::new(),
                };
                println!("  {} {} {}", "PASS".green().bold(), scenario.name, detail.dimmed());
            }
            ScenarioStatus::Failed => {
                println!(
                    "  {} {}: {}",
                    "FAIL".red().bold(),
                    scenario.name,
                    scenario.error.as_deref().unwrap_or_default()
                );
            }
            ScenarioStatus::Skipped => {
                println!(
                    "  {} {} ({})",
                    "SKIP".yellow(),
                    scenario.name,
                    scenario.disabled_reason.unwrap_or("disabled")
                );
            }
        }
    }

    let summary = format!(
        "{} passed, {} failed, {} skipped",
        report.count(ScenarioStatus::Passed),
        report.count(ScenarioStatus::Failed),
        report.count(ScenarioStatus::Skipped),
    );
    if report.is_success() {
        println!("\n{}", summary.green());
    } else {
        println!("\n{}", summary.red());
    }
}
