use chrono::Utc;
use clap::Parser;
use etl_api_dag::app::tasks::SUMMARY_TASK_ID;
use etl_api_dag::config::cli::LogFormat;
use etl_api_dag::utils::error::{EtlError, ErrorSeverity};
use etl_api_dag::utils::{logger, validation::Validate};
use etl_api_dag::{build_dag, CliConfig, Dag, DagConfig, EtlEngine, LocalStorage, RunContext};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(),
    }

    tracing::info!("Starting etl-api-dag");
    tracing::debug!("CLI config: {:?}", cli);

    let config = match DagConfig::resolve(cli.overrides()).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let storage = LocalStorage::new(config.base_dir.clone());
    let dag = match build_dag(&config, storage) {
        Ok(dag) => dag,
        Err(e) => fail(&e),
    };

    let run = match resolve_run(&cli, &dag) {
        Ok(run) => run,
        Err(e) => fail(&e),
    };

    if cli.dry_run {
        print_dry_run(&dag, &config, &run);
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let engine = EtlEngine::new_with_monitoring(dag, cli.monitor);
    let result = match engine.run(run).await {
        Ok(result) => result,
        Err(e) => fail(&e),
    };

    for ti in &result.task_instances {
        tracing::debug!("{}: {} ({:?})", ti.task_id, ti.state, ti.duration);
    }

    match result.failed_task() {
        None => {
            println!("✅ DAG run {} succeeded", result.run.run_id);
            if let Some(summary) = result.xcom.pull(SUMMARY_TASK_ID) {
                println!("{}", serde_json::to_string_pretty(summary)?);
            }
            Ok(())
        }
        Some(failed) => {
            eprintln!("❌ Task {} failed", failed.task_id);
            match &failed.error {
                Some(e) => fail(e),
                None => std::process::exit(1),
            }
        }
    }
}

fn resolve_run(cli: &CliConfig, dag: &Dag) -> etl_api_dag::Result<RunContext> {
    let mut run = match cli.parsed_execution_date()? {
        Some(date) => RunContext::manual(dag.dag_id.clone(), date),
        None => {
            let date = dag.schedule.latest_logical_date(Utc::now(), dag.start_date)?;
            RunContext::scheduled(dag.dag_id.clone(), date)
        }
    };
    if let Some(run_id) = &cli.run_id {
        run.run_id = run_id.clone();
    }
    Ok(run)
}

fn print_dry_run(dag: &Dag, config: &DagConfig, run: &RunContext) {
    println!("📋 DAG: {} ({})", dag.dag_id, dag.description);
    println!("  Schedule: {} (catchup: {})", dag.schedule, dag.catchup);
    println!("  Start date: {}", dag.start_date);
    println!("  API URL: {}", config.api_url);
    println!("  Base dir: {}", config.base_dir);
    println!("  Timeout: {}s", config.timeout_seconds);
    println!("  Run ID: {}", run.run_id);
    println!("  Execution date: {}", run.execution_date);
    println!();
    println!("🔗 Task order:");
    match dag.topological_order() {
        Ok(order) => {
            for (i, task) in order.iter().enumerate() {
                let upstream = dag.upstream_of(task.task_id());
                if upstream.is_empty() {
                    println!("  {}. {}", i + 1, task.task_id());
                } else {
                    println!("  {}. {} (after {})", i + 1, task.task_id(), upstream.join(", "));
                }
            }
        }
        Err(e) => println!("  ❌ {}", e),
    }
    println!();
    println!("🔍 Dry run only, nothing was executed.");
}

fn fail(e: &EtlError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
