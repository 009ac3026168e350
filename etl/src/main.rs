use clap::{Arg, ArgMatches, Command};
use common::config::DEFAULT_CONFIG_PATH;
use etl::logging::{self, LogFormat};
use etl::pipeline::RunReport;
use std::path::Path;
use std::process;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file")
}

fn report_arg() -> Arg {
    Arg::new("report")
        .long("report")
        .value_name("FILE")
        .help("Writes a JSON run report to FILE")
}

fn config_path(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_CONFIG_PATH)
}

fn finish(matches: &ArgMatches, result: common::Result<RunReport>, label: &str) {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{} error: {}", label, e);
            process::exit(1);
        }
    };

    println!(
        "{} finished: {} statements committed, {} failed",
        label,
        report.committed_count(),
        report.failed_count()
    );
    for phase in &report.phases {
        for failure in &phase.failures {
            println!("  [{}] {}: {}", phase.phase, failure.statement, failure.error);
        }
    }

    if let Some(path) = matches.get_one::<String>("report") {
        if let Err(e) = report.write_to(Path::new(path)) {
            eprintln!("Failed to write report to {}: {}", path, e);
            process::exit(1);
        }
        println!("Run report written to {}", path);
    }
}

#[tokio::main]
async fn main() {
    let matches = Command::new("Warehouse ETL")
        .version("1.0")
        .about("Loads song and event data into the warehouse star schema")
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .value_parser(["text", "json"])
                .default_value("text")
                .global(true)
                .help("Log output format"),
        )
        .subcommand(
            Command::new("etl")
                .about("Copy raw data into staging tables, then insert into the star schema")
                .arg(config_arg())
                .arg(report_arg()),
        )
        .subcommand(
            Command::new("create-tables")
                .about("Drop and recreate all staging and star-schema tables")
                .arg(config_arg())
                .arg(report_arg()),
        )
        .subcommand(
            Command::new("run")
                .about("Recreate all tables, then run the ETL")
                .arg(config_arg())
                .arg(report_arg()),
        )
        .subcommand(
            Command::new("check-sources")
                .about("Count the objects under each configured S3 location")
                .arg(config_arg()),
        )
        .get_matches();

    let log_format = matches
        .get_one::<String>("log-format")
        .map(|s| LogFormat::from_name(s))
        .unwrap_or(LogFormat::Text);
    logging::init(log_format);

    match matches.subcommand() {
        Some(("etl", etl_matches)) => {
            let config_path = config_path(etl_matches);
            println!("Starting ETL pipeline with config: {}", config_path);
            let result = etl::run_etl_pipeline(config_path).await;
            finish(etl_matches, result, "ETL pipeline");
        }
        Some(("create-tables", create_matches)) => {
            let config_path = config_path(create_matches);
            println!("Recreating tables with config: {}", config_path);
            let result = etl::run_create_tables(config_path).await;
            finish(create_matches, result, "Create tables");
        }
        Some(("run", run_matches)) => {
            let config_path = config_path(run_matches);
            println!("Starting full pipeline with config: {}", config_path);
            let result = etl::run_full_pipeline(config_path).await;
            finish(run_matches, result, "Full pipeline");
        }
        Some(("check-sources", check_matches)) => {
            let config_path = config_path(check_matches);
            match etl::run_source_check(config_path).await {
                Ok(checks) => {
                    for check in &checks {
                        println!("{:<14} {:>8} objects  {}", check.name, check.objects, check.uri);
                    }
                    if checks.iter().any(|c| c.is_empty()) {
                        println!("Some source locations are empty; COPY will load nothing from them");
                    }
                }
                Err(e) => {
                    eprintln!("Source check error: {}", e);
                    process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}
