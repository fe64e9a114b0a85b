use std::io::Write;
use std::process;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{info, warn};

mod cli;
mod config;

use crate::cli::Cli;
use crate::config::{ConfigError, SpecConfig};
use ucsinv_io_xlsx::{ReportError, generate_report};
use ucsinv_ucsm::UcsmClient;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = ucsinv_log::init_logging(cli.derive_log_level().as_deref()) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(2);
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = if e.downcast_ref::<ConfigError>().is_some() {
            2
        } else if e.downcast_ref::<ReportError>().is_some() {
            3
        } else {
            // login and transport failures
            1
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SpecConfig::from_path(&cli.config)?;
    let path_file_out = cli.output.clone().unwrap_or_else(|| config.filename.clone());
    let connection = config.connection(cli.passwd.as_deref())?;
    let mut client = UcsmClient::new(connection)?;
    let c_uri = client.uri().to_string();

    print!("Connecting to UCSM at {} as {} ......", config.host, config.name);
    std::io::stdout().flush()?;
    if let Err(err) = client.login() {
        println!("FAIL");
        return Err(err).with_context(|| format!("login to {c_uri} failed"));
    }
    println!("Success");

    println!("Generating Workbook file {}", path_file_out.display());
    let result = generate_report(
        &mut client,
        &path_file_out,
        &config.tabs,
        &config.report_options(),
    );
    if let Err(err) = client.logout() {
        warn!(error = %err, "logout failed");
    }

    let report =
        result.with_context(|| format!("cannot generate {}", path_file_out.display()))?;
    for c_warning in &report.warnings {
        warn!("{c_warning}");
    }
    info!("{report}");
    Ok(())
}
