use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Export UCS Manager inventory to an XLSX workbook, one tab per configured class.
#[derive(Parser, Debug)]
#[command(name = "ucsinv", version, about)]
pub struct Cli {
    /// YAML config with credentials, output file and tabs
    #[arg(short, long, env = "UCSINV_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Output workbook (overrides `filename` from the config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Login password (overrides `passwd` from the config)
    #[arg(long, env = "UCSINV_PASSWD", hide_env_values = true)]
    pub passwd: Option<String>,

    /// Log filter directive, e.g. `info` or `ucsinv_ucsm=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Explicit `--log-level`, else a level implied by `-v`, else none.
    pub fn derive_log_level(&self) -> Option<String> {
        if let Some(level) = &self.log_level {
            return Some(level.clone());
        }
        match self.verbose {
            0 => None,
            1 => Some("info".to_string()),
            _ => Some("debug".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from(["ucsinv", "-c", "lab.yaml", "-o", "out.xlsx", "-vv"])
            .expect("parse");

        assert_eq!(cli.config, PathBuf::from("lab.yaml"));
        assert_eq!(cli.output, Some(PathBuf::from("out.xlsx")));
        assert_eq!(cli.derive_log_level().as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_log_level_beats_verbosity() {
        let cli = Cli::try_parse_from(["ucsinv", "-v", "--log-level", "trace"]).expect("parse");
        assert_eq!(cli.derive_log_level().as_deref(), Some("trace"));

        let cli = Cli::try_parse_from(["ucsinv", "-v"]).expect("parse");
        assert_eq!(cli.derive_log_level().as_deref(), Some("info"));
    }
}
