use std::path::PathBuf;
use std::process::ExitCode;

use argus_core::{load_config_from, setup_logging};
use argus_harness::{orchestrator, scenario, ChromeSessionFactory, Script};
use log::error;

const USAGE: &str = "Usage: argus [OPTIONS]

Drives a headless browser through a verification script against a running
web application and exits 0 on success, 1 on failure.

Options:
  --script <PATH>   JSON script to run (default: built-in saved-search scenario)
  --config <PATH>   Configuration file (default: argus.toml if present)
  -h, --help        Show this help
";

struct CliArgs {
    script: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs {
        script: None,
        config: None,
    };
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--script" => {
                let value = iter.next().ok_or("--script requires a path")?;
                parsed.script = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                parsed.config = Some(PathBuf::from(value));
            }
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(parsed)
}

#[tokio::main]
async fn main() -> ExitCode {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(args) => args,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("error: {}\n", message);
            }
            eprint!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_logging(&config.global.log_level) {
        eprintln!("error: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let script = match &args.script {
        Some(path) => match Script::load(path) {
            Ok(script) => script,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => scenario::saved_search(&config.target.url),
    };

    let factory = ChromeSessionFactory::new(config.clone());
    let result = orchestrator::run(&config, &factory, &script).await;

    if result.passed() {
        println!("PASS: {}", script.name);
        if let Some(path) = &result.artifact_path {
            println!("  screenshot: {}", path.display());
        }
        ExitCode::SUCCESS
    } else {
        println!("FAIL: {}", script.name);
        if let Some(step) = &result.failing_step {
            println!("  step:  {}", step);
        }
        if let Some(detail) = &result.error_detail {
            println!("  error: {}", detail);
        }
        if let Some(path) = &result.artifact_path {
            println!("  screenshot: {}", path.display());
        }
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_script_and_config_paths() {
        let args = parse_args(&[
            "--script".to_string(),
            "scripts/smoke.json".to_string(),
            "--config".to_string(),
            "ci.toml".to_string(),
        ])
        .unwrap();
        assert_eq!(args.script, Some(PathBuf::from("scripts/smoke.json")));
        assert_eq!(args.config, Some(PathBuf::from("ci.toml")));
    }

    #[test]
    fn rejects_unknown_flags_and_missing_values() {
        assert!(parse_args(&["--frobnicate".to_string()]).is_err());
        assert!(parse_args(&["--script".to_string()]).is_err());
    }
}
