/*
[INPUT]:  CLI arguments, environment, optional YAML configuration file
[OUTPUT]: PASS/FAIL report on stdout and a process exit status
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags or startup flow
*/

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use netledger_harness::{ConfigFile, HarnessConfig};

#[derive(Parser, Debug)]
#[command(name = "netledger-harness", version, about = "NetLedger server conformance harness")]
struct Cli {
    #[arg(long, env = "NETLEDGER_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,
    #[arg(long = "api-key", env = "NETLEDGER_API_KEY", value_name = "KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long = "timeout-secs", value_name = "SECS")]
    timeout_secs: Option<u64>,
    #[arg(long = "name-prefix", value_name = "PREFIX")]
    name_prefix: Option<String>,
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Split parsed values into the flag layer and the environment layer,
    /// so the config file can sit between them.
    fn layers(&self, matches: &ArgMatches) -> (ConfigFile, ConfigFile) {
        let from_env = |id: &str| matches.value_source(id) == Some(ValueSource::EnvVariable);
        let mut flags = ConfigFile {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            timeout_secs: self.timeout_secs,
            name_prefix: self.name_prefix.clone(),
        };
        let mut env = ConfigFile::default();
        if from_env("endpoint") {
            env.endpoint = flags.endpoint.take();
        }
        if from_env("api_key") {
            env.api_key = flags.api_key.take();
        }
        (flags, env)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = Cli::command().get_matches();
    let args = match Cli::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(err) => err.exit(),
    };
    init_tracing(&args.log_level)?;

    let file = match &args.config_path {
        Some(path) => load_config(path)?,
        None => ConfigFile::default(),
    };
    let (flags, env) = args.layers(&matches);
    let config = HarnessConfig::resolve(ConfigFile::layered(flags, file, env))?;
    info!(endpoint = %config.endpoint, timeout = ?config.timeout, "starting netledger-harness");

    let report = netledger_harness::run(&config).await?;
    println!("{}", report.render());
    info!(passed = report.passed(), failed = report.failed(), "harness finished");

    Ok(ExitCode::from(report.exit_code()))
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<ConfigFile> {
    let path_str = path
        .to_str()
        .context("config path must be valid utf-8")?;
    ConfigFile::from_file(path_str).context("load config")
}
