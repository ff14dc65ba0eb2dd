// Lightshift Simulator CLI
// Replays a key trace through the engine and prints what gets typed

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lightshift_core::config::{default_config_content, KeyboardConfig};
use lightshift_core::sim::{parse_trace, Simulator};

/// Home-row shift simulator
#[derive(Parser, Debug)]
#[command(name = "lightshift-sim")]
#[command(version)]
#[command(about = "Replay key traces through the lightshift engine", long_about = None)]
struct Args {
    /// TOML configuration file (built-in Graphite layout if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Trace file, one `<ms> <down|up> <row>,<col>` per line (stdin if omitted)
    #[arg(short, long, value_name = "TRACE")]
    trace: Option<PathBuf>,

    /// Enable debug logging of state transitions
    #[arg(short, long)]
    verbose: bool,

    /// Print shift states after every event
    #[arg(short, long)]
    states: bool,

    /// Resolve nested taps as holds where the engine allows it
    #[arg(long)]
    permissive_hold: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Print the built-in configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<KeyboardConfig> {
    match path {
        Some(path) => KeyboardConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => KeyboardConfig::from_toml(default_config_content())
            .context("built-in configuration is invalid"),
    }
}

fn read_trace(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read trace {}", path.display()))
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("failed to read trace from stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_content());
        return Ok(());
    }

    init_logging(args.verbose);

    let config = load_config(args.config.as_ref())?;
    log::info!(
        "{}x{} board, {} layer(s), dropshift {}",
        config.engine.board.rows,
        config.engine.board.cols,
        config.layers.len(),
        if config.engine.dropshift { "on" } else { "off" }
    );

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    let text = read_trace(args.trace.as_ref())?;
    let events = parse_trace(&text).context("invalid trace")?;

    let mut sim = Simulator::from_config(config).with_permissive_hold(args.permissive_hold);
    sim.run_trace(&events);

    if args.states {
        for report in sim.reports() {
            println!("{}", report);
        }
        println!();
    }
    println!("{}", sim.output());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["lightshift-sim", "--config", "/tmp/board.toml"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/board.toml")));
        assert!(args.trace.is_none());
        assert!(!args.verbose);
        assert!(!args.states);
        assert!(!args.check_config);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from([
            "lightshift-sim",
            "-t",
            "roll.trace",
            "--verbose",
            "--states",
            "--permissive-hold",
        ]);

        assert_eq!(args.trace, Some(PathBuf::from("roll.trace")));
        assert!(args.verbose);
        assert!(args.states);
        assert!(args.permissive_hold);
    }

    #[test]
    fn test_default_config_loads() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layers.len(), 2);
    }
}
