//! Start-up: command line arguments and configuration file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::config::{self, SimConfig};
use crate::simulation::TraceFormat;

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Parameters of the run
    pub config: SimConfig,
    /// How changes are printed
    pub trace: TraceFormat,
    /// Only print the available arguments
    pub help: bool,
}

/// Loads a [`SimConfig`] from a JSON file. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<SimConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read config file {}", path.display()))?;
    let config: SimConfig = serde_json::from_str(&text)
        .with_context(|| format!("could not parse config file {}", path.display()))?;
    Ok(config)
}

/// ### Reads arguments from `cargo run`
///
/// Arguments have the form `key::value`:
///
/// `config::<path>` &rarr; Loads parameters from a JSON file (applied first)
/// `persons::<n>` &rarr; Number of persons
/// `secs::<n>` &rarr; Length of the run in seconds
/// `capacity::<n>` &rarr; Elevator capacity
/// `seed::<n>` &rarr; Seed for reproducible runs
/// `trace::(table/json/off)` &rarr; How each elevator change is printed
/// `print_state::(true/false)` &rarr; Prints the building on every change
/// `print_err::(true/false)` &rarr; Prints error messages
/// `print_warn::(true/false)` &rarr; Prints warning messages
/// `print_ok::(true/false)` &rarr; Prints OK messages
/// `print_info::(true/false)` &rarr; Prints informational messages
/// `print_else::(true/false)` &rarr; Prints elevator and person trace lines
/// `debug::` &rarr; Disables all prints except error messages
/// `help` &rarr; Displays all possible arguments without starting the program
///
/// If no arguments are provided, the defaults in [`config`] are used.
pub fn parse_args<I>(args: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let mut parsed = Args { config: SimConfig::default(), trace: TraceFormat::default(), help: false };

    // The file goes first so the other arguments override it, whatever their order.
    if let Some(path) = args.iter().find_map(|arg| arg.strip_prefix("config::")) {
        parsed.config = load_config(Path::new(path))?;
    }

    for arg in &args {
        if arg.to_lowercase() == "help" {
            parsed.help = true;
            continue;
        }
        let Some((key, value)) = arg.split_once("::") else {
            bail!("unrecognised argument `{}`, try `help`", arg);
        };
        let key = key.to_lowercase();
        let is_true = value.to_lowercase() == "true";

        match key.as_str() {
            "config" => {}
            "persons" => parsed.config.persons = parse_number(&key, value)?,
            "secs" => parsed.config.duration_secs = parse_number(&key, value)?,
            "capacity" => parsed.config.capacity = parse_number(&key, value)?,
            "seed" => parsed.config.seed = Some(parse_number(&key, value)?),
            "trace" => {
                parsed.trace = match value.to_lowercase().as_str() {
                    "table" => TraceFormat::Table,
                    "json" => TraceFormat::Json,
                    "off" => TraceFormat::Off,
                    other => bail!("unknown trace format `{}`", other),
                }
            }
            "print_state" => config::set_toggle(&config::PRINT_STATE_ON, is_true),
            "print_err" => config::set_toggle(&config::PRINT_ERR_ON, is_true),
            "print_warn" => config::set_toggle(&config::PRINT_WARN_ON, is_true),
            "print_ok" => config::set_toggle(&config::PRINT_OK_ON, is_true),
            "print_info" => config::set_toggle(&config::PRINT_INFO_ON, is_true),
            "print_else" => config::set_toggle(&config::PRINT_ELSE_ON, is_true),
            "debug" => {
                // Kun error-meldingar
                config::set_toggle(&config::PRINT_STATE_ON, false);
                config::set_toggle(&config::PRINT_WARN_ON, false);
                config::set_toggle(&config::PRINT_OK_ON, false);
                config::set_toggle(&config::PRINT_INFO_ON, false);
                config::set_toggle(&config::PRINT_ELSE_ON, false);
            }
            _ => bail!("unrecognised argument `{}`, try `help`", arg),
        }
    }

    parsed.config.validate()?;
    Ok(parsed)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().with_context(|| format!("`{}` expects a number, got `{}`", key, value))
}

/// Lists the arguments [`parse_args`] understands.
pub fn print_help() {
    println!("Available arguments:");
    println!("  config::<path.json>");
    println!("  persons::<n>");
    println!("  secs::<n>");
    println!("  capacity::<n>");
    println!("  seed::<n>");
    println!("  trace::table/json/off");
    println!("  print_state::true/false");
    println!("  print_err::true/false");
    println!("  print_warn::true/false");
    println!("  print_ok::true/false");
    println!("  print_info::true/false");
    println!("  print_else::true/false");
    println!("  debug::");
    println!("  help");
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_gives_defaults() {
        let parsed = parse_args(Vec::<String>::new()).unwrap();
        assert_eq!(parsed.config, SimConfig::default());
        assert_eq!(parsed.trace, TraceFormat::Table);
        assert!(!parsed.help);
    }

    #[test]
    fn overrides_numbers_and_trace() {
        let parsed = parse_args(args(&["persons::3", "secs::5", "seed::42", "trace::json", "help"])).unwrap();
        assert_eq!(parsed.config.persons, 3);
        assert_eq!(parsed.config.duration_secs, 5);
        assert_eq!(parsed.config.seed, Some(42));
        assert_eq!(parsed.trace, TraceFormat::Json);
        assert!(parsed.help);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_args(args(&["persons::many"])).is_err());
        assert!(parse_args(args(&["bogus"])).is_err());
        assert!(parse_args(args(&["trace::fancy"])).is_err());
        assert!(parse_args(args(&["capacity::0"])).is_err());
    }

    #[test]
    fn file_is_applied_before_overrides() {
        let path = std::env::temp_dir().join(format!("elevatorsim-config-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, r#"{{ "floor_names": ["G", "1", "2"], "persons": 7 }}"#).unwrap();

        let arg = format!("config::{}", path.display());
        let parsed = parse_args(vec!["persons::2".to_string(), arg]).unwrap();
        assert_eq!(parsed.config.floor_names, vec!["G", "1", "2"]);
        assert_eq!(parsed.config.persons, 2);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config(Path::new("/definitely/not/here.json")).is_err());
    }
}
