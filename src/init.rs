//! # Startup
//!
//! Reads the command line into a [MasterConfig] and sets the print toggles in [config].

use anyhow::{bail, Context, Result};
use std::env;
use std::time::Duration;

use crate::config::{self, MasterConfig, QueueNumbering};
use crate::manager::dispatcher::WrongDirectionPolicy;
use crate::print;

/// ### Reads arguments from `cargo run`
///
/// Every option is `key::value`. Available options:
///
/// `port::<u16>` &rarr; TCP port slaves connect to (default 10002)
/// `beacon::<ip:port>` &rarr; Where the discovery beacon is sent (default 255.255.255.255:10001)
/// `beacon_period::<ms>` &rarr; Time between beacons
/// `settle::<ms>` &rarr; How long a new master waits for backups before reconciling
/// `tcp_timeout::<ms>` &rarr; Close sessions silent for this long, `0` disables (default)
/// `no_run_policy::(idle/ineligible)` &rarr; Moving elevator with nothing queued in its direction
/// `queue::(join/renumber)` &rarr; Queue numbering when a peer joins
/// `print_fleet::(true/false)` &rarr; Prints the fleet after every update
/// `print_json::(true/false)` &rarr; Prints the fleet as JSON instead of a table
/// `print_err::(true/false)` &rarr; Prints error messages
/// `print_warn::(true/false)` &rarr; Prints warning messages
/// `print_ok::(true/false)` &rarr; Prints OK messages
/// `print_info::(true/false)` &rarr; Prints informational messages
/// `print_else::(true/false)` &rarr; Prints master messages (dispatch, membership)
/// `debug` &rarr; Disables all prints except error messages
/// `help` &rarr; Displays all possible arguments without starting the program
///
/// If no arguments are provided, the defaults in [config] are used.
///
/// ## Errors
/// A known key with a value that does not parse.
pub fn parse_args() -> Result<MasterConfig> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a.to_lowercase() == "help") {
        print_help();
        std::process::exit(0);
    }
    parse_arg_list(&args)
}

/// Parses a list of arguments, program name excluded. See [parse_args].
pub fn parse_arg_list(args: &[String]) -> Result<MasterConfig> {
    let mut cfg = MasterConfig::default();

    for arg in args {
        if arg.to_lowercase() == "debug" {
            // Debug modus: Kun error-meldingar
            for flag in [&config::PRINT_FLEET_ON, &config::PRINT_WARN_ON, &config::PRINT_OK_ON, &config::PRINT_INFO_ON, &config::PRINT_ELSE_ON] {
                config::set_print(flag, false);
            }
            continue;
        }

        let Some((key, value)) = arg.split_once("::") else {
            print::warn(format!("Ignoring argument '{}'", arg));
            continue;
        };
        let key = key.to_lowercase();
        let value = value.to_lowercase();
        let is_true = value == "true";

        match key.as_str() {
            "port" => cfg.port = value.parse().with_context(|| format!("Invalid port '{}'", value))?,
            "beacon" => cfg.beacon_addr = value,
            "beacon_period" => cfg.beacon_period = parse_millis(&key, &value)?,
            "settle" => cfg.settle = parse_millis(&key, &value)?,
            "tcp_timeout" => {
                let timeout = parse_millis(&key, &value)?;
                cfg.tcp_timeout = (!timeout.is_zero()).then_some(timeout);
            }
            "no_run_policy" => {
                cfg.no_run_policy = match value.as_str() {
                    "idle" => WrongDirectionPolicy::TreatAsIdle,
                    "ineligible" => WrongDirectionPolicy::Ineligible,
                    other => bail!("Unknown no_run_policy '{}', expected idle or ineligible", other),
                }
            }
            "queue" => {
                cfg.queue_numbering = match value.as_str() {
                    "join" => QueueNumbering::JoinAtEnd,
                    "renumber" => QueueNumbering::RenumberAll,
                    other => bail!("Unknown queue numbering '{}', expected join or renumber", other),
                }
            }
            "print_fleet" => config::set_print(&config::PRINT_FLEET_ON, is_true),
            "print_json" => config::set_print(&config::FLEET_AS_JSON, is_true),
            "print_err" => config::set_print(&config::PRINT_ERR_ON, is_true),
            "print_warn" => config::set_print(&config::PRINT_WARN_ON, is_true),
            "print_ok" => config::set_print(&config::PRINT_OK_ON, is_true),
            "print_info" => config::set_print(&config::PRINT_INFO_ON, is_true),
            "print_else" => config::set_print(&config::PRINT_ELSE_ON, is_true),
            _ => print::warn(format!("Unknown option '{}'", key)),
        }
    }
    Ok(cfg)
}

fn parse_millis(key: &str, value: &str) -> Result<Duration> {
    let ms: u64 = value
        .parse()
        .with_context(|| format!("{} expects milliseconds, got '{}'", key, value))?;
    Ok(Duration::from_millis(ms))
}

fn print_help() {
    println!("Tilgjengelige argument:");
    println!("  port::<u16>");
    println!("  beacon::<ip:port>");
    println!("  beacon_period::<ms>");
    println!("  settle::<ms>");
    println!("  tcp_timeout::<ms> (0 = av)");
    println!("  no_run_policy::idle/ineligible");
    println!("  queue::join/renumber");
    println!("  print_fleet::true/false");
    println!("  print_json::true/false");
    println!("  print_err::true/false");
    println!("  print_warn::true/false");
    println!("  print_ok::true/false");
    println!("  print_info::true/false");
    println!("  print_else::true/false");
    println!("  debug (kun error-meldingar vises)");
}
