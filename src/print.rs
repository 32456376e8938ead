//! ## Printing Module
//!
//! This module is only here to make logging in the terminal easier to read.
//! It prints in appropriate colors depending on the situation, and provides a print-format for the fleet.
//! Every print is gated by a toggle in [config], set from the command line by [crate::init::parse_args].
use crate::config;
use crate::fleet::{CallState, Dirn, FleetSnapshot};
use ansi_term::Colour::{self, Green, Purple, Red, Yellow};
use prettytable::{Cell, Row, Table};
use unicode_width::UnicodeWidthStr;

/// Prints an error message in red to the terminal.
///
/// If `PRINT_ERR_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[ERROR\]:   {}", msg
///
/// ## Example
/// ```
/// use elevatormaster::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if config::print_enabled(&config::PRINT_ERR_ON) {
        println!("{}{}\n", Red.paint("[ERROR]:   "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// If `PRINT_WARN_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[WARNING\]: {}", msg
pub fn warn(msg: String) {
    if config::print_enabled(&config::PRINT_WARN_ON) {
        println!("{}{}\n", Yellow.paint("[WARNING]: "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
///
/// If `PRINT_OK_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[OK\]:      {}", msg
pub fn ok(msg: String) {
    if config::print_enabled(&config::PRINT_OK_ON) {
        println!("{}{}\n", Green.paint("[OK]:      "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
///
/// If `PRINT_INFO_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[INFO\]:    {}", msg
pub fn info(msg: String) {
    let light_blue = Colour::RGB(102, 178, 255);
    if config::print_enabled(&config::PRINT_INFO_ON) {
        println!("{}{}\n", light_blue.paint("[INFO]:    "), light_blue.paint(msg));
    }
}

/// Prints a master-specific message in pink to the terminal.
///
/// Used for dispatch decisions and fleet membership changes.
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
///
/// ## Terminal output
/// - "\[MASTER\]:  {}", msg
pub fn master(msg: String) {
    let pink = Colour::RGB(255, 51, 255);
    if config::print_enabled(&config::PRINT_ELSE_ON) {
        println!("{}{}\n", pink.paint("[MASTER]:  "), pink.paint(msg));
    }
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that take more than one column (the status circles),
/// so the boxes drawn by [fleet] line up.
fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

fn run_symbol(state: CallState) -> &'static str {
    match state {
        CallState::None => "🔴",
        CallState::Call => "🟢",
        CallState::Internal(_) => "🟡",
    }
}

fn dirn_label(dirn: Dirn) -> String {
    match dirn {
        Dirn::Up => Yellow.paint("⬆ Up").to_string(),
        Dirn::Down => Yellow.paint("⬇ Down").to_string(),
        Dirn::Stop => Green.paint("Stop").to_string(),
    }
}

/// Logs the fleet to the terminal as a table.
///
/// One row per elevator: peer IP, current floor, direction, and the up/down runs listed
/// top floor first, so the columns read like the panel in the shaft.
///
/// # Behavior
/// - Returns early if `config::PRINT_FLEET_ON` is false.
/// - Prints JSON instead of the table if `config::FLEET_AS_JSON` is set.
/// - An empty fleet prints the header only.
pub fn fleet(fleet: &FleetSnapshot) {
    if !config::print_enabled(&config::PRINT_FLEET_ON) {
        return;
    }
    if config::print_enabled(&config::FLEET_AS_JSON) {
        fleet_json(fleet);
        return;
    }
    let title = pad_text(&format!("FLEET STATUS ({} elevators)", fleet.len()), 30);
    println!("{}", Purple.bold().paint("┌────────────────────────────────┐"));
    println!("{}", Purple.bold().paint(format!("│ {} │", title)));
    println!("{}", Purple.bold().paint("└────────────────────────────────┘"));

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Peer"),
        Cell::new("Floor"),
        Cell::new("Dir"),
        Cell::new("Up runs"),
        Cell::new("Down runs"),
    ]));
    for (peer, elev) in fleet.iter() {
        let ups: Vec<String> = elev.upruns.iter().enumerate().rev()
            .map(|(floor, s)| format!("{} {}", floor, run_symbol(*s)))
            .collect();
        let downs: Vec<String> = elev.downruns.iter().enumerate().rev()
            .map(|(floor, s)| format!("{} {}", floor, run_symbol(*s)))
            .collect();
        table.add_row(Row::new(vec![
            Cell::new(&peer.to_string()),
            Cell::new(&elev.current_floor.to_string()),
            Cell::new(&dirn_label(elev.dir)),
            Cell::new(&ups.join("\n")),
            Cell::new(&downs.join("\n")),
        ]));
    }
    table.printstd();
}

/// Dumps the fleet as pretty JSON, for terminals where the table gets garbled.
fn fleet_json(fleet: &FleetSnapshot) {
    match serde_json::to_string_pretty(fleet) {
        Ok(json) => println!("{}", json),
        Err(e) => err(format!("Failed to render fleet as JSON: {}", e)),
    }
}
