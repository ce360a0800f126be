//! ## Printing Module
//!
//! This module is only here to make logging in the terminal easier to read.
//! It prints in appropriate colors depending on the situation, each category
//! behind its own toggle in [`config`].
//! It also provides the presentation of the building: a table per change,
//! a compact one-line form, or one JSON object per line.

use ansi_term::Colour::{self, Cyan, Green, Red, Yellow};
use prettytable::format::consts::FORMAT_BOX_CHARS;
use prettytable::{row, Table};
use unicode_width::UnicodeWidthStr;

use crate::building::floor::Direction;
use crate::building::{BuildingState, PersonState};
use crate::config;

/// Prints a message in a specified color to the terminal.
///
/// If `PRINT_ELSE_ON` is `false`, the message will not be printed.
pub fn color(msg: String, color: Colour) {
    if config::toggle(&config::PRINT_ELSE_ON) {
        println!("{}{}", color.paint("[CUSTOM]:   "), color.paint(msg));
    }
}

/// Prints an error message in red to the terminal.
///
/// ## Terminal output
/// - "\[ERROR\]:    {}", msg
///
/// ## Example
/// ```
/// use elevatorsim::print;
///
/// print::err("Something went wrong!".to_string());
/// ```
pub fn err(msg: String) {
    if config::toggle(&config::PRINT_ERR_ON) {
        eprintln!("{}{}", Red.paint("[ERROR]:    "), Red.paint(msg));
    }
}

/// Prints a warning message in yellow to the terminal.
///
/// ## Terminal output
/// - "\[WARNING\]:  {}", msg
pub fn warn(msg: String) {
    if config::toggle(&config::PRINT_WARN_ON) {
        println!("{}{}", Yellow.paint("[WARNING]:  "), Yellow.paint(msg));
    }
}

/// Prints a success message in green to the terminal.
pub fn ok(msg: String) {
    if config::toggle(&config::PRINT_OK_ON) {
        println!("{}{}", Green.paint("[OK]:       "), Green.paint(msg));
    }
}

/// Prints an informational message in light blue to the terminal.
pub fn info(msg: String) {
    let light_blue = Colour::RGB(102, 178, 255);
    if config::toggle(&config::PRINT_INFO_ON) {
        println!("{}{}", light_blue.paint("[INFO]:     "), light_blue.paint(msg));
    }
}

/// Trace line from the elevator thread, in pink.
pub fn elevator(msg: String) {
    let pink = Colour::RGB(255, 51, 255);
    if config::toggle(&config::PRINT_ELSE_ON) {
        println!("{}{}", pink.paint("[ELEVATOR]: "), pink.paint(msg));
    }
}

/// Trace line from a person thread, in orange.
pub fn person(msg: String) {
    let orange = Colour::RGB(255, 153, 51);
    if config::toggle(&config::PRINT_ELSE_ON) {
        println!("{}{}", orange.paint("[PERSON]:   "), orange.paint(msg));
    }
}

/// Pads the input text to a fixed display width using spaces.
///
/// Accounts for characters that take more than one column, so floor names
/// with wide characters still line up.
fn pad_text(text: &str, width: usize) -> String {
    let visible_width = UnicodeWidthStr::width(text);
    let padding = width.saturating_sub(visible_width);
    format!("{}{}", text, " ".repeat(padding))
}

/// `U1->P3, U2` style list; destinations only for persons travelling.
fn persons_list(persons: &[PersonState]) -> String {
    persons
        .iter()
        .map(|p| match &p.destination {
            Some(dst) => format!("{}->{}", p.name, dst),
            None => p.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the building as a table, top floor first.
///
/// Columns: floor, the cabin (only on its floor), lit buttons, persons waiting.
pub fn render_state(state: &BuildingState) -> String {
    let mut table = Table::new();
    table.set_format(*FORMAT_BOX_CHARS);
    table.set_titles(row!["Floor", "Elevator", "Buttons", "Persons"]);

    for floor in &state.floors {
        let cabin = if floor.name == state.elevator.floor {
            let door = if state.elevator.door_open { "[ open ]" } else { "[closed]" };
            let passengers = persons_list(&state.passengers);
            if passengers.is_empty() {
                door.to_string()
            } else {
                format!("{} {}", door, passengers)
            }
        } else {
            String::new()
        };

        let mut buttons = String::new();
        if floor.flags.is_called(Direction::Up) {
            buttons.push('▲');
        }
        if floor.flags.is_called(Direction::Down) {
            buttons.push('▼');
        }
        if floor.flags.stop_requested() {
            buttons.push('●');
        }

        table.add_row(row![floor.name, cabin, buttons, persons_list(&floor.persons)]);
    }
    table.to_string()
}

/// One-line form of the building state, like the classic text trace.
///
/// `Elevator at floor P1 with doors open | passengers: U1->P3 | T: U2`
pub fn state_line(state: &BuildingState) -> String {
    let width = state.floors.iter().map(|f| UnicodeWidthStr::width(f.name.as_str())).max().unwrap_or(0);
    let mut line = format!(
        "Elevator at floor {} with doors {}",
        pad_text(&state.elevator.floor, width),
        if state.elevator.door_open { "open  " } else { "closed" }
    );
    if !state.passengers.is_empty() {
        line.push_str(&format!(" | passengers: {}", persons_list(&state.passengers)));
    }
    for floor in state.floors.iter().rev().filter(|f| !f.persons.is_empty()) {
        line.push_str(&format!(" | {}: {}", floor.name, persons_list(&floor.persons)));
    }
    line
}

/// Logs the building state to the terminal as a table.
///
/// Does nothing if `PRINT_STATE_ON` is `false`.
pub fn building_state(state: &BuildingState) {
    if !config::toggle(&config::PRINT_STATE_ON) {
        return;
    }
    println!("{}", Cyan.bold().paint(state_line(state)));
    println!("{}", render_state(state));
}

/// Logs the building state as a single JSON line.
pub fn building_state_json(state: &BuildingState) {
    if !config::toggle(&config::PRINT_STATE_ON) {
        return;
    }
    match serde_json::to_string(state) {
        Ok(json) => println!("{}", json),
        Err(e) => err(format!("Could not serialize building state: {}", e)),
    }
}
