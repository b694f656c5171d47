//! This file contains the logic for reading branch traces. A trace is plain
//! text, one executed conditional branch per line:
//!
//! ```text
//! # pc        taken
//! 0x401000    1
//! 0x401024    false
//! ```
//!
//! The pc is hex with a `0x` prefix or decimal, the outcome is `1`/`0`,
//! `true`/`false` or `T`/`F`. Blank lines and `#` comments are skipped.

use crate::err::BitmapErr;
use crate::misc::parse_addr;

/// One executed conditional branch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch {
    pub pc: usize,
    pub taken: bool,
}

fn parse_taken(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "T" | "t" => Some(true),
        "0" | "false" | "F" | "f" => Some(false),
        _ => None,
    }
}

/// Parse a whole trace. `image_base` is subtracted from every pc so traces from
/// position independent targets line up across runs
pub fn parse_trace(text: &str, image_base: usize) -> Result<Vec<Branch>, BitmapErr> {
    let mut branches = Vec::new();

    for (i, line) in text.lines().enumerate() {
        // Strip comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        let mut fields = line.split_whitespace();
        let Some(pc_str) = fields.next() else {
            continue;
        };

        let Some(pc) = parse_addr(pc_str) else {
            return Err(BitmapErr::from(&format!(
                "Invalid pc '{}' on line {}",
                pc_str,
                i + 1
            )));
        };

        let Some(taken) = fields.next().and_then(parse_taken) else {
            return Err(BitmapErr::from(&format!(
                "Missing or invalid branch outcome on line {}",
                i + 1
            )));
        };

        if fields.next().is_some() {
            return Err(BitmapErr::from(&format!(
                "Trailing data on line {}",
                i + 1
            )));
        }

        branches.push(Branch {
            pc: pc.wrapping_sub(image_base),
            taken,
        });
    }

    Ok(branches)
}

/// Read and parse the trace at `path`
pub fn load_trace(path: &str, image_base: usize) -> Result<Vec<Branch>, BitmapErr> {
    let Ok(text) = std::fs::read_to_string(path) else {
        return Err(BitmapErr::from(&format!(
            "Unable to read trace from '{}'",
            path
        )));
    };

    parse_trace(&text, image_base)
}
