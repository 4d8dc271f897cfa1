// SPDX-License-Identifier: GPL-2.0
//! Morse symbol table and timing constants
//!
//! Covers the 26 ASCII letters (case-insensitive) and the digits 0-9.
//! Everything else has no code.

use std::time::Duration;

/// Base unit: the length of one dot
pub const DOT: Duration = Duration::from_millis(250);

/// A dash lasts three dots
pub const DASH: Duration = Duration::from_millis(3 * 250);

/// Pause after every pulse, built into the blink engine
pub const PULSE_PAUSE: Duration = DOT;

/// Extra pause after the last symbol of a character
pub const CHAR_GAP: Duration = DASH;

/// Pause for a space in the input
pub const WORD_GAP: Duration = Duration::from_millis(7 * 3 * 250);

/// Pause between the hour and minute in clock mode
pub const CLOCK_GAP: Duration = Duration::from_millis(6 * 3 * 250);

/// Longest code in the table (digits)
pub const MAX_SYMBOLS: usize = 5;

/// Morse symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Dot,
    Dash,
}

impl Symbol {
    /// How long the LED stays lit for this symbol
    pub fn duration(self) -> Duration {
        match self {
            Symbol::Dot => DOT,
            Symbol::Dash => DASH,
        }
    }

    /// Character written to the verbose trace
    pub fn trace_char(self) -> char {
        match self {
            Symbol::Dot => '.',
            Symbol::Dash => '-',
        }
    }
}

/// Ordered symbols for one character, 1 to 5 entries
pub type CharacterCode = &'static [Symbol];

use Symbol::{Dash as L, Dot as S};

/// Look up the code for an input byte.
///
/// Letters are case-folded. Returns `None` for anything that is not an
/// ASCII letter or digit.
pub fn lookup(byte: u8) -> Option<CharacterCode> {
    let code: CharacterCode = match byte.to_ascii_lowercase() {
        b'a' => &[S, L],
        b'b' => &[L, S, S, S],
        b'c' => &[L, S, L, S],
        b'd' => &[L, S, S],
        b'e' => &[S],
        b'f' => &[S, S, L, S],
        b'g' => &[L, L, S],
        b'h' => &[S, S, S, S],
        b'i' => &[S, S],
        b'j' => &[S, L, L, L],
        b'k' => &[L, S, L],
        b'l' => &[S, L, S, S],
        b'm' => &[L, L],
        b'n' => &[L, S],
        b'o' => &[L, L, L],
        b'p' => &[S, L, L, S],
        b'q' => &[L, L, S, L],
        b'r' => &[S, L, S],
        b's' => &[S, S, S],
        b't' => &[L],
        b'u' => &[S, S, L],
        b'v' => &[S, S, S, L],
        b'w' => &[S, L, L],
        b'x' => &[L, S, S, L],
        b'y' => &[L, S, L, L],
        b'z' => &[L, L, S, S],
        b'0' => &[L, L, L, L, L],
        b'1' => &[S, L, L, L, L],
        b'2' => &[S, S, L, L, L],
        b'3' => &[S, S, S, L, L],
        b'4' => &[S, S, S, S, L],
        b'5' => &[S, S, S, S, S],
        b'6' => &[L, S, S, S, S],
        b'7' => &[L, L, S, S, S],
        b'8' => &[L, L, L, S, S],
        b'9' => &[L, L, L, L, S],
        _ => return None,
    };
    Some(code)
}

/// Render a code as dots and dashes, e.g. `".-"` for A
pub fn to_pattern(code: CharacterCode) -> String {
    code.iter().map(|s| s.trace_char()).collect()
}

/// Total blocking time to send one character, gaps included
pub fn char_duration(code: CharacterCode) -> Duration {
    code.iter()
        .map(|s| s.duration() + PULSE_PAUSE)
        .sum::<Duration>()
        + CHAR_GAP
}
