//! Coercion of the loosely-typed tokens a block-based front end hands over
//! (menu strings, typed-in numbers) into pins and line modes.

use std::{convert::Infallible, fmt, str::FromStr};

use crate::gpio::LineMode;

/// The mode strings offered to callers, in menu order.
pub const MODE_TOKENS: [&str; 3] = ["output high", "output low", "input"];

/// Parses a pin token as a decimal number.
///
/// Surrounding whitespace is ignored and integral floats such as `"3.0"` are
/// accepted. Anything else, including an empty token, yields `None`. The
/// result is not range checked.
///
/// ```rust
/// use pin_sysfs::parse_pin;
///
/// assert_eq!(parse_pin(" 17 "), Some(17));
/// assert_eq!(parse_pin("4.0"), Some(4));
/// assert_eq!(parse_pin("4.5"), None);
/// assert_eq!(parse_pin("led"), None);
/// ```
pub fn parse_pin(token: &str) -> Option<i64> {
    let token = token.trim();
    if let Ok(pin) = token.parse::<i64>() {
        return Some(pin);
    }

    let pin = token.parse::<f64>().ok()?;
    if pin.is_finite() && pin.fract() == 0.0 && pin >= i64::MIN as f64 && pin <= i64::MAX as f64 {
        Some(pin as i64)
    } else {
        None
    }
}

impl LineMode {
    /// Maps a mode token onto a `LineMode`. Unrecognised tokens mean input.
    pub fn from_token(token: &str) -> LineMode {
        match token {
            "output high" => LineMode::OutputHigh,
            "output low" => LineMode::OutputLow,
            _ => LineMode::Input,
        }
    }

    pub fn to_token(&self) -> &'static str {
        match self {
            LineMode::OutputHigh => MODE_TOKENS[0],
            LineMode::OutputLow => MODE_TOKENS[1],
            LineMode::Input => MODE_TOKENS[2],
        }
    }
}

impl FromStr for LineMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LineMode::from_token(s))
    }
}

impl fmt::Display for LineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_token())
    }
}
