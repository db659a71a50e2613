use anyhow::{Context, Error, Result};
use std::{
    ops::RangeInclusive,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use crate::sysfs::{Sysfs, SysfsNodes, SYSFS_ROOT};
use crate::tokens::parse_pin;

/// The pins reachable through the controller. Anything outside this range is
/// ignored without touching sysfs.
pub const PIN_RANGE: RangeInclusive<i64> = 0..=27;

/// Specifies the GPIO pin value in output mode.
///
/// * `LOW` - 0
/// * `HIGH` - 1
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Level {
    LOW = 0,
    HIGH = 1,
}

impl Level {
    /// The text written to a `value` node for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::HIGH => "1",
            Level::LOW => "0",
        }
    }
}

/// Specifies the GPIO pin direction.
///
/// * `IN` - Input
/// * `OUT` - Output
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    OUT = 0,
    IN = 1,
}

impl Direction {
    /// The text written to a `direction` node for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::OUT => "out",
            Direction::IN => "in",
        }
    }

    fn from_sysfs(s: &str) -> Option<Direction> {
        match s.trim() {
            "out" => Some(Direction::OUT),
            "in" => Some(Direction::IN),
            _ => None,
        }
    }
}

/// What a `set` call should do with a line.
///
/// # Example
///
/// ```rust
/// use pin_sysfs::{Direction, Level, LineMode};
///
/// assert_eq!(LineMode::OutputLow.direction(), Direction::OUT);
/// assert_eq!(LineMode::OutputHigh.level(), Some(Level::HIGH));
/// assert_eq!(LineMode::Input.level(), None);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LineMode {
    OutputHigh,
    OutputLow,
    Input,
}

impl LineMode {
    pub fn direction(&self) -> Direction {
        match self {
            LineMode::OutputHigh | LineMode::OutputLow => Direction::OUT,
            LineMode::Input => Direction::IN,
        }
    }

    /// The level driven onto the line, or `None` for input mode.
    pub fn level(&self) -> Option<Level> {
        match self {
            LineMode::OutputHigh => Some(Level::HIGH),
            LineMode::OutputLow => Some(Level::LOW),
            LineMode::Input => None,
        }
    }
}

/// How hard `set` tries to write the direction node after an export.
///
/// The kernel creates a freshly exported pin's nodes asynchronously, and on
/// some distributions udev fixes up their ownership a moment later. Writes
/// failing inside that window are retried, sleeping `delay` between attempts.
/// An `attempts` of zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; an `attempts` of zero still makes one attempt.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(5000, Duration::from_millis(1))
    }
}

/// Drives and senses GPIO lines through sysfs.
///
/// The controller keeps no per-pin state: every call re-checks the export,
/// and every `set` re-applies the direction. Calls on the same pin from
/// several threads are not serialized here; callers needing that must hold
/// their own per-pin lock.
///
/// # Example
///
/// ```rust,no_run
/// use pin_sysfs::{LineMode, PinController};
///
/// let gpio = PinController::new();
/// gpio.set(17, LineMode::OutputHigh).unwrap();
///
/// gpio.set(4, LineMode::Input).unwrap();
/// let high = gpio.get(4).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct PinController<N: SysfsNodes = Sysfs> {
    nodes: N,
    root: PathBuf,
    retry: RetryPolicy,
}

impl PinController<Sysfs> {
    /// Creates a controller over the real `/sys/class/gpio` tree.
    pub fn new() -> Self {
        PinController::with_nodes(Sysfs)
    }
}

impl Default for PinController<Sysfs> {
    fn default() -> Self {
        PinController::new()
    }
}

impl<N: SysfsNodes> PinController<N> {
    /// Creates a controller over an arbitrary node layer rooted at the default
    /// sysfs path.
    pub fn with_nodes(nodes: N) -> Self {
        PinController {
            nodes,
            root: PathBuf::from(SYSFS_ROOT),
            retry: RetryPolicy::default(),
        }
    }

    /// Points the controller at a different GPIO class directory.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn export_path(&self) -> PathBuf {
        self.root.join("export")
    }

    fn gpio_dir(&self, pin: i64) -> PathBuf {
        self.root.join(format!("gpio{}", pin))
    }

    fn direction_path(&self, pin: i64) -> PathBuf {
        self.gpio_dir(pin).join("direction")
    }

    fn value_path(&self, pin: i64) -> PathBuf {
        self.gpio_dir(pin).join("value")
    }

    fn export_gpio(&self, pin: i64) {
        if self.nodes.exists(&self.gpio_dir(pin)) {
            return;
        }

        log::debug!("Exporting gpio{}", pin);
        // the direction write is the real gate, so a rejected export is left for it to catch
        if let Err(err) = self.nodes.write_text(&self.export_path(), &pin.to_string()) {
            log::debug!("Export of gpio{} failed: {:#}", pin, err);
        }
    }

    fn write_direction(&self, pin: i64, direction: Direction) -> Result<()> {
        let path = self.direction_path(pin);
        let attempts = self.retry.attempts.max(1);
        let mut last_err: Option<Error> = None;

        for attempt in 1..=attempts {
            match self.nodes.write_text(&path, direction.as_str()) {
                Ok(()) => {
                    log::debug!("gpio{} direction set to {}", pin, direction.as_str());
                    return Ok(());
                }
                Err(err) => {
                    log::trace!(
                        "gpio{} direction write attempt {} failed: {:#}",
                        pin,
                        attempt,
                        err
                    );
                    last_err = Some(err);
                }
            }

            if attempt < attempts {
                thread::sleep(self.retry.delay);
            }
        }

        log::warn!(
            "gpio{} direction still not writable after {} attempts",
            pin,
            attempts
        );
        let err = last_err.unwrap_or_else(|| Error::msg("no attempt was made"));
        Err(err.context(format!(
            "Could not set direction of gpio{} after {} attempts",
            pin, attempts
        )))
    }

    fn output_one(&self, pin: i64, value: Level) -> Result<()> {
        let path = self.value_path(pin);
        log::debug!("Setting gpio{} to {}", pin, value.as_str());
        self.nodes
            .write_text(&path, value.as_str())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Configures `pin` for `mode`, exporting it first if needed.
    ///
    /// Output modes also drive the requested level. Pins outside
    /// [`PIN_RANGE`] are ignored and `Ok(())` is returned.
    ///
    /// # Errors
    ///
    /// Fails if the direction node stays unwritable for the whole retry
    /// budget, or if writing the value node fails.
    pub fn set(&self, pin: i64, mode: LineMode) -> Result<()> {
        if !PIN_RANGE.contains(&pin) {
            log::debug!("Ignoring set on out-of-range pin {}", pin);
            return Ok(());
        }

        self.export_gpio(pin);
        self.write_direction(pin, mode.direction())?;

        match mode.level() {
            Some(level) => self.output_one(pin, level),
            None => Ok(()),
        }
    }

    /// Reads the logic level of `pin`.
    ///
    /// Returns `Some(true)` when the value node starts with `1`, and
    /// `Some(false)` for anything else, including an empty node. Pins outside
    /// [`PIN_RANGE`] return `None` without touching sysfs.
    ///
    /// The pin is expected to have been configured with
    /// `set(pin, LineMode::Input)` beforehand; no direction is applied here.
    pub fn get(&self, pin: i64) -> Result<Option<bool>> {
        if !PIN_RANGE.contains(&pin) {
            log::debug!("Ignoring get on out-of-range pin {}", pin);
            return Ok(None);
        }

        self.export_gpio(pin);

        let path = self.value_path(pin);
        let value = self
            .nodes
            .read_text(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        log::debug!("gpio{} value {:?}", pin, value);

        Ok(Some(value.starts_with('1')))
    }

    /// Returns the current direction of `pin` as reported by sysfs.
    ///
    /// `None` means the pin is out of range, not exported, or its direction
    /// node holds something other than `in`/`out`.
    pub fn direction(&self, pin: i64) -> Result<Option<Direction>> {
        if !PIN_RANGE.contains(&pin) || !self.nodes.exists(&self.gpio_dir(pin)) {
            return Ok(None);
        }

        let path = self.direction_path(pin);
        let direction = self
            .nodes
            .read_text(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(Direction::from_sysfs(&direction))
    }

    /// `set` driven by caller tokens: a decimal pin and a mode string such as
    /// `"output high"`. A non-numeric pin is ignored like an out-of-range one.
    pub fn set_gpio(&self, pin_token: &str, mode_token: &str) -> Result<()> {
        match parse_pin(pin_token) {
            Some(pin) => self.set(pin, LineMode::from_token(mode_token)),
            None => {
                log::debug!("Ignoring set on non-numeric pin {:?}", pin_token);
                Ok(())
            }
        }
    }

    /// `get` driven by a caller's pin token.
    pub fn get_gpio(&self, pin_token: &str) -> Result<Option<bool>> {
        match parse_pin(pin_token) {
            Some(pin) => self.get(pin),
            None => {
                log::debug!("Ignoring get on non-numeric pin {:?}", pin_token);
                Ok(None)
            }
        }
    }
}
