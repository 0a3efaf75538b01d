//! Paygate Logging
//!
//! Structured logging for the paygate payment core, controlled through
//! environment variables.
//!
//! # Features
//!
//! - **Environment-controlled**: `PAYGATE_DEBUG=1` enables debug logging
//! - **Key/value fields**: every macro accepts an optional `fields: [...]` list
//! - **Masking**: [`mask`] hides card numbers and secrets before they are logged
//! - **Multiple backends**: bridges records from the `log` crate, optionally `tracing`
//!
//! # Usage
//!
//! ```rust
//! use paygate_log::{debug, info, warn, error};
//!
//! info!("Gateway client ready");
//! debug!(target: "paygate::request", "Dispatching to {}", "https://pilot-payflowpro.paypal.com");
//!
//! let kind = "transport";
//! error!(fields: [("kind", kind), ("gateway", "keyvalue")], "Dispatch failed");
//! ```
//!
//! # Environment Variables
//!
//! - `PAYGATE_DEBUG=1` - Enable debug logging
//! - `PAYGATE_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PAYGATE_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `PAYGATE_LOG_TIMESTAMPS=1|0` - Include timestamps
//! - `PAYGATE_LOG_COLOR=1|0` - Enable/disable colors

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Levels and formats
// ============================================================================

/// Severity of a record, from most to least verbose. `Off` filters everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl Level {
    const ALL: [Level; 6] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Off,
    ];

    /// Upper-case level name.
    pub fn as_str(&self) -> &'static str {
        ["TRACE", "DEBUG", "INFO", "WARN", "ERROR", "OFF"][*self as usize]
    }

    fn from_u8(raw: u8) -> Self {
        Self::ALL.get(raw as usize).copied().unwrap_or(Level::Off)
    }

    #[cfg(feature = "color")]
    pub fn colored(&self) -> colored::ColoredString {
        use colored::{Color, Colorize};

        let color = [Color::Magenta, Color::Blue, Color::Green, Color::Yellow, Color::Red, Color::White];
        let label = self.as_str().color(color[*self as usize]);
        if *self == Level::Error { label.bold() } else { label }
    }
}

impl FromStr for Level {
    type Err = String;

    /// Case-insensitive; also accepts `warning` and `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = if s.eq_ignore_ascii_case("warning") {
            "warn"
        } else if s.eq_ignore_ascii_case("none") {
            "off"
        } else {
            s
        };
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("unknown log level `{}`", s))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        // log::Level counts from Error = 1
        Self::ALL[5 - level as usize]
    }
}

impl From<Level> for log::LevelFilter {
    fn from(level: Level) -> Self {
        match level {
            Level::Off => log::LevelFilter::Off,
            other => log::Level::iter()
                .find(|l| Level::from(*l) == other)
                .map_or(log::LevelFilter::Off, |l| l.to_level_filter()),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable line with trailing `key="value"` fields
    Pretty,
    /// Level initial, target and unquoted fields
    Compact,
    /// One JSON object per line
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [("pretty", Format::Pretty), ("compact", Format::Compact), ("json", Format::Json)]
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, format)| format)
            .ok_or_else(|| format!("unknown log format `{}`", s))
    }
}

// ============================================================================
// Configuration
// ============================================================================

static DEBUG: AtomicBool = AtomicBool::new(false);
static THRESHOLD: AtomicU8 = AtomicU8::new(Level::Info as u8);
static CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Settings read once from the environment.
#[derive(Debug)]
pub struct LogConfig {
    /// `PAYGATE_DEBUG`
    pub debug: bool,
    /// `PAYGATE_LOG_LEVEL`; `Debug` when only `PAYGATE_DEBUG` is set
    pub level: Level,
    /// `PAYGATE_LOG_FORMAT`
    pub format: Format,
    /// `PAYGATE_LOG_COLOR`, else on when `TERM` is set and `NO_COLOR` is not
    pub color: bool,
    /// `PAYGATE_LOG_TIMESTAMPS`
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok()?.parse().ok()
}

impl LogConfig {
    /// Read the `PAYGATE_*` variables and publish the level to the global
    /// filter. Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debug = env_flag("PAYGATE_DEBUG").unwrap_or(defaults.debug);
        let config = Self {
            debug,
            level: env_parse("PAYGATE_LOG_LEVEL").unwrap_or(if debug { Level::Debug } else { defaults.level }),
            format: env_parse("PAYGATE_LOG_FORMAT").unwrap_or(defaults.format),
            color: env_flag("PAYGATE_LOG_COLOR")
                .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok()),
            timestamps: env_flag("PAYGATE_LOG_TIMESTAMPS").unwrap_or(defaults.timestamps),
        };

        DEBUG.store(config.debug, Ordering::SeqCst);
        THRESHOLD.store(config.level as u8, Ordering::SeqCst);
        config
    }
}

/// Read the environment now instead of on the first record.
pub fn init() {
    Lazy::force(&CONFIG);
}

pub fn is_debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}

/// Whether `level` passes the global threshold, ignoring the debug flag.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off && level as u8 >= THRESHOLD.load(Ordering::Relaxed)
}

/// Whether a record at `level` would be written.
#[inline]
pub fn enabled(level: Level) -> bool {
    init();
    is_level_enabled(level) || (level == Level::Debug && is_debug_enabled())
}

pub fn current_level() -> Level {
    Level::from_u8(THRESHOLD.load(Ordering::Relaxed))
}

/// Change the threshold at runtime; also applied to the `log` bridge.
pub fn set_level(level: Level) {
    init();
    THRESHOLD.store(level as u8, Ordering::SeqCst);
    log::set_max_level(level.into());
}

/// Turning debug on also lowers the threshold to `Debug` if it is above it.
pub fn set_debug(enabled: bool) {
    init();
    DEBUG.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

pub fn config() -> &'static LogConfig {
    &CONFIG
}

/// Mask a sensitive value, keeping only its last four characters.
///
/// Values of four characters or fewer are masked entirely.
///
/// ```rust
/// assert_eq!(paygate_log::mask("4111111111111111"), "************1111");
/// assert_eq!(paygate_log::mask("123"), "***");
/// ```
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let visible: String = value.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}

// ============================================================================
// `log` crate bridge
// ============================================================================

struct Bridge;

impl log::Log for Bridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            emit(
                record.level().into(),
                record.target(),
                &record.args().to_string(),
                &[],
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static BRIDGE: Bridge = Bridge;

/// Route records emitted through the `log` facade (e.g. by `reqwest`) into
/// paygate's output.
///
/// Fails if another `log` implementation has already been installed.
pub fn install_log_bridge() -> Result<(), log::SetLoggerError> {
    init();
    log::set_logger(&BRIDGE)?;
    log::set_max_level(current_level().into());
    Ok(())
}

// ============================================================================
// Log Output
// ============================================================================

/// Emit a record without fields.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str) {
    log_fields(level, target, message, &[]);
}

/// Emit a record with key/value fields.
#[doc(hidden)]
pub fn log_fields(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    if !enabled(level) {
        return;
    }
    emit(level, target, message, fields);
}

fn emit(level: Level, target: &str, message: &str, fields: &[(&str, String)]) {
    let line = render(level, target, message, fields, config());
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "{}", line);
}

/// Format one record according to `config`.
fn render(level: Level, target: &str, message: &str, fields: &[(&str, String)], config: &LogConfig) -> String {
    match config.format {
        Format::Json => render_json(level, target, message, fields),
        Format::Pretty => {
            let mut line = String::new();
            if config.timestamps {
                line.push_str(&format!("{} ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")));
            }
            line.push_str(&format!("{:5} ", level_label(level, config)));
            if !target.is_empty() {
                line.push_str(&format!("[{}] ", target));
            }
            line.push_str(message);
            for (key, value) in fields {
                line.push_str(&format!(" {}={:?}", key, value));
            }
            line
        }
        Format::Compact => {
            let mut line = String::new();
            if config.timestamps {
                line.push_str(&format!("{} ", chrono::Local::now().format("%H:%M:%S")));
            }
            line.push_str(&level.as_str()[..1]);
            line.push(' ');
            if !target.is_empty() {
                line.push_str(&format!("{}: ", target));
            }
            line.push_str(message);
            for (key, value) in fields {
                line.push_str(&format!(" {}={}", key, value));
            }
            line
        }
    }
}

#[cfg(feature = "color")]
fn level_label(level: Level, config: &LogConfig) -> String {
    if config.color {
        level.colored().to_string()
    } else {
        level.as_str().to_string()
    }
}

#[cfg(not(feature = "color"))]
fn level_label(level: Level, _config: &LogConfig) -> String {
    level.as_str().to_string()
}

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: String,
    level: &'a str,
    target: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<&'a str, &'a str>,
}

fn render_json(level: Level, target: &str, message: &str, fields: &[(&str, String)]) -> String {
    let line = JsonLine {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: level.as_str(),
        target,
        message,
        fields: fields.iter().map(|(k, v)| (*k, v.as_str())).collect(),
    };

    // string keys and values only; serialization cannot fail
    serde_json::to_string(&line).unwrap_or_default()
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __paygate_log {
    ($level:expr, target: $target:expr, fields: [$(($key:expr, $value:expr)),* $(,)?], $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log_fields(
                $level,
                $target,
                &format!($($arg)+),
                &[$(($key, ::std::string::ToString::to_string(&$value))),*],
            );
        }
    };
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        if $crate::enabled($level) {
            $crate::log($level, $target, &format!($($arg)+));
        }
    };
    ($level:expr, fields: [$(($key:expr, $value:expr)),* $(,)?], $($arg:tt)+) => {
        $crate::__paygate_log!($level, target: module_path!(), fields: [$(($key, $value)),*], $($arg)+)
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__paygate_log!($level, target: module_path!(), $($arg)+)
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__paygate_log!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug message.
///
/// Emitted when `PAYGATE_DEBUG=1` or `PAYGATE_LOG_LEVEL=debug`.
///
/// # Example
///
/// ```rust
/// use paygate_log::debug;
///
/// let endpoint = "https://pilot-payflowpro.paypal.com";
/// debug!(target: "paygate::transport", "POST {}", endpoint);
/// debug!(fields: [("bytes", 42)], "Reply received");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__paygate_log!($crate::Level::Debug, $($arg)+) };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__paygate_log!($crate::Level::Info, $($arg)+) };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__paygate_log!($crate::Level::Warn, $($arg)+) };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__paygate_log!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// tracing
// ============================================================================

/// Subscriber for applications that log through `tracing`, filtered by
/// `RUST_LOG` when set and by the `PAYGATE_*` level otherwise.
#[cfg(feature = "tracing")]
pub mod tracing_compat {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

    pub fn subscriber() -> impl tracing::Subscriber {
        let config = super::config();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(config.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Debug < Level::Info);
        assert!(Level::Warn < Level::Error);
        assert!(Level::Error < Level::Off);
    }

    #[test]
    fn test_level_parse() {
        assert_eq!("DEBUG".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("none".parse::<Level>(), Ok(Level::Off));
        assert!("verbose".parse::<Level>().is_err());
        assert_eq!(Level::from_u8(2), Level::Info);
        assert_eq!(Level::from_u8(200), Level::Off);
        assert_eq!(format!("[{:5}]", Level::Warn), "[WARN ]");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("Pretty".parse::<Format>(), Ok(Format::Pretty));
        assert_eq!("compact".parse::<Format>(), Ok(Format::Compact));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert!("xml".parse::<Format>().is_err());
    }

    #[test]
    fn test_log_level_conversions() {
        for (theirs, ours) in [
            (log::Level::Error, Level::Error),
            (log::Level::Warn, Level::Warn),
            (log::Level::Info, Level::Info),
            (log::Level::Debug, Level::Debug),
            (log::Level::Trace, Level::Trace),
        ] {
            assert_eq!(Level::from(theirs), ours);
            assert_eq!(log::LevelFilter::from(ours), theirs.to_level_filter());
        }
        assert_eq!(log::LevelFilter::from(Level::Off), log::LevelFilter::Off);
    }

    #[test]
    fn test_off_is_never_enabled() {
        assert!(!is_level_enabled(Level::Off));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("4111111111111111"), "************1111");
        assert_eq!(mask("12345"), "*2345");
        assert_eq!(mask("1234"), "****");
        assert_eq!(mask(""), "");
    }

    fn plain(format: Format) -> LogConfig {
        LogConfig {
            format,
            timestamps: false,
            color: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn test_json_line_carries_fields() {
        let line = render_json(
            Level::Error,
            "paygate::processor",
            "dispatch failed",
            &[("kind", "transport".to_string())],
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "ERROR");
        assert_eq!(value["fields"]["kind"], "transport");
    }

    #[test]
    fn test_json_line_escapes_message() {
        let line = render(Level::Info, "t", "a \"quoted\"\nline", &[], &plain(Format::Json));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "a \"quoted\"\nline");
        assert!(value.get("fields").is_none());
    }

    #[test]
    fn test_pretty_and_compact_lines() {
        let fields = [("request_id", "abc".to_string())];

        let pretty = render(Level::Warn, "paygate::processor", "declined", &fields, &plain(Format::Pretty));
        assert_eq!(pretty, "WARN  [paygate::processor] declined request_id=\"abc\"");

        let compact = render(Level::Warn, "paygate::processor", "declined", &fields, &plain(Format::Compact));
        assert_eq!(compact, "W paygate::processor: declined request_id=abc");
    }

    #[test]
    fn test_macros_compile() {
        trace!("trace message");
        debug!("debug message");
        info!(target: "paygate::test", "with target");
        warn!(fields: [("gateway", "keyvalue")], "with fields");
        error!(target: "paygate::test", fields: [("line", 2), ("kind", "malformed_response")], "both");

        let amount = "10.00";
        debug!("formatted: {}", amount);
    }
}
