//! Logging for Detection Equipment tools
//!
//! Every event becomes one line: local time, level, scope and message.
//! Events that carry a `mod_name` field are scoped to that mod and print as
//! `mod::<name>:`, so registry traffic from different client mods can be told
//! apart. Other events use their target with the application crate removed.
//!
//! Only this workspace's crates log unless `DETEQ_LOGDEPS=1` is set, and
//! `RUST_LOG` replaces the computed filter entirely.
//!
//! ```rust,ignore
//! let config = LogConfig::new("deteq_check")
//!     .with_level(Level::DEBUG)
//!     .with_log_file("deteq_check.log");
//! init_logging(config)?;
//! ```

use std::error::Error;
use std::fmt::{self, Write as _};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, OffsetTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

const OWN_CRATES: &[&str] = &[
    "deteq_check",
    "deteq_log",
    "deteq_mod_api",
    "deteq_protocol",
    "deteq_schema",
];

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

type Timer = OffsetTime<&'static [BorrowedFormatItem<'static>]>;

fn local_timer() -> Timer {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(
        offset,
        format_description!("[hour]:[minute]:[second].[subsecond digits:3]"),
    )
}

/// Fields of one event, split into scope, message and everything else
#[derive(Default)]
struct EventFields {
    mod_name: Option<String>,
    message: String,
    extra: String,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "mod_name" => self.mod_name = Some(value.to_string()),
            "message" => self.message.push_str(value),
            name => {
                let _ = write!(self.extra, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "mod_name" => self.mod_name = Some(format!("{:?}", value)),
            "message" => {
                let _ = write!(self.message, "{:?}", value);
            }
            name => {
                let _ = write!(self.extra, " {}={:?}", name, value);
            }
        }
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

/// Single-line event format shared by the console and the log file
pub struct LineFormat {
    timer: Timer,
    app: String,
    ansi: bool,
}

impl LineFormat {
    /// `app` is the crate whose own events print without a scope
    pub fn new(app: impl Into<String>, ansi: bool) -> Self {
        Self {
            timer: local_timer(),
            app: app.into(),
            ansi,
        }
    }

    fn scope<'a>(&self, target: &'a str) -> Option<&'a str> {
        if target == self.app {
            return None;
        }
        Some(
            target
                .strip_prefix(self.app.as_str())
                .and_then(|rest| rest.strip_prefix("::"))
                .unwrap_or(target),
        )
    }

    fn dim(&self) -> (&'static str, &'static str) {
        if self.ansi { (DIM, RESET) } else { ("", "") }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let (dim, reset) = self.dim();

        write!(writer, "{}", dim)?;
        self.timer.format_time(&mut writer)?;
        write!(writer, "{} ", reset)?;

        let level = *metadata.level();
        if self.ansi {
            write!(writer, "{}{:>5}{} ", level_color(level), level.as_str(), RESET)?;
        } else {
            write!(writer, "{:>5} ", level.as_str())?;
        }

        let mut fields = EventFields::default();
        event.record(&mut fields);

        match (&fields.mod_name, self.scope(metadata.target())) {
            (Some(mod_name), _) => write!(writer, "{}mod::{}{}: ", dim, mod_name, reset)?,
            (None, Some(scope)) => write!(writer, "{}{}{}: ", dim, scope, reset)?,
            (None, None) => {}
        }

        writeln!(writer, "{}{}", fields.message, fields.extra)
    }
}

/// `DETEQ_LOGDEPS=1` lets dependency crates log too
fn dependency_logging_enabled() -> bool {
    std::env::var("DETEQ_LOGDEPS").is_ok_and(|v| v == "1")
}

/// Accepts level names in any case, as given on the command line
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}

fn filter_directives(level: Level, include_dependencies: bool) -> String {
    let level = level.as_str().to_ascii_lowercase();
    if include_dependencies {
        return level;
    }

    std::iter::once("off".to_string())
        .chain(OWN_CRATES.iter().map(|krate| format!("{}={}", krate, level)))
        .collect::<Vec<_>>()
        .join(",")
}

fn stdout_supports_ansi() -> bool {
    atty::is(atty::Stream::Stdout)
        && std::env::var_os("NO_COLOR").is_none()
        && std::env::var("TERM").map_or(true, |term| term != "dumb")
}

/// Where and how much to log
pub struct LogConfig {
    app: String,
    level: Level,
    log_file: Option<PathBuf>,
}

impl LogConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            level: Level::INFO,
            log_file: None,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Also write plain (uncolored) lines to `path`, truncating it
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Install the global subscriber
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(filter_directives(config.level, dependency_logging_enabled()))
    });

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| format!("Unable to create log file '{}': {}", path.display(), e))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LineFormat::new(config.app.as_str(), false))
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let ansi = stdout_supports_ansi();
    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat::new(config.app.as_str(), ansi))
        .with_writer(io::stdout);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing::{info, warn};

    #[derive(Clone, Default)]
    struct Lines(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Lines {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn render(app: &str, emit: impl FnOnce()) -> String {
        let lines = Lines::default();
        let writer = lines.clone();
        let subscriber = tracing_subscriber::fmt()
            .event_format(LineFormat::new(app, false))
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        let bytes = lines.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_filter_directives_own_crates_only() {
        let directives = filter_directives(Level::DEBUG, false);
        assert!(directives.starts_with("off,"));
        assert!(directives.contains("deteq_mod_api=debug"));
        assert!(directives.contains("deteq_check=debug"));
    }

    #[test]
    fn test_filter_directives_with_dependencies() {
        assert_eq!(filter_directives(Level::WARN, true), "warn");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(Level::DEBUG));
        assert_eq!(parse_level(" WARN "), Some(Level::WARN));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_scope_strips_app_crate() {
        let format = LineFormat::new("deteq_mod_api", false);
        assert_eq!(format.scope("deteq_mod_api"), None);
        assert_eq!(format.scope("deteq_mod_api::local_host"), Some("local_host"));
        assert_eq!(format.scope("deteq_schema::bundled"), Some("deteq_schema::bundled"));
    }

    #[test]
    fn test_mod_events_are_scoped_to_the_mod() {
        let output = render("deteq_check", || {
            warn!(mod_name = "Jammers", "Definition API endpoints withdrawn");
        });
        assert!(
            output.ends_with(" WARN mod::Jammers: Definition API endpoints withdrawn\n"),
            "{}",
            output
        );
    }

    #[test]
    fn test_extra_fields_follow_the_message() {
        let output = render("deteq_check", || {
            info!(count = 3, "Registered");
        });
        assert!(
            output.ends_with(" INFO deteq_log::tests: Registered count=3\n"),
            "{}",
            output
        );
    }
}
