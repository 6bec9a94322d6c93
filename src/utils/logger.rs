use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CRATE_TARGET: &str = "ad_enhancer";

/// Shape of emitted log lines. `LOG_FORMAT` (`compact` or `json`) overrides
/// the default of each entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    fn from_env_or(default: Self) -> Self {
        std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|name| Self::from_name(&name))
            .unwrap_or(default)
    }
}

/// Directives used when `RUST_LOG` is not set. Upstream crates stay at warn
/// so reqwest and hyper do not drown out the enrichment logs.
pub fn default_directives(verbose: bool) -> String {
    if verbose {
        format!("{}=debug,info", CRATE_TARGET)
    } else {
        format!("{}=info,warn", CRATE_TARGET)
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

/// CLI logging. stdout carries the enriched request, so logs go to stderr.
pub fn init_cli_logger(verbose: bool) {
    init(LogFormat::from_env_or(LogFormat::Compact), verbose, std::io::stderr);
}

/// Server logging: one JSON object per line on stdout.
pub fn init_server_logger() {
    init(LogFormat::from_env_or(LogFormat::Json), false, std::io::stdout);
}

fn init<W>(format: LogFormat, verbose: bool, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);
    let registry = tracing_subscriber::registry().with(env_filter(verbose));

    match format {
        LogFormat::Compact => registry.with(layer.compact()).init(),
        LogFormat::Json => registry.with(layer.json().flatten_event(true)).init(),
    }
}
