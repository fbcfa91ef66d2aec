use std::path::Path;

use gpto_core::log::{LogRecord, LogSink, TracingSink};
use indicatif::ProgressBar;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Console level from -v / -q when `RUST_LOG` is not set.
fn console_directive(verbose: u8, quiet: bool) -> &'static str {
    match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    }
}

/// Install the console layer and, when `log_file` is given, an ANSI-free file
/// layer at info level. Keep the returned guard alive until the run is over;
/// dropping it flushes the file.
pub fn init(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(verbose, quiet)));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(console_filter);

    let (file, guard) = match log_file {
        Some(path) => {
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name.to_string_lossy().into_owned())
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .with_filter(LevelFilter::INFO);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    Ok(guard)
}

/// Routes records through `tracing` without tearing the progress bar.
pub struct ConsoleSink<'a> {
    bar: &'a ProgressBar,
}

impl<'a> ConsoleSink<'a> {
    pub fn new(bar: &'a ProgressBar) -> Self {
        Self { bar }
    }
}

impl LogSink for ConsoleSink<'_> {
    fn record(&self, record: &LogRecord) {
        self.bar.suspend(|| TracingSink.record(record));
    }
}
