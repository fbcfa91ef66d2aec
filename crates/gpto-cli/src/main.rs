mod logging;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gpto_core::log::LogSink;
use gpto_core::{CancellationToken, CollisionPolicy, OrganizeOptions, RunControl};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Clone, Copy, ValueEnum)]
enum Collision {
    /// Keep the existing file and skip the new one
    Skip,
    /// Copy the new one as name(1).ext, name(2).ext, ...
    Rename,
}

impl From<Collision> for CollisionPolicy {
    fn from(c: Collision) -> Self {
        match c {
            Collision::Skip => CollisionPolicy::Skip,
            Collision::Rename => CollisionPolicy::Rename,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "gpto",
    version,
    about = "Google Photos Takeout organizer - copy an extracted Takeout into YYYY/MM folders by capture date"
)]
struct Cli {
    /// Root folder of the extracted Google Takeout (never modified)
    input: PathBuf,

    /// Output folder for the YYYY/MM and dateunknown tree
    #[arg(short, long)]
    output: PathBuf,

    /// What to do when a different file with the same name is already archived
    #[arg(long, value_enum, default_value = "skip")]
    collision: Collision,

    /// Run log path (default: <output>/gpto-<timestamp>.log)
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write a run log file
    #[arg(long)]
    no_log_file: bool,

    /// More console output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only report errors on the console
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let t_total = std::time::Instant::now();

    let options = OrganizeOptions {
        input_root: cli.input,
        output_root: cli.output,
        collision: cli.collision.into(),
    };

    // The log file lives in the output tree, so the root has to exist first.
    let output_root = gpto_core::prepare_output_root(&options.output_root)?;
    let log_path = if cli.no_log_file {
        None
    } else {
        Some(cli.log_file.unwrap_or_else(|| {
            output_root.join(format!(
                "gpto-{}.log",
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            ))
        }))
    };
    let _log_guard = logging::init(cli.verbose, cli.quiet, log_path.as_deref())
        .with_context(|| format!("setting up logging to {:?}", log_path))?;

    let token = CancellationToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || token.cancel()).context("installing Ctrl-C handler")?;
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let console = logging::ConsoleSink::new(&bar);

    let progress = |path: &std::path::Path, index: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(index as u64 + 1);
        bar.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    };

    let control = RunControl::new().with_cancel_token(token);
    let report = gpto_core::organize_with_control(&options, &control, &console, &progress)?;
    bar.finish_and_clear();

    let s = report.stats;
    if report.cancelled {
        console.warn("Run cancelled; statistics cover the files processed so far");
    }
    eprintln!(
        "Done! {} of {} files processed: {} to dated folders, {} to dateunknown, {} skipped ({} name collisions), {} failed ({:.2}s)",
        s.processed,
        report.total,
        s.copied_dated,
        s.copied_unknown,
        s.skipped,
        s.name_collisions,
        s.failed,
        t_total.elapsed().as_secs_f64()
    );
    if let Some(p) = &log_path {
        eprintln!("Run log: {}", p.display());
    }

    Ok(())
}
