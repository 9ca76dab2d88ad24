//! `imddaily`: download and convert IMD daily gridded data.
//!
//! - `download`: fetch a parameter's daily files for a date window, skipping
//!   days already cached, and optionally convert the fresh days
//! - `convert`: convert whatever is cached for a window
//! - `params`: list the supported parameters

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use grid_writer::{ConversionOutcome, ConvertMode, Converter, OutputFormat};
use imd_common::{DateWindow, ParameterSpec};
use imd_downloader::{
    CancellationToken, Downloader, HttpFetcher, ImdConfig, LogProgress, NoProgress,
    ProgressObserver, Session, SessionRequest, UnavailablePolicy,
};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "imddaily", version)]
#[command(about = "Download and convert IMD daily gridded weather data")]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "IMD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download daily files for a parameter and date window
    Download {
        /// One of raingpm, tmax, tmin, rain, tmaxone, tminone
        parameter: String,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,

        /// Last day, YYYY-MM-DD (defaults to --start)
        #[arg(long)]
        end: Option<String>,

        /// Directory for raw .grd files
        #[arg(long, env = "IMD_DATA_DIR", default_value = ".")]
        path: PathBuf,

        /// Maximum concurrent downloads
        #[arg(long, env = "IMD_MAX_CONCURRENT")]
        max_concurrent: Option<usize>,

        /// Treat a batch where every day was skipped (even if cached) as unavailable
        #[arg(long)]
        strict_unavailable: bool,

        /// Convert the fetched days into this directory
        #[arg(long)]
        convert_to: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,

        /// Do not report progress
        #[arg(short, long)]
        quiet: bool,
    },

    /// Convert cached raw files for a parameter and date window
    Convert {
        parameter: String,

        #[arg(long)]
        start: String,

        #[arg(long)]
        end: Option<String>,

        /// Directory holding the raw .grd files
        #[arg(long, env = "IMD_DATA_DIR", default_value = ".")]
        path: PathBuf,

        /// Output directory
        #[arg(long)]
        out: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List supported parameters
    Params {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output format: geotiff or netcdf
    #[arg(long)]
    format: Option<String>,

    /// Write one file covering the whole window instead of one per day
    #[arg(long)]
    single: bool,

    /// Conversion worker threads
    #[arg(long, env = "IMD_CONVERT_WORKERS")]
    workers: Option<usize>,
}

impl OutputArgs {
    fn mode(&self) -> ConvertMode {
        if self.single {
            ConvertMode::SingleFile
        } else {
            ConvertMode::PerDay
        }
    }

    fn converter(&self, config: &ImdConfig) -> Result<(Converter, OutputFormat)> {
        let mut writer_config = config.convert.clone();
        if let Some(workers) = self.workers {
            writer_config.workers = workers;
        }
        let format = match &self.format {
            Some(f) => f.parse().context("Invalid --format")?,
            None => writer_config.format,
        };
        let converter = Converter::new(writer_config).context("Failed to start conversion pool")?;
        Ok((converter, format))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format)?;

    let config = match &args.config {
        Some(path) => ImdConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ImdConfig::default(),
    };

    match args.command {
        Command::Download {
            parameter,
            start,
            end,
            path,
            max_concurrent,
            strict_unavailable,
            convert_to,
            output,
            quiet,
        } => {
            // Everything is validated before the first request goes out.
            let request =
                SessionRequest::new(&parameter, Some(start.as_str()), end.as_deref(), &path)?;

            let mut settings = config.download.clone();
            if let Some(n) = max_concurrent {
                settings.max_concurrent = n;
            }
            if strict_unavailable {
                settings.unavailable_policy = UnavailablePolicy::AllSkipped;
            }

            let fetcher = HttpFetcher::new(settings.http_config())?;
            let downloader = Downloader::new(Arc::new(fetcher), settings.download_config());

            let cancel = CancellationToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Received shutdown signal, finishing in-flight downloads");
                ctrl_c.cancel();
            });

            let observer: Box<dyn ProgressObserver> = if quiet {
                Box::new(NoProgress)
            } else {
                Box::new(LogProgress::new(parameter.as_str(), 10))
            };

            let session = Session::download_with(
                &downloader,
                request,
                settings.unavailable_policy,
                observer.as_ref(),
                &cancel,
            )
            .await?;

            let result = session.result();
            info!(
                parameter = %session.parameter(),
                resolution = %session.px_size(),
                total = result.total_days,
                fetched = result.fetched_count(),
                already_present = result.already_present_count(),
                failed = result.failed().len(),
                "Download session complete"
            );
            for outcome in result.failed() {
                warn!(date = %outcome.date, filename = %outcome.filename, status = ?outcome.status, "Skipped");
            }

            if let Some(out_dir) = convert_to {
                let (converter, format) = output.converter(&config)?;
                let outcomes = tokio::task::block_in_place(|| {
                    session.convert(&converter, &out_dir, format, output.mode())
                })?;
                report_conversions(&outcomes)?;
            }
        }

        Command::Convert {
            parameter,
            start,
            end,
            path,
            out,
            output,
        } => {
            let spec = ParameterSpec::lookup(&parameter)?;
            let window = DateWindow::resolve(spec, Some(start.as_str()), end.as_deref())?;
            let (converter, format) = output.converter(&config)?;

            let outcomes = tokio::task::block_in_place(|| {
                converter.convert_cached(spec, &window, &path, &out, format, output.mode())
            })?;
            if outcomes.is_empty() {
                bail!("No cached {} files in {}", parameter, path.display());
            }
            report_conversions(&outcomes)?;
        }

        Command::Params { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(ParameterSpec::all())?);
            } else {
                for spec in ParameterSpec::all() {
                    println!(
                        "{:<8} {:<15} {:>3}x{:<3} {:<5} since {}  {}",
                        spec.id(),
                        spec.px_size_label(),
                        spec.lat_count,
                        spec.lon_count,
                        spec.units,
                        spec.earliest_date,
                        spec.long_name
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(log_level: &str, format: LogFormat) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }
    Ok(())
}

fn report_conversions(outcomes: &[ConversionOutcome]) -> Result<()> {
    let converted = outcomes.iter().filter(|o| o.is_converted()).count();
    info!(converted, failed = outcomes.len() - converted, "Conversion complete");
    if converted == 0 && !outcomes.is_empty() {
        bail!("All conversions failed");
    }
    Ok(())
}
