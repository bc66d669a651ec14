use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use common::{
    loader::load_all,
    plot::{BarChartData, Plot},
};
use eyre::Result;
use jmh_bar::JmhBar;
use tracing::{debug, error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const USAGE: &str = "Usage: jmh-plot result1.json [result2.json ...]";
const MODULES: &[&str] = &["jmh_plot", "common", "jmh_bar"];

/// Chart JMH json results as a single bar chart
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// JMH result files (`-rf json`), charted together in the given order
    files: Vec<PathBuf>,
    /// Save the chart as SVG here instead of opening it in the default viewer
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Figure width in pixels, sized from the data when unset
    #[arg(long)]
    width: Option<u32>,
    /// Figure height in pixels, sized from the data when unset
    #[arg(long)]
    height: Option<u32>,
    #[arg(short, long)]
    log: Vec<String>,
}

fn main() -> Result<ExitCode> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_default();
    let args = Cli::parse();
    let (non_blocking, _guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::registry()
        .with(env_filter(&rust_log, &args.log)?)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact()
                .with_writer(non_blocking),
        )
        .init();

    if args.files.is_empty() {
        println!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    }

    if let Err(err) = chart(&args) {
        error!("{err:#?}");
        return Err(err);
    }
    Ok(ExitCode::SUCCESS)
}

/// A plain level in `RUST_LOG` applies to every workspace crate, anything else
/// is taken as a full filter. `--log` directives are added on top.
fn env_filter(rust_log: &str, log: &[String]) -> Result<EnvFilter> {
    let rust_log = rust_log.trim();
    let mut env_filter = match rust_log.parse::<LevelFilter>() {
        Ok(level) => module_filter(level, log),
        Err(_) if rust_log.is_empty() => module_filter(LevelFilter::WARN, log),
        Err(_) => EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
            eprintln!("Ignoring RUST_LOG={rust_log}: {err}");
            module_filter(LevelFilter::WARN, log)
        }),
    };

    for directive in log {
        env_filter = env_filter.add_directive(directive.parse()?);
    }
    Ok(env_filter)
}

fn module_filter(level: LevelFilter, log: &[String]) -> EnvFilter {
    let directives = MODULES
        .iter()
        .filter(|module| !log.iter().any(|x| x.starts_with(**module)))
        .map(|module| format!("{module}={level}"))
        .collect::<Vec<_>>();
    EnvFilter::new(directives.join(","))
}

fn chart(args: &Cli) -> Result<()> {
    let records = load_all(&args.files)?;

    let Some(chart) = BarChartData::from_records(records) else {
        println!("No benchmark scores found.");
        return Ok(());
    };
    info!(
        "Charting {} bars from {} files",
        chart.bars.len(),
        args.files.len()
    );

    match &args.output {
        Some(output) => {
            JmhBar::new(output)
                .with_size(args.width, args.height)
                .plot(&chart)?;
            println!("Chart written to {}", output.display());
        }
        None => show(&chart, args)?,
    }
    Ok(())
}

/// Hands a temp-dir rendering of the chart to the desktop viewer
fn show(chart: &BarChartData, args: &Cli) -> Result<()> {
    let path = render_temp(chart, args.width, args.height)?;
    match opener::open(&path) {
        Ok(()) => info!("Opened {}", path.display()),
        Err(err) => {
            warn!("No viewer for {}: {err}", path.display());
            println!("Chart rendered to {}", path.display());
        }
    }
    Ok(())
}

fn render_temp(chart: &BarChartData, width: Option<u32>, height: Option<u32>) -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("jmh-results-")
        .suffix(".svg")
        .tempfile()?;
    let plot = JmhBar::new(file.path()).with_size(width, height);
    debug!("Rendering with {} into {}", plot.name(), file.path().display());
    plot.plot(chart)?;

    // The viewer may read the file after we exit
    Ok(file.into_temp_path().keep()?)
}
