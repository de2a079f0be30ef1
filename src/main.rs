//! Main binary entrypoint for dataviz.
//!
//! Parses CLI arguments, sets up logging, loads configuration and either starts
//! the interactive prompt loop or runs a single subcommand.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use dataviz::{
    ChartRequest, Config, Plotter, Result,
    core::{DisplayMode, platform, utils::parse_column_list},
    dataset,
    plot::{ChartKind, output},
    repl::Session,
};

#[derive(Parser)]
#[command(name = "dataviz")]
#[command(about = "Chart columns of a CSV dataset")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, global = true, help = "Path to a TOML config file")]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "How charts are shown: browser, file (write preview only) or none"
    )]
    display: Option<DisplayMode>,

    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single chart without prompting
    Plot {
        file: PathBuf,

        #[arg(long, help = "One of: histogram, violin, box, scatter, line, bar, scatter_reg, heatmap")]
        kind: String,

        #[arg(long, help = "Comma-separated column names, e.g. 'age,income'")]
        columns: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        xlabel: Option<String>,

        #[arg(long)]
        ylabel: Option<String>,

        #[arg(long, help = "Save the chart (to --output, or <kind>.svg)")]
        save: bool,

        #[arg(long, help = "Output file for --save; .svg or .html")]
        output: Option<PathBuf>,
    },
    /// List the columns of a data file and their inferred types
    Inspect { file: PathBuf },
}

fn main() -> Result<()> {
    // Parse input
    let cli = Cli::parse();

    // Toggle the tracing level; logs go to stderr so prompts stay on stdout
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
    tracing::debug!("Running on {}", platform::get_os_info());

    let result = run(cli);

    // If any command results in an error, print and exit
    if let Err(e) = result {
        tracing::error!("{e}");

        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(display) = cli.display {
        config.output.display = display;
    }
    tracing::debug!("Resolved config: {:?}", config);

    match cli.command {
        None => {
            let plotter = Plotter::new(config.style, output::presenter_for(&config.output))?;
            let stdin = io::stdin();
            Session::new(&plotter, stdin.lock(), io::stdout()).run()
        }

        Some(Commands::Plot {
            file,
            kind,
            columns,
            title,
            xlabel,
            ylabel,
            save,
            output: output_path,
        }) => {
            let kind: ChartKind = kind.parse().map_err(|input| {
                dataviz::DatavizErrorKind::InvalidChartKind {
                    input,
                    valid: ChartKind::valid_tags(),
                }
            })?;
            let dataset = dataset::load_csv(&file)?;
            let plotter = Plotter::new(config.style, output::presenter_for(&config.output))?;

            let mut request = ChartRequest::new(kind, parse_column_list(&columns));
            if let Some(title) = title {
                request = request.title(title);
            }
            if let Some(xlabel) = xlabel {
                request = request.xlabel(xlabel);
            }
            if let Some(ylabel) = ylabel {
                request = request.ylabel(ylabel);
            }
            if save || output_path.is_some() {
                request = request.save(output_path);
            }

            let rendered = plotter.plot(&dataset, &request)?;
            if let Some(path) = rendered.saved_to {
                tracing::info!("Saved {} plot to {}", kind, path.display());
            }
            Ok(())
        }

        Some(Commands::Inspect { file }) => {
            let dataset = dataset::load_csv(&file)?;
            let mut stdout = io::stdout().lock();
            for column in dataset.columns() {
                writeln!(
                    stdout,
                    "{}\t{}\t{}",
                    column.name(),
                    column.column_type(),
                    column.non_null_count()
                )?;
            }
            Ok(())
        }
    }
}
