use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env, Target};
use irspec::{Outputs, Pipeline, config::Config, die};
use log::info;
use qcreport::IrSource;

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// loaded from the current directory when no config file is given
const DEFAULT_CONFIG: &str = "irspec.toml";

/// broadened IR spectra from quantum chemistry frequency calculations
#[derive(Parser, Debug)]
#[command(author, about, long_about = None)]
struct Args {
    /// XYZ file containing the molecule
    #[arg(value_parser, required_unless_present = "version")]
    mol: Option<PathBuf>,

    /// TOML configuration file. Defaults to irspec.toml in the current
    /// directory if it exists, and the built-in settings otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parse this existing report instead of running the calculation.
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Directory to write the job directory into. Overrides the config file.
    #[arg(short, long)]
    outdir: Option<PathBuf>,

    /// Write the spectrum as a PNG image.
    #[arg(short, long, default_value_t = false)]
    plot: bool,

    /// Write the line list as CSV.
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Write an HTML page with a 3D view of the structure.
    #[arg(long, default_value_t = false)]
    view: bool,

    /// Write a paginated text summary.
    #[arg(short, long, default_value_t = false)]
    summary: bool,

    /// Write the parsed report and peaks as JSON.
    #[arg(short, long, default_value_t = false)]
    json: bool,

    /// Write every artifact. This is also the default when none of the
    /// individual artifacts are requested.
    #[arg(short, long, default_value_t = false)]
    all: bool,

    /// Write the log to this file instead of stderr. Logging to a file
    /// defaults to the info level, otherwise RUST_LOG sets the level.
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Print the git commit hash and exit. Defaults to false.
    #[arg(short, long, default_value_t = false)]
    version: bool,
}

impl Args {
    fn outputs(&self) -> Outputs {
        let ret = Outputs {
            plot: self.plot,
            csv: self.csv,
            view: self.view,
            summary: self.summary,
            json: self.json,
        };
        if self.all || !ret.any() {
            return Outputs::all();
        }
        ret
    }
}

fn init_logging(log: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = match log {
        Some(path) => {
            let f = File::create(path).with_context(|| {
                format!("creating log file {}", path.display())
            })?;
            let mut b =
                Builder::from_env(Env::default().default_filter_or("info"));
            b.target(Target::Pipe(Box::new(f)));
            b
        }
        None => Builder::from_env(Env::default()),
    };
    builder.init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Config {
    let path = match path {
        Some(p) => p,
        None if Path::new(DEFAULT_CONFIG).exists() => Path::new(DEFAULT_CONFIG),
        None => return Config::default(),
    };
    match Config::load(path) {
        Ok(config) => config,
        Err(e) => die!("{e}"),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.version {
        println!("version: {}", version());
        return Ok(());
    }
    let Some(mol) = args.mol.as_deref() else {
        die!("no structure file given");
    };
    init_logging(args.log.as_deref())?;

    let mut config = load_config(args.config.as_deref());
    if let Some(outdir) = &args.outdir {
        config = config.outdir(outdir);
    }
    info!("{config}");

    let outcome = Pipeline::new(&config, args.outputs())
        .version(version())
        .run(mol, args.report.as_deref())?;

    let report = &outcome.report;
    println!("version: {}", version());
    println!("job: {}", outcome.job.name());
    match report.energy {
        Some(e) => println!("energy: {e:.6} Eh"),
        None => println!("energy: not found"),
    }
    match report.source {
        IrSource::Intensities => {
            println!("lines: {} with intensities", report.lines.len())
        }
        IrSource::FrequenciesOnly => println!(
            "lines: {} without intensities, placeholders used",
            report.lines.len()
        ),
        IrSource::None => println!("lines: none found"),
    }
    if !outcome.spectrum.is_flat()
        && let Some(x) = outcome.spectrum.argmax()
    {
        println!("strongest band: {x:.0} cm-1");
    }
    for path in outcome.artifacts.paths() {
        println!("wrote {}", path.display());
    }
    println!("normal termination of irspec");

    Ok(())
}
