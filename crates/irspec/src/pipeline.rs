//! Driving a single molecule from structure file to finished artifacts

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use broaden::{Spectrum, synthesize};
use log::{info, warn};
use qcreport::{
    Report,
    geom::Structure,
    program::{Orca, Template},
};

use crate::{
    config::Config,
    present::{Results, plot, summary::Summary, table, view},
};


/// The directories belonging to one molecule: `<outdir>/<name>/inputs` for
/// the program input and its scratch files, `outputs` for the report, and
/// `results` for everything derived from it
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    name: String,
    dir: PathBuf,
}

impl Job {
    /// the job is named after the stem of `mol`
    pub fn new(mol: impl AsRef<Path>, outdir: impl AsRef<Path>) -> Self {
        let name = mol
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| String::from("molecule"));
        let dir = outdir.as_ref().join(&name);
        Self { name, dir }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn inputs(&self) -> PathBuf {
        self.dir.join("inputs")
    }

    pub fn outputs(&self) -> PathBuf {
        self.dir.join("outputs")
    }

    pub fn results(&self) -> PathBuf {
        self.dir.join("results")
    }

    /// the path of the result file named `<name><suffix>`
    pub fn result(&self, suffix: &str) -> PathBuf {
        self.results().join(format!("{}{suffix}", self.name))
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        for dir in [self.inputs(), self.outputs(), self.results()] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Which artifacts to produce
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Outputs {
    pub plot: bool,
    pub csv: bool,
    pub view: bool,
    pub summary: bool,
    pub json: bool,
}

impl Outputs {
    pub fn all() -> Self {
        Self {
            plot: true,
            csv: true,
            view: true,
            summary: true,
            json: true,
        }
    }

    pub fn any(&self) -> bool {
        let Self {
            plot,
            csv,
            view,
            summary,
            json,
        } = *self;
        plot || csv || view || summary || json
    }
}

/// The files written by a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Artifacts {
    pub plot: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub view: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub json: Option<PathBuf>,
}

impl Artifacts {
    /// the paths that were written, in the order they were written
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [&self.plot, &self.csv, &self.view, &self.summary, &self.json]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct Outcome {
    pub job: Job,

    /// the report the lines were read from
    pub report_path: PathBuf,

    pub report: Report,
    pub spectrum: Spectrum,
    pub artifacts: Artifacts,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    outputs: Outputs,
    version: &'a str,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, outputs: Outputs) -> Self {
        Self {
            config,
            outputs,
            version: "",
        }
    }

    /// the version recorded in the JSON results
    pub fn version(mut self, version: &'a str) -> Self {
        self.version = version;
        self
    }

    /// Read the structure in `mol`, run the program on it unless `report` is
    /// given, and write the requested artifacts for the resulting report. A
    /// failed program run is returned as an error before anything is parsed.
    pub fn run(
        &self,
        mol: &Path,
        report: Option<&Path>,
    ) -> anyhow::Result<Outcome> {
        info!("reading structure from {}", mol.display());
        let structure = Structure::load(mol)
            .with_context(|| format!("loading structure {}", mol.display()))?;
        let job = Job::new(mol, &self.config.outdir);
        job.create_dirs().with_context(|| {
            format!("creating job directory {}", job.dir().display())
        })?;

        let report_path = match report {
            Some(path) => {
                info!("skipping calculation, using {}", path.display());
                path.to_path_buf()
            }
            None => self.compute(&job, structure.clone())?,
        };

        info!("parsing {}", report_path.display());
        let report = Report::load(&report_path)?;
        if report.lines.is_empty() {
            warn!("no vibrational lines in {}", report_path.display());
        }

        let spectrum = synthesize(&report.pairs(), &self.config.spectrum);
        let artifacts = self.present(&job, &structure, &report, &spectrum)?;

        Ok(Outcome {
            job,
            report_path,
            report,
            spectrum,
            artifacts,
        })
    }

    /// write the input file, run the program, and move its report into the
    /// outputs directory
    fn compute(
        &self,
        job: &Job,
        structure: Structure,
    ) -> anyhow::Result<PathBuf> {
        let base = job.inputs().join(job.name());
        let orca = Orca::new(
            base.to_string_lossy().into_owned(),
            Template::from(self.config.template.as_str()),
            self.config.charge,
            self.config.multiplicity,
            structure,
        );
        orca.write_input()?;
        let out = self
            .config
            .engine
            .run(&orca)
            .with_context(|| format!("running job {}", job.name()))?;
        let dest = job.outputs().join(format!("{}.out", job.name()));
        fs::rename(&out, &dest).with_context(|| {
            format!("moving {} to {}", out.display(), dest.display())
        })?;
        Ok(dest)
    }

    fn present(
        &self,
        job: &Job,
        structure: &Structure,
        report: &Report,
        spectrum: &Spectrum,
    ) -> anyhow::Result<Artifacts> {
        let name = job.name();
        let mut ret = Artifacts::default();
        if self.outputs.plot {
            let path = job.result("_IR.png");
            let title = format!("IR spectrum of {name}");
            plot::plot_spectrum(&path, &title, spectrum, &self.config.plot)?;
            info!("wrote {}", path.display());
            ret.plot = Some(path);
        }
        if self.outputs.csv {
            let path = job.result("_IR.csv");
            table::write_csv_file(&path, &report.lines)?;
            info!("wrote {}", path.display());
            ret.csv = Some(path);
        }
        if self.outputs.view {
            let path = job.result("_3D.html");
            view::write_html(&path, name, structure)?;
            info!("wrote {}", path.display());
            ret.view = Some(path);
        }
        if self.outputs.summary {
            let path = job.result("_summary.txt");
            let title = format!("IR summary for {name}");
            Summary::new(&title, report, self.config.summary.page_lines)
                .write(&path)?;
            info!("wrote {}", path.display());
            ret.summary = Some(path);
        }
        if self.outputs.json {
            let path = job.result(".json");
            Results::new(name, self.version, report, spectrum).write(&path)?;
            info!("wrote {}", path.display());
            ret.json = Some(path);
        }
        Ok(ret)
    }
}
