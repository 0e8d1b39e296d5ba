//! Run a frequency calculation on a molecule, or take the report of one that
//! already ran, and turn its vibrational lines into a broadened IR spectrum
//! along with tables, a summary, and a 3D view of the structure.

pub mod config;
pub mod pipeline;
pub mod present;

pub use pipeline::{Artifacts, Job, Outcome, Outputs, Pipeline};

/// print the formatted message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1)
    }};
}
