use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    Blank,
    number::{FLOAT, parse_float},
    section,
};

/// An isotropic NMR chemical shift for one nucleus
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChemicalShift {
    pub atom_index: usize,
    pub element: String,
    pub shift_ppm: f64,
}

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*(\d+)\s+([A-Za-z]{{1,2}})\s+{FLOAT}\s+ppm"))
        .unwrap()
});

/// Extract the chemical shifts listed under `CHEMICAL SHIFTS` in `text`.
/// Blank lines between the heading and the first shift are skipped, and the
/// first blank line after that ends the listing.
pub fn parse_shifts(text: &str) -> Vec<ChemicalShift> {
    let mut ret = Vec::new();
    let mut sec = section(
        text,
        "CHEMICAL SHIFTS",
        Blank::AfterRows { heading: usize::MAX },
        |_| false,
    );
    while let Some(line) = sec.next() {
        let Some(caps) = ROW.captures(line) else {
            continue;
        };
        let (Ok(atom_index), Some(shift_ppm)) =
            (caps[1].parse(), parse_float(&caps[3]))
        else {
            trace!("skipping malformed shift row `{line}`");
            continue;
        };
        sec.accept();
        ret.push(ChemicalShift {
            atom_index,
            element: caps[2].to_string(),
            shift_ppm,
        });
    }
    debug!("read {} chemical shifts", ret.len());
    ret
}
