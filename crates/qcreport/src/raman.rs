use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    Blank, has_marker,
    number::{FLOAT, parse_float},
    section,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RamanLine {
    /// frequency in cm⁻¹
    pub frequency: f64,

    /// Raman intensity or activity, whichever the report lists
    pub activity: f64,
}

static ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*\d+:?\s+{FLOAT}\s+{FLOAT}")).unwrap()
});

/// Extract Raman lines from the `RAMAN SPECTRUM` section of `text`, falling
/// back to a `RAMAN ACTIVITIES` section. Lines are keyed by frequency: a
/// repeated frequency replaces the activity of the earlier line but keeps its
/// position.
pub fn parse_raman(text: &str) -> Vec<RamanLine> {
    let ret = read_section(text, "RAMAN SPECTRUM", |l| {
        has_marker(l, "IR SPECTRUM")
    });
    if !ret.is_empty() {
        debug!("read {} Raman lines", ret.len());
        return ret;
    }
    let ret = read_section(text, "RAMAN ACTIVITIES", |_| false);
    debug!("read {} Raman activities", ret.len());
    ret
}

fn read_section(
    text: &str,
    marker: &'static str,
    stop: impl Fn(&str) -> bool,
) -> Vec<RamanLine> {
    let mut ret: Vec<RamanLine> = Vec::new();
    let mut seen: FxHashMap<u64, usize> = FxHashMap::default();
    let mut sec = section(text, marker, Blank::AfterRows { heading: 1 }, stop);
    while let Some(line) = sec.next() {
        let Some(caps) = ROW.captures(line) else {
            continue;
        };
        let (Some(frequency), Some(activity)) =
            (parse_float(&caps[1]), parse_float(&caps[2]))
        else {
            trace!("skipping malformed Raman row `{line}`");
            continue;
        };
        sec.accept();
        match seen.get(&key(frequency)) {
            Some(&i) => ret[i].activity = activity,
            None => {
                seen.insert(key(frequency), ret.len());
                ret.push(RamanLine {
                    frequency,
                    activity,
                });
            }
        }
    }
    ret
}

/// f64 is not Hash, so key on the bit pattern, folding -0.0 into 0.0
fn key(frequency: f64) -> u64 {
    if frequency == 0.0 {
        0
    } else {
        frequency.to_bits()
    }
}
