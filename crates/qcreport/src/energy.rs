use std::sync::LazyLock;

use log::trace;
use regex::Regex;

use crate::number::{FLOAT, parse_float};

static ENERGY: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        format!(r"(?i)FINAL SINGLE POINT ENERGY\s+{FLOAT}"),
        format!(r"(?i)Total Energy\s*[:=]\s*{FLOAT}"),
        format!(r"(?i)SCF\s+total\s+energy\s*[:=]\s*{FLOAT}"),
        format!(r"(?i)TOTAL\s+SCF\s+ENERGY\s*[:=]?\s*{FLOAT}"),
    ]
    .map(|re| Regex::new(&re).unwrap())
});

/// Return the total energy in Hartree reported in `text`. Every phrase is
/// searched and whichever match occurs last in the text wins, since reports
/// restate the energy at each optimization step and the final value is the
/// one of interest. Returns `None` if no phrase matches.
pub fn parse_energy(text: &str) -> Option<f64> {
    let mut last: Option<(usize, f64)> = None;
    for re in ENERGY.iter() {
        for caps in re.captures_iter(text) {
            let Some(value) = parse_float(&caps[1]) else {
                continue;
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            if last.is_none_or(|(pos, _)| start > pos) {
                last = Some((start, value));
            }
        }
    }
    if let Some((pos, value)) = last {
        trace!("found energy {value} at byte {pos}");
    }
    last.map(|(_, value)| value)
}
