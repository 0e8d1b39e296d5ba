//! Numeric literals as they appear in program output, including the Fortran
//! double precision exponent markers `D` and `d`.

/// Regex fragment capturing one floating point literal. Exponents may be
/// written with `E`, `e`, `D`, or `d`.
pub const FLOAT: &str = r"(-?\d+(?:\.\d+)?(?:[EeDd][+\-]?\d+)?)";

/// Parse `s` as an `f64` after rewriting any `D`/`d` exponent marker to `E`.
/// Returns `None` for anything that does not convert to a finite number.
///
/// ```
/// use qcreport::number::parse_float;
/// assert_eq!(parse_float("1.23D-04"), parse_float("1.23E-04"));
/// assert_eq!(parse_float("-76.5d0"), Some(-76.5));
/// assert_eq!(parse_float("1.0D+999"), None);
/// ```
pub fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let v: f64 = if s.contains(['D', 'd']) {
        s.replace(['D', 'd'], "E").parse().ok()?
    } else {
        s.parse().ok()?
    };
    v.is_finite().then_some(v)
}
