use std::io::Write;

use approx::assert_abs_diff_eq;
use test_case::test_case;

use crate::{
    IrSource, Report, ReportError, SENTINEL_INTENSITY, SpectralLine,
    geom::{Atom, GeomError, Structure},
    number::parse_float,
    parse_energy, parse_ir, parse_raman, parse_shifts,
    program::{Engine, Orca, Template},
};

#[test_case("1.23D-04", 1.23e-4; "fortran upper")]
#[test_case("1.23d-04", 1.23e-4; "fortran lower")]
#[test_case("1.23E-04", 1.23e-4; "e upper")]
#[test_case("-76.5", -76.5; "plain")]
#[test_case("42", 42.0; "integer")]
#[test_case("2.5D+02", 250.0; "positive exponent")]
fn fortran_floats(s: &str, want: f64) {
    assert_eq!(parse_float(s), Some(want));
}

#[test]
fn fortran_matches_e() {
    assert_eq!(parse_float("1.23D-04"), parse_float("1.23E-04"));
}

#[test_case("abc"; "letters")]
#[test_case(""; "empty")]
#[test_case("1.0D+999"; "overflow")]
fn bad_floats(s: &str) {
    assert_eq!(parse_float(s), None);
}

#[test]
fn water_ir() {
    let report = Report::load("testfiles/water.out").unwrap();
    assert_eq!(report.source, IrSource::Intensities);
    assert_eq!(
        report.lines,
        vec![
            SpectralLine::new(Some(6), 1622.44, 0.012669),
            SpectralLine::new(Some(7), 3692.69, 0.000648),
            SpectralLine::new(Some(8), 3792.41, 0.003970),
        ]
    );
    assert!(!report.synthetic_intensities());
    assert!(report.terminated);
    assert_eq!(report.energy, Some(-76.323512346789));
}

#[test]
fn frequency_fallback() {
    let report = Report::load("testfiles/freq_only.out").unwrap();
    assert_eq!(report.source, IrSource::FrequenciesOnly);
    assert_eq!(report.lines.len(), 15);
    assert!(
        report
            .lines
            .iter()
            .all(|l| l.synthetic && l.intensity == SENTINEL_INTENSITY)
    );
    let freqs: Vec<_> = report.lines.iter().map(|l| l.frequency).collect();
    assert_eq!(&freqs[6..9], &[1356.60, 1356.62, 1356.64]);
    assert_eq!(report.lines[14].index, Some(14));
    assert!(!report.terminated);
    assert_eq!(report.energy, Some(-40.451243217734));
}

#[test]
fn ir_triples_in_order() {
    let text = "
some preamble
IR SPECTRUM
 1   3000.0   10.0
 2   1500.5   2.5D+01
 3    800.25  1.0d-1
 4   3000.0   0.0

after the section
 5   1000.0   1.0
";
    let (lines, source) = parse_ir(text);
    assert_eq!(source, IrSource::Intensities);
    let got: Vec<_> = lines
        .iter()
        .map(|l| (l.index, l.frequency, l.intensity))
        .collect();
    assert_eq!(
        got,
        vec![
            (Some(1), 3000.0, 10.0),
            (Some(2), 1500.5, 25.0),
            (Some(3), 800.25, 0.1),
            (Some(4), 3000.0, 0.0),
        ]
    );
}

#[test]
fn ir_section_ends_at_raman() {
    let text = "ir spectrum
 1   3000.0   10.0
RAMAN SPECTRUM
 2   1500.0   5.0
";
    let (lines, _) = parse_ir(text);
    assert_eq!(lines.len(), 1);
}

#[test]
fn ir_section_ends_at_normal_modes() {
    let text = "IR SPECTRUM
 1   3000.0   10.0
NORMAL MODES
 2   1500.0   5.0
";
    let (lines, _) = parse_ir(text);
    assert_eq!(lines.len(), 1);
}

#[test]
fn ir_malformed_row_skipped() {
    // an overflowing index and an infinite intensity only drop their own rows
    let text = "IR SPECTRUM
 1   3000.0   10.0
 99999999999999999999999   2000.0   1.0
 3   1000.0   1.0D+999
 4   1500.0   5.0
";
    let (lines, _) = parse_ir(text);
    let freqs: Vec<_> = lines.iter().map(|l| l.frequency).collect();
    assert_eq!(freqs, vec![3000.0, 1500.0]);
}

#[test]
fn empty_ir_section_falls_back() {
    let text = "IR SPECTRUM


VIBRATIONAL FREQUENCIES
   6:      1622.44 cm**-1
   7:      3692.69 cm**-1
";
    let (lines, source) = parse_ir(text);
    assert_eq!(source, IrSource::FrequenciesOnly);
    assert_eq!(
        lines,
        vec![
            SpectralLine::frequency_only(Some(6), 1622.44),
            SpectralLine::frequency_only(Some(7), 3692.69),
        ]
    );
}

#[test_case(""; "empty")]
#[test_case("nothing to see here\n 1 2.0 3.0\n"; "no markers")]
#[test_case("-----------\nIR SPECTRUM\n-----------\n"; "truncated")]
fn no_lines(text: &str) {
    let report = Report::parse(text);
    assert!(report.lines.is_empty());
    assert_eq!(report.source, IrSource::None);
    assert_eq!(report.energy, None);
}

#[test]
fn energy_last_occurrence_wins() {
    let text = "Total Energy : -76.012345
...
FINAL SINGLE POINT ENERGY -76.099999
";
    assert_eq!(parse_energy(text), Some(-76.099999));

    let text = "FINAL SINGLE POINT ENERGY -76.099999
...
Total Energy : -76.012345
";
    assert_eq!(parse_energy(text), Some(-76.012345));
}

#[test_case("FINAL SINGLE POINT ENERGY   -1.5", -1.5; "final")]
#[test_case("total energy = -2.5", -2.5; "total")]
#[test_case("SCF total energy: -3.5D+00", -3.5; "scf total")]
#[test_case("TOTAL SCF ENERGY   -4.5", -4.5; "total scf no colon")]
#[test_case("Total SCF energy = -5.5", -5.5; "total scf")]
fn energy_phrases(text: &str, want: f64) {
    assert_eq!(parse_energy(text), Some(want));
}

#[test]
fn energy_absent() {
    assert_eq!(parse_energy("Electronic energy ... -76.3 Eh"), None);
}

#[test]
fn reparse_is_identical() {
    let text = std::fs::read_to_string("testfiles/water.out").unwrap();
    assert_eq!(Report::parse(&text), Report::parse(&text));
}

#[test]
fn raman_duplicates_overwrite() {
    let text = "
--------------
RAMAN SPECTRUM
--------------

 Mode    freq (cm**-1)   Activity   Depolarization
-------------------------------------------------------------------
  6:      1622.44      6.384672      0.738683
  7:      3692.69     76.231497      0.185426
  8:      1622.44      2.000000      0.750000

IR SPECTRUM
";
    let got = parse_raman(text);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].frequency, 1622.44);
    assert_eq!(got[0].activity, 2.0);
    assert_eq!(got[1].frequency, 3692.69);
    assert_abs_diff_eq!(got[1].activity, 76.231497);
}

#[test]
fn raman_activities_fallback() {
    let text = "RAMAN ACTIVITIES
  1   500.0   1.5
  2   900.0   0.5

  3   950.0   0.7
";
    let got = parse_raman(text);
    let got: Vec<_> = got.iter().map(|r| (r.frequency, r.activity)).collect();
    assert_eq!(got, vec![(500.0, 1.5), (900.0, 0.5)]);
}

#[test]
fn chemical_shifts() {
    let text = "
CHEMICAL SHIFTS

  0   C    128.512 ppm
  1   H      7.310 ppm
  2   Cl   1.2D+02 ppm

  3   H      1.000 ppm
";
    let got = parse_shifts(text);
    assert_eq!(got.len(), 3);
    assert_eq!(got[0].atom_index, 0);
    assert_eq!(got[0].element, "C");
    assert_eq!(got[1].shift_ppm, 7.31);
    assert_eq!(got[2].element, "Cl");
    assert_eq!(got[2].shift_ppm, 120.0);
}

#[test]
fn lossy_report() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"IR SPECTRUM\n 1 1000.0 2.0 \xff\xfe\n").unwrap();
    let report = Report::load(f.path()).unwrap();
    assert_eq!(report.lines, vec![SpectralLine::new(Some(1), 1000.0, 2.0)]);
}

#[test]
fn missing_report() {
    let got = Report::load("testfiles/nonexistent.out");
    assert_eq!(
        got,
        Err(ReportError::FileNotFound(
            "testfiles/nonexistent.out".to_owned()
        ))
    );
}

#[test]
fn load_xyz() {
    let got = Structure::load("testfiles/water.xyz").unwrap();
    assert_eq!(got.comment, "water");
    assert_eq!(
        got.atoms,
        vec![
            Atom::new("O", 0.0, 0.0, 0.1173),
            Atom::new("H", 0.0, 0.7572, -0.4692),
            Atom::new("H", 0.0, -0.7572, -0.4692),
        ]
    );
}

#[test]
fn xyz_without_header() {
    let got: Structure =
        "\nC 0.0 0.0 0.0 -0.2\nO 0.0 0.0 1.2\n".parse().unwrap();
    assert_eq!(got.comment, "");
    assert_eq!(got.atoms.len(), 2);
}

#[test]
fn bad_xyz() {
    let got =
        "2\ncomment\nC 0.0 0.0 0.0\nO 0.0 zero 1.2\n".parse::<Structure>();
    assert_eq!(got, Err(GeomError::BadAtom(4, "O 0.0 zero 1.2".to_owned())));
}

#[test]
fn xyz_round_trip() {
    let s = Structure::load("testfiles/water.xyz").unwrap();
    assert_eq!(s.to_xyz().parse::<Structure>().unwrap(), s);
}

#[test]
fn write_input() {
    let dir = tempfile::tempdir().unwrap();
    let filename = dir.path().join("water").to_string_lossy().to_string();
    let orca = Orca::new(
        filename,
        Template::default(),
        -1,
        2,
        Structure::load("testfiles/water.xyz").unwrap(),
    );
    orca.write_input().unwrap();
    let got = std::fs::read_to_string(orca.infile()).unwrap();
    let want = "! B3LYP def2-SVP Opt Freq TightSCF

* xyz -1 2
O     0.0000000000    0.0000000000    0.1173000000
H     0.0000000000    0.7572000000   -0.4692000000
H     0.0000000000   -0.7572000000   -0.4692000000
*
";
    assert_eq!(got, want);
}

#[cfg(unix)]
mod engine {
    use std::path::Path;

    use super::*;

    /// write a shell script to `dir/name` for the engine to run through sh
    fn script(dir: &Path, name: &str, body: &str) -> Engine {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        Engine::new("sh").args(vec![path.to_string_lossy().to_string()])
    }

    fn job(dir: &Path) -> Orca {
        let orca = Orca::new(
            dir.join("water").to_string_lossy().to_string(),
            Template::default(),
            0,
            1,
            Structure::load("testfiles/water.xyz").unwrap(),
        );
        orca.write_input().unwrap();
        orca
    }

    #[test]
    fn success() {
        let dir = tempfile::tempdir().unwrap();
        let report = std::fs::canonicalize("testfiles/water.out").unwrap();
        let engine = script(
            dir.path(),
            "fake_orca.sh",
            &format!("test -f \"$1\" || exit 3\ncat '{}'\n", report.display()),
        );
        let orca = job(dir.path());
        let out = engine.run(&orca).unwrap();
        let report = Report::load(out).unwrap();
        assert_eq!(report.lines.len(), 3);
    }

    #[test]
    fn failure() {
        let dir = tempfile::tempdir().unwrap();
        let engine = script(
            dir.path(),
            "fake_orca.sh",
            "echo 'starting up'
echo 'ERROR: basis set not found' >&2
exit 2
",
        );
        let orca = job(dir.path());
        let err = engine.run(&orca).unwrap_err();
        assert!(err.is_failed());
        let msg = err.to_string();
        assert!(msg.contains("starting up"), "{msg}");
        assert!(msg.contains("ERROR: basis set not found"), "{msg}");
    }

    #[test]
    fn missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let orca = job(dir.path());
        let err = Engine::new("/nonexistent/orca").run(&orca).unwrap_err();
        assert!(!err.is_failed());
    }
}
