use approx::assert_abs_diff_eq;
use broaden::synthesize;
use insta::assert_snapshot;
use qcreport::{Report, SpectralLine, geom::Structure};
use tempfile::tempdir;
use test_case::test_case;

use super::*;
use crate::config::PlotConfig;

fn water() -> Report {
    Report::load("testfiles/water.out").unwrap()
}

fn csv_string(lines: &[SpectralLine]) -> String {
    let mut buf = Vec::new();
    table::write_csv(&mut buf, lines).unwrap();
    assert!(buf.starts_with(b"\xEF\xBB\xBF"));
    String::from_utf8(buf[3..].to_vec()).unwrap()
}

#[test]
fn csv_water() {
    let got = csv_string(&water().lines);
    assert_snapshot!(got, @r"
    No.,Frequency (cm-1),Intensity
    1,1622.44,0.012669
    2,3692.69,0.000648
    3,3792.41,0.00397
    ");
}

#[test]
fn csv_all_zero() {
    let lines = [
        SpectralLine::new(Some(1), 100.0, 0.0),
        SpectralLine::new(Some(2), 200.0, 0.0),
    ];
    let got = csv_string(&lines);
    let rows: Vec<_> = got.lines().skip(1).collect();
    assert_eq!(rows, ["1,100.0,1.0", "2,200.0,1.0"]);
}

#[test]
fn csv_empty() {
    assert_eq!(csv_string(&[]), "No.,Frequency (cm-1),Intensity\n");
}

#[test]
fn summary_water() {
    let report = water();
    let got = summary::Summary::new("water", &report, 40).to_string();
    let want = "water

Total energy: -76.323512 Eh
Vibrational lines: 3

1622.44 cm-1 (intensity: 0.01)
3692.69 cm-1 (intensity: 0.00)
3792.41 cm-1 (intensity: 0.00)

Page 1 of 1
";
    assert_eq!(got, want);
}

#[test_case(1, 15)]
#[test_case(6, 3)]
#[test_case(15, 1)]
#[test_case(40, 1)]
fn summary_pages(page_lines: usize, want: usize) {
    let report = Report::load("testfiles/freq_only.out").unwrap();
    let summary = summary::Summary::new("freq", &report, page_lines);
    assert_eq!(summary.page_count(), want);

    let text = summary.to_string();
    let pages: Vec<_> = text.split('\x0c').collect();
    assert_eq!(pages.len(), want);
    for (i, page) in pages.iter().enumerate() {
        assert!(page.ends_with(&format!("Page {} of {want}\n", i + 1)));
    }
    let rows = text.matches(" cm-1 (intensity: 1.00)*").count();
    assert_eq!(rows, 15);
}

#[test]
fn summary_without_data() {
    let report = Report::default();
    let got = summary::Summary::new("empty", &report, 0).to_string();
    let want = "empty

Warning: total energy not found
Vibrational lines: 0

No vibrational lines found

Page 1 of 1
";
    assert_eq!(got, want);
}

#[test]
fn synthetic_marker() {
    let report = Report::load("testfiles/freq_only.out").unwrap();
    let got = summary::Summary::new("freq", &report, 40).to_string();
    assert!(got.contains("* intensity not reported"));
}

#[test]
fn html() {
    let mut mol = Structure::load("testfiles/water.xyz").unwrap();
    let got = view::molecule_html("water", &mol);
    assert!(got.starts_with("<!DOCTYPE html>"));
    assert!(got.contains("<title>water</title>"));
    assert!(got.contains(&mol.to_xyz()));
    assert!(got.contains(r#"viewer.addModel(xyz, "xyz");"#));

    mol.comment = "</script>`${x}`".to_owned();
    let got = view::molecule_html("a<b", &mol);
    assert!(got.contains("<title>a&lt;b</title>"));
    assert!(got.contains(r"\x3c/script>\`\${x}\`"));
    assert_eq!(got.matches("</script>").count(), 2);
}

/// whether `svg` contains a text element reading exactly `label`
fn has_text(svg: &str, label: &str) -> bool {
    svg.contains(&format!(">{label}<"))
        || svg.lines().any(|line| line.trim() == label)
}

#[test_case("ir.svg" ; "svg")]
#[test_case("ir.png" ; "png")]
fn plot_file(name: &str) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    let report = water();
    let spectrum = synthesize(&report.pairs(), &broaden::Config::default());
    let config = PlotConfig {
        width: 400,
        height: 300,
        ..PlotConfig::default()
    };
    plot::plot_spectrum(&path, "water", &spectrum, &config).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    if name.ends_with("svg") {
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("<svg"));
        assert!(has_text(&text, "1622"));
        assert!(has_text(&text, "3792"));
        // below the label threshold
        assert!(!has_text(&text, "3693"));
    } else {
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}

#[test]
fn plot_flat() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flat.svg");
    let spectrum = synthesize(&[], &broaden::Config::default());
    plot::plot_spectrum(&path, "flat", &spectrum, &PlotConfig::default())
        .unwrap();
    assert!(path.exists());
}

#[test]
fn peak_labels_truncate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("labels.svg");
    let lines = [(1622.9, 1.0), (3692.69, 0.5)];
    let spectrum = synthesize(&lines, &broaden::Config::default());
    plot::plot_spectrum(&path, "labels", &spectrum, &PlotConfig::default())
        .unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(has_text(&text, "1622"));
    assert!(has_text(&text, "3692"));
    assert!(!has_text(&text, "1623"));
    assert!(!has_text(&text, "3693"));
}

#[test]
fn results_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("water.json");
    let report = water();
    let spectrum = synthesize(&report.pairs(), &broaden::Config::default());
    Results::new("water", "deadbeef", &report, &spectrum)
        .write(&path)
        .unwrap();

    let got: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap())
            .unwrap();
    assert_eq!(got["job"], "water");
    assert_eq!(got["peaks"].as_array().unwrap().len(), 3);
    assert_abs_diff_eq!(
        got["report"]["energy"].as_f64().unwrap(),
        -76.323512346789,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        got["max_frequency"].as_f64().unwrap(),
        1622.44,
        epsilon = 1.0
    );

    // the report survives the trip through the file
    let back: Report =
        serde_json::from_value(got["report"].clone()).unwrap();
    assert_eq!(back, report);
}
