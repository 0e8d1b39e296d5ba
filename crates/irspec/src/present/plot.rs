//! Rendering a [Spectrum] the way IR spectra are usually drawn: wavenumber
//! decreasing from left to right and absorption pointing down.

use std::{path::Path, sync::LazyLock};

use broaden::Spectrum;
use log::debug;
use plotters::{coord::Shift, prelude::*, style::register_font};

use super::PresentError;
use crate::config::PlotConfig;

/// headroom above the tallest peak, in normalized intensity
const HEADROOM: f64 = 0.1;

/// all text is drawn in this family
const FAMILY: &str = "sans-serif";

/// the raster backend has no system font lookup, so every label is drawn with
/// this embedded face
static FONT: LazyLock<Result<(), String>> = LazyLock::new(|| {
    register_font(
        FAMILY,
        FontStyle::Normal,
        include_bytes!("../../fonts/DejaVuSans.ttf"),
    )
    .map_err(|_| "failed to load embedded font".to_string())
});

/// Draw `spectrum` to `path`. The image is an SVG if `path` ends in `.svg` and
/// a PNG otherwise.
pub fn plot_spectrum(
    path: &Path,
    title: &str,
    spectrum: &Spectrum,
    config: &PlotConfig,
) -> Result<(), PresentError> {
    let size = (config.width, config.height);
    let threshold = config.label_threshold;
    let name = path.display().to_string();
    let svg = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if let Err(e) = &*FONT {
        return Err(PresentError::Plot(name, e.clone()));
    }
    debug!("plotting {name} at {}x{}", size.0, size.1);
    let res = if svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw(&root, title, spectrum, threshold).map_err(|e| e.to_string())
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw(&root, title, spectrum, threshold).map_err(|e| e.to_string())
    };
    res.map_err(|e| PresentError::Plot(name, e))
}

/// The chart is drawn in negated coordinates so that plotters' usual
/// increasing axes come out reversed, and the labels negate them back.
fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    spectrum: &Spectrum,
    threshold: f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (lo, hi) = match (spectrum.x.first(), spectrum.x.last()) {
        (Some(&lo), Some(&hi)) if lo < hi => (lo, hi),
        _ => (400.0, 4000.0),
    };
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(title, (FAMILY, 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-hi..-lo, -(1.0 + HEADROOM)..0.05)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .label_style((FAMILY, 12))
        .axis_desc_style((FAMILY, 14))
        .x_desc("Wavenumber (cm-1)")
        .y_desc("Relative intensity")
        .x_label_formatter(&|x| format!("{:.0}", -x))
        .y_label_formatter(&|y| format!("{:.1}", -y))
        .draw()?;

    chart.draw_series(LineSeries::new(
        spectrum.x.iter().zip(&spectrum.y).map(|(&x, &y)| (-x, -y)),
        BLUE.stroke_width(2),
    ))?;

    for peak in spectrum.significant_peaks(threshold) {
        let (f, i) = (peak.frequency, peak.intensity);
        if f < lo || f > hi {
            continue;
        }
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(-f, 0.0), (-f, -i)],
            BLACK.mix(0.4).stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(Text::new(
            format!("{}", f.trunc() as i64),
            (-f, -i - 0.02),
            (FAMILY, 12)
                .into_font()
                .transform(FontTransform::Rotate270)
                .color(&BLACK),
        )))?;
    }

    root.present()?;
    Ok(())
}
