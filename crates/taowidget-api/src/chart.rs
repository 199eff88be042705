//! PNG chart of a coldkey's daily balance and stake.
//!
//! Rendering happens in an RGB buffer through plotters' bitmap backend and is
//! encoded with `image`. Text uses DejaVu Sans, embedded in the binary and
//! registered with [`register_embedded_font`]; [`register_font`] replaces it
//! with a font from disk. Until one of them runs every render fails with
//! [`ChartError::Render`].

use std::io::Cursor;
use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use image::{ImageFormat, RgbImage};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use taowidget_core::{DailyData, Metric, TOKEN_SYMBOL, chart_title, latest_summary};
use thiserror::Error;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 700;
const FOOTER_HEIGHT: u32 = 50;
const FONT_FAMILY: &str = "sans-serif";

/// DejaVu Sans, see `assets/DejaVuSans.LICENSE`.
const EMBEDDED_FONT: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Chart rendering errors.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No data available")]
    NoData,

    #[error("Font error: {0}")]
    Font(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("PNG encoding error: {0}")]
    Encode(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for ChartError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        ChartError::Render(e.to_string())
    }
}

/// Use the font bundled with the binary for chart text.
pub fn register_embedded_font() -> Result<(), ChartError> {
    register_font_bytes(EMBEDDED_FONT, "embedded font")
}

/// Load the TrueType font at `path` and use it for chart text.
pub fn register_font(path: &Path) -> Result<(), ChartError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ChartError::Font(format!("{}: {}", path.display(), e)))?;
    // plotters keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font_bytes(bytes, &path.display().to_string())
}

fn register_font_bytes(bytes: &'static [u8], source: &str) -> Result<(), ChartError> {
    plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| ChartError::Font(format!("{source} is not a TrueType font")))
}

/// Line drawn for each series: legend label, colour and value.
type Series = (&'static str, RGBColor, fn(&DailyData) -> f64);

fn series() -> [Series; 3] {
    [
        (Metric::Balance.label(), BLUE, |d| d.balance),
        (Metric::Stake.label(), GREEN, |d| d.stake),
        ("Total", RED, |d| d.total()),
    ]
}

/// Upper bound of the value axis.
fn value_ceiling(days: &[DailyData]) -> f64 {
    let max = days
        .iter()
        .flat_map(|d| [d.balance, d.stake, d.total()])
        .fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Render `days` (sorted by date) for `coldkey` as a PNG.
///
/// Returns [`ChartError::NoData`] for an empty series without touching the
/// drawing backend.
pub fn render_chart(
    coldkey: &str,
    days: &[DailyData],
    rendered_at: DateTime<Utc>,
) -> Result<Vec<u8>, ChartError> {
    let (Some(first), Some(latest)) = (days.first(), days.last()) else {
        return Err(ChartError::NoData);
    };

    let mut pixels = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;
        let (plot_area, footer) = root.split_vertically((HEIGHT - FOOTER_HEIGHT) as i32);

        // Half a day of padding keeps single-day charts from collapsing.
        let x_range = (first.date - TimeDelta::hours(12))..(latest.date + TimeDelta::hours(12));

        let mut chart = ChartBuilder::on(&plot_area)
            .caption(chart_title(coldkey), (FONT_FAMILY, 28).into_font())
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, 0.0..value_ceiling(days))?;

        chart
            .configure_mesh()
            .x_labels(days.len().clamp(2, 10))
            .x_label_formatter(&|date: &DateTime<Utc>| date.format("%d %b").to_string())
            .y_label_formatter(&|value: &f64| format!("{value:.2}"))
            .y_desc(TOKEN_SYMBOL)
            .label_style((FONT_FAMILY, 14).into_font())
            .draw()?;

        for (label, color, value) in series() {
            chart
                .draw_series(LineSeries::new(
                    days.iter().map(|d| (d.date, value(d))),
                    color.stroke_width(2),
                ))?
                .label(label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT_FAMILY, 16).into_font())
            .draw()?;

        let footer_style = TextStyle::from((FONT_FAMILY, 16).into_font()).color(&BLACK);
        footer.draw_text(&latest_summary(latest, rendered_at), &footer_style, (20, 15))?;

        root.present()?;
    }

    encode_png(pixels)
}

/// Encode an RGB buffer of [`WIDTH`] x [`HEIGHT`] pixels as PNG.
pub fn encode_png(pixels: Vec<u8>) -> Result<Vec<u8>, ChartError> {
    let image = RgbImage::from_raw(WIDTH, HEIGHT, pixels)
        .ok_or_else(|| ChartError::Encode("pixel buffer does not match chart size".into()))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ChartError::Encode(e.to_string()))?;
    Ok(png)
}
