use std::{ops::Range, path::{Path, PathBuf}};
use plotters::{
    coord::{ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter}, Shift},
    element::DashedPathElement,
    prelude::{ChartBuilder, Color, DashedLineSeries, DrawResult, DrawingArea, DrawingBackend, IntoDrawingArea, RGBColor, Rectangle, BLACK, BLUE, RED, WHITE},
};
use tracing::{debug, info};
use crate::{
    dataset::Dataset,
    error::GraphError,
    legend::{best_location, LegendLoc, Obstacles, UnitBox},
    tikz::{estimate_text_size, PictureSize, TikzBackend},
};

/// Width of one bar, in x-axis units (one unit per profile group).
pub const BAR_WIDTH: f64 = 0.25;
/// Distance between the obfuscated and deobfuscated bar of a group.
pub const BAR_OFFSET: f64 = 0.25;
/// Canvas size in drawing units; the TikZ picture scales it to
/// `\textwidth` x `6cm`.
pub const CANVAS: (u32, u32) = (640, 240);
pub const PICTURE: PictureSize = PictureSize { width: "\\textwidth", height: "6cm" };

const ORIGINAL_COLOR: RGBColor = RGBColor(31, 119, 180);
const OBFUSCATED_COLOR: RGBColor = RED;
const DEOBFUSCATED_COLOR: RGBColor = BLUE;
// Fraction of the data span left empty on each side of the x axis.
const X_MARGIN: f64 = 0.05;
const Y_HEADROOM: f64 = 1.05;
// Dash and gap length of the baseline, in drawing units.
const DASH: u32 = 6;
const DASH_GAP: u32 = 4;
const LEGEND_FONT: u32 = 12;
const LEGEND_SWATCH: u32 = 25;
const LEGEND_MARGIN: u32 = 8;
const SERIES: [&str; 3] = ["Original", "Obfuscated", "Deobfuscated"];

/// Where everything sits in data space. Group `i` has its obfuscated bar
/// centred on `i` and its deobfuscated bar [`BAR_OFFSET`] to the right.
/// Bars grow from 0, so the y range only reaches below 0 for negative ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct BarLayout {
    pub groups: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl BarLayout {
    pub fn new(dataset: &Dataset) -> Self {
        let groups = dataset.len().max(1);
        let lo = -BAR_WIDTH / 2.0;
        let hi = (groups - 1) as f64 + BAR_OFFSET + BAR_WIDTH / 2.0;
        let pad = (hi - lo) * X_MARGIN;
        Self {
            groups,
            x_min: lo - pad,
            x_max: hi + pad,
            y_min: dataset.min_ratio() * Y_HEADROOM,
            y_max: dataset.max_ratio() * Y_HEADROOM,
        }
    }

    pub fn obfuscated_bar(&self, group: usize) -> (f64, f64) {
        let c = group as f64;
        (c - BAR_WIDTH / 2.0, c + BAR_WIDTH / 2.0)
    }

    pub fn deobfuscated_bar(&self, group: usize) -> (f64, f64) {
        let c = group as f64 + BAR_OFFSET;
        (c - BAR_WIDTH / 2.0, c + BAR_WIDTH / 2.0)
    }

    /// Tick position of a group, halfway between its two bars.
    pub fn tick(&self, group: usize) -> f64 {
        group as f64 + BAR_OFFSET / 2.0
    }

    fn unit_y(&self, y: f64) -> f64 {
        (y - self.y_min) / (self.y_max - self.y_min)
    }

    fn unit_box(&self, (x0, x1): (f64, f64), height: f64) -> UnitBox {
        let span = self.x_max - self.x_min;
        UnitBox::new(
            (x0 - self.x_min) / span,
            self.unit_y(height.min(0.0)),
            (x1 - self.x_min) / span,
            self.unit_y(height.max(0.0)),
        )
    }

    /// Bars and the baseline in plot-relative coordinates.
    pub fn obstacles(&self, dataset: &Dataset) -> Obstacles {
        let mut boxes = Vec::with_capacity(2 * dataset.len());
        for (i, r) in dataset.obf.values().enumerate() {
            boxes.push(self.unit_box(self.obfuscated_bar(i), r.obfuscated));
            boxes.push(self.unit_box(self.deobfuscated_bar(i), r.deobfuscated));
        }
        Obstacles { boxes, hlines: vec![self.unit_y(dataset.original)] }
    }
}

/// X axis with one labelled tick per profile group.
struct GroupAxis {
    range: Range<f64>,
    ticks: Vec<(f64, String)>,
}

impl GroupAxis {
    fn new(layout: &BarLayout, dataset: &Dataset) -> Self {
        Self {
            range: layout.x_min..layout.x_max,
            ticks: dataset.profiles().enumerate().map(|(i, p)| (layout.tick(i), p.to_string())).collect(),
        }
    }
}

impl Ranged for GroupAxis {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        let frac = (value - self.range.start) / (self.range.end - self.range.start);
        limit.0 + (frac * (limit.1 - limit.0) as f64).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        self.ticks.iter().map(|(x, _)| *x).collect()
    }

    fn range(&self) -> Range<f64> {
        self.range.clone()
    }
}

impl ValueFormatter<f64> for GroupAxis {
    fn format_ext(&self, value: &f64) -> String {
        self.ticks.iter()
            .find(|(x, _)| (x - value).abs() < 1e-9)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    }
}

/// Picks the legend corner from the estimated legend size and the plotting
/// area size, both in drawing units.
fn legend_location(layout: &BarLayout, dataset: &Dataset, plot: (u32, u32)) -> LegendLoc {
    let label_w = SERIES.iter()
        .map(|s| estimate_text_size(s, LEGEND_FONT as f64).0)
        .max()
        .unwrap_or(0);
    let w = (LEGEND_SWATCH + label_w + LEGEND_MARGIN) as f64 / plot.0.max(1) as f64;
    let h = (SERIES.len() as u32 * (LEGEND_FONT + 4) + LEGEND_MARGIN) as f64 / plot.1.max(1) as f64;
    let margin = LEGEND_MARGIN as f64 / plot.1.max(1) as f64;
    best_location(&layout.obstacles(dataset), w, h, margin)
}

/// Draws the grouped bar chart: a dashed line at the baseline ratio, then
/// one obfuscated and one deobfuscated bar per profile.
pub fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, dataset: &Dataset, prop: &str) -> DrawResult<(), DB> {
    let layout = BarLayout::new(dataset);
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(GroupAxis::new(&layout, dataset), layout.y_min..layout.y_max)?;

    chart.configure_mesh()
        .disable_mesh()
        .y_label_formatter(&|y| format!("{:.1}", y))
        .y_desc(prop)
        .draw()?;

    let original_style = ORIGINAL_COLOR.stroke_width(1);
    chart.draw_series(DashedLineSeries::new(
        vec![(layout.x_min, dataset.original), (layout.x_max, dataset.original)],
        DASH,
        DASH_GAP,
        original_style,
    ))?
    .label(SERIES[0])
    .legend(move |(x, y)| DashedPathElement::new(vec![(x, y), (x + 20, y)], DASH, DASH_GAP, original_style));

    chart.draw_series(dataset.obf.values().enumerate().map(|(i, r)| {
        let (x0, x1) = layout.obfuscated_bar(i);
        Rectangle::new([(x0, 0.0), (x1, r.obfuscated)], OBFUSCATED_COLOR.filled())
    }))?
    .label(SERIES[1])
    .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], OBFUSCATED_COLOR.filled()));

    chart.draw_series(dataset.obf.values().enumerate().map(|(i, r)| {
        let (x0, x1) = layout.deobfuscated_bar(i);
        Rectangle::new([(x0, 0.0), (x1, r.deobfuscated)], DEOBFUSCATED_COLOR.filled())
    }))?
    .label(SERIES[2])
    .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], DEOBFUSCATED_COLOR.filled()));

    let loc = legend_location(&layout, dataset, chart.plotting_area().dim_in_pixel());
    debug!("legend at {:?}", loc);
    chart.configure_series_labels()
        .position(loc.into())
        .label_font(("sans-serif", LEGEND_FONT))
        .legend_area_size(LEGEND_SWATCH)
        .margin(LEGEND_MARGIN)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

/// Renders the chart into a TikZ document held in memory.
pub fn render_to_string(dataset: &Dataset, prop: &str) -> Result<String, GraphError> {
    dataset.check_finite()?;
    let mut buf = String::new();
    {
        let root = TikzBackend::with_string(&mut buf, CANVAS, PICTURE).into_drawing_area();
        draw_chart(&root, dataset, prop)?;
        root.present()?;
    }
    Ok(buf)
}

/// Renders the chart to `{filename}.tex`. Nothing is written unless the
/// dataset is chartable and drawing succeeds.
pub fn render(dataset: &Dataset, filename: &Path, prop: &str) -> Result<PathBuf, GraphError> {
    dataset.check_finite()?;
    let mut path = filename.as_os_str().to_owned();
    path.push(".tex");
    let path = PathBuf::from(path);
    let root = TikzBackend::new(&path, CANVAS, PICTURE).into_drawing_area();
    draw_chart(&root, dataset, prop)?;
    root.present()?;
    info!("wrote {}", path.display());
    Ok(path)
}
