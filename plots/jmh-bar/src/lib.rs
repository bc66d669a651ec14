use std::path::PathBuf;

use common::plot::{BarChartData, Plot};
use eyre::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

const TITLE_FONT_SIZE: u32 = 24;
const AXIS_LABEL_FONT_SIZE: u32 = 16;
const TICK_LABEL_FONT_SIZE: u32 = 12;
const Y_LABEL_AREA_SIZE: u32 = 90;
const CHART_MARGIN: u32 = 20;
// Space between the x axis and the start of a tick label
const TICK_LABEL_GAP: i32 = 8;
// Whisker cap, in pixels
const CAP_WIDTH: i32 = 6;
// Fraction of a slot covered by its bar
const BAR_WIDTH: f64 = 0.8;
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);

const MIN_WIDTH: u32 = 640;
const MIN_X_LABEL_AREA: u32 = 40;
const SLOT_WIDTH: u32 = 48;
const PLOT_HEIGHT: u32 = 480;

/// Bar chart of JMH scores with error whiskers, written as SVG
#[derive(Debug, Clone)]
pub struct JmhBar {
    output: PathBuf,
    width: Option<u32>,
    height: Option<u32>,
}

/// Figure dimensions derived from the chart contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub x_label_area: u32,
}

impl Layout {
    /// Sizes the figure so rotated tick labels and the title stay inside it.
    /// The label area grows with the longest label, and the figure height with it.
    pub fn for_chart(chart: &BarChartData) -> Self {
        let longest_label = chart
            .bars
            .iter()
            .map(|bar| bar.label.chars().count())
            .max()
            .unwrap_or(0) as u32;
        let x_label_area = (text_width(longest_label, TICK_LABEL_FONT_SIZE)
            + TICK_LABEL_GAP as u32
            + CHART_MARGIN)
            .max(MIN_X_LABEL_AREA);

        let title_width =
            text_width(chart.title().chars().count() as u32, TITLE_FONT_SIZE) + Y_LABEL_AREA_SIZE;
        let width = (chart.bars.len() as u32 * SLOT_WIDTH + Y_LABEL_AREA_SIZE + 2 * CHART_MARGIN)
            .max(title_width)
            .max(MIN_WIDTH);

        Layout {
            width,
            height: PLOT_HEIGHT + x_label_area,
            x_label_area,
        }
    }
}

// Rough rendered width of `chars` glyphs of a sans-serif font
fn text_width(chars: u32, font_size: u32) -> u32 {
    chars * font_size * 6 / 10
}

impl JmhBar {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        JmhBar {
            output: output.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn draw(&self, chart: &BarChartData) -> Result<()> {
        let layout = Layout::for_chart(chart);
        let size = (
            self.width.unwrap_or(layout.width),
            self.height.unwrap_or(layout.height),
        );
        debug!("Drawing {} bars at {size:?}", chart.bars.len());

        let root = SVGBackend::new(&self.output, size).into_drawing_area();
        root.fill(&WHITE)?;

        let count = chart.bars.len();
        let (low, high) = chart.value_range();
        let padding = (high - low) * 0.05;
        let y_low = if low < 0.0 { low - padding } else { 0.0 };

        let mut ctx = ChartBuilder::on(&root)
            .caption(chart.title(), ("sans-serif", TITLE_FONT_SIZE))
            .margin(CHART_MARGIN)
            .x_label_area_size(layout.x_label_area)
            .y_label_area_size(Y_LABEL_AREA_SIZE)
            .build_cartesian_2d(-0.5..(count as f64 - 0.5), y_low..(high + padding))?;

        // Tick labels are drawn below, the mesh only places the tick marks
        ctx.configure_mesh()
            .disable_x_mesh()
            .x_labels(count)
            .x_label_formatter(&|_| String::new())
            .y_desc(chart.y_label())
            .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
            .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
            .draw()?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(idx, bar)| {
            let x = idx as f64;
            Rectangle::new(
                [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, bar.height())],
                BAR_COLOR.filled(),
            )
        }))?;

        let whiskers = chart
            .bars
            .iter()
            .enumerate()
            .filter_map(|(idx, bar)| {
                let whisker = bar.whisker()?;
                Some((idx as f64, bar.height() - whisker, bar.height() + whisker))
            })
            .collect::<Vec<_>>();
        ctx.draw_series(whiskers.iter().map(|&(x, bottom, top)| {
            PathElement::new(vec![(x, bottom), (x, top)], BLACK.stroke_width(1))
        }))?;
        ctx.draw_series(
            whiskers
                .iter()
                .flat_map(|&(x, bottom, top)| [(x, bottom), (x, top)])
                .map(|end| {
                    EmptyElement::at(end)
                        + PathElement::new(
                            vec![(-CAP_WIDTH / 2, 0), (CAP_WIDTH / 2, 0)],
                            BLACK.stroke_width(1),
                        )
                }),
        )?;

        // Rotated a quarter turn and anchored at their start, so each label hangs
        // down from its tick instead of crossing the axis
        let tick_style = TextStyle::from(("sans-serif", TICK_LABEL_FONT_SIZE).into_font())
            .transform(FontTransform::Rotate90)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (idx, bar) in chart.bars.iter().enumerate() {
            let (x, y) = ctx.backend_coord(&(idx as f64, y_low));
            root.draw(&Text::new(
                bar.label.as_str(),
                (x, y + TICK_LABEL_GAP),
                tick_style.clone(),
            ))?;
        }

        root.present()?;
        Ok(())
    }
}

impl Plot for JmhBar {
    fn name(&self) -> &'static str {
        "jmh-bar"
    }

    fn plot(&self, chart: &BarChartData) -> Result<()> {
        self.draw(chart)
            .with_context(|| format!("Render chart to {}", self.output.display()))
    }
}
