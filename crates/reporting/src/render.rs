//! PNG rendering of the dashboard: a titled 2×3 grid of panels.

use crate::dashboard::{CategoryPair, CategoryValue, DashboardData, EfficiencyRow};
use plotters::coord::Shift;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontStyle, FontTransform};
use romi_core::config::DashboardConfig;
use romi_core::{ReportError, ReportResult};
use std::path::Path;
use tracing::info;

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

const FONT: &str = "sans-serif";
const BAR_HALF_WIDTH: f64 = 0.4;
const PAIR_BAR_WIDTH: f64 = 0.35;

const PRIMARY: RGBColor = RGBColor(66, 133, 196);
const SECONDARY: RGBColor = RGBColor(237, 125, 49);
const HEADER_FILL: RGBColor = RGBColor(230, 230, 230);

/// Render the dashboard image to `path`, creating parent directories.
pub fn render_dashboard(
    path: &Path,
    data: &DashboardData,
    config: &DashboardConfig,
) -> ReportResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw_dashboard(&root, data, &config.title).map_err(render_error)?;
    root.present().map_err(render_error)?;

    info!(
        path = %path.display(),
        width = config.width,
        height = config.height,
        "Dashboard rendered"
    );
    Ok(())
}

fn render_error<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> ReportError {
    ReportError::Render(e.to_string())
}

/// Draw every panel onto `root`. Backend-agnostic so any plotters target works.
pub fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &DashboardData,
    title: &str,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;
    let (_, height) = root.dim_in_pixel();
    let scale = Scale::new(height);

    let body = root.titled(
        title,
        (FONT, scale.title).into_font().style(FontStyle::Bold),
    )?;
    let panels = body.split_evenly((2, 3));

    draw_pie(&panels[0], "Spend share by source", &data.cost_share, &scale)?;
    draw_bars(&panels[1], "ROAS by source", &data.roas, &scale)?;
    draw_pairs(
        &panels[2],
        "Costs vs revenue",
        ("Costs", "Revenue"),
        &data.costs_vs_revenue,
        &scale,
    )?;
    draw_bars(&panels[3], "Cost per lead (CPA) by source", &data.cpa, &scale)?;
    draw_pairs(
        &panels[4],
        "Leads and orders by source",
        ("Leads", "Orders"),
        &data.leads_vs_orders,
        &scale,
    )?;
    draw_table(&panels[5], "Overall source efficiency", &data.efficiency, &scale)?;
    Ok(())
}

/// Font and spacing sizes derived from the image height.
struct Scale {
    title: f64,
    caption: f64,
    label: f64,
    table: f64,
    margin: u32,
    x_label_area: u32,
    y_label_area: u32,
}

impl Scale {
    fn new(height: u32) -> Self {
        let h = f64::from(height);
        Self {
            title: (h / 36.0).max(12.0),
            caption: (h / 54.0).max(10.0),
            label: (h / 80.0).max(8.0),
            table: (h / 70.0).max(8.0),
            margin: (height / 100).max(4),
            // Room for category names written vertically.
            x_label_area: (height / 10).max(40),
            y_label_area: (height / 15).max(30),
        }
    }
}

/// Category names under the bars, turned a quarter so long names don't
/// collide.
fn tick_label_style(scale: &Scale) -> TextStyle<'static> {
    TextStyle::from((FONT, scale.label).into_font()).transform(FontTransform::Rotate90)
}

// ─── Panels ─────────────────────────────────────────────────────────────────

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    slices: &[CategoryValue],
    scale: &Scale,
) -> DrawResult<DB> {
    let area = area.titled(caption, (FONT, scale.caption))?;
    if slices.is_empty() {
        return draw_no_data(&area, scale);
    }

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;
    let sizes: Vec<f64> = slices.iter().map(|s| s.value).collect();
    let colors = palette(slices.len());
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.label_style((FONT, scale.label).into_font().color(&BLACK));
    pie.percentages((FONT, scale.label * 0.9).into_font().color(&BLACK));
    area.draw(&pie)
}

fn draw_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    bars: &[CategoryValue],
    scale: &Scale,
) -> DrawResult<DB> {
    if bars.is_empty() {
        let area = area.titled(caption, (FONT, scale.caption))?;
        return draw_no_data(&area, scale);
    }

    let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
    let top = axis_top(bars.iter().map(|b| b.value));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, scale.caption))
        .margin(scale.margin)
        .x_label_area_size(scale.x_label_area)
        .y_label_area_size(scale.y_label_area)
        .build_cartesian_2d(category_range(bars.len()), 0f64..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .label_style((FONT, scale.label))
        .x_label_style(tick_label_style(scale))
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, bar.value)],
            PRIMARY.filled(),
        )
    }))?;
    Ok(())
}

fn draw_pairs<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    names: (&str, &str),
    pairs: &[CategoryPair],
    scale: &Scale,
) -> DrawResult<DB> {
    if pairs.is_empty() {
        let area = area.titled(caption, (FONT, scale.caption))?;
        return draw_no_data(&area, scale);
    }

    let labels: Vec<&str> = pairs.iter().map(|p| p.label.as_str()).collect();
    let top = axis_top(pairs.iter().flat_map(|p| [p.first, p.second]));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, scale.caption))
        .margin(scale.margin)
        .x_label_area_size(scale.x_label_area)
        .y_label_area_size(scale.y_label_area)
        .build_cartesian_2d(category_range(pairs.len()), 0f64..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(pairs.len())
        .x_label_formatter(&|x| category_label(&labels, *x))
        .label_style((FONT, scale.label))
        .x_label_style(tick_label_style(scale))
        .draw()?;

    chart
        .draw_series(pairs.iter().enumerate().map(|(i, p)| {
            let x = i as f64;
            Rectangle::new([(x - PAIR_BAR_WIDTH, 0.0), (x, p.first)], PRIMARY.filled())
        }))?
        .label(names.0)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], PRIMARY.filled()));

    chart
        .draw_series(pairs.iter().enumerate().map(|(i, p)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + PAIR_BAR_WIDTH, p.second)], SECONDARY.filled())
        }))?
        .label(names.1)
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], SECONDARY.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .label_font((FONT, scale.label))
        .draw()?;
    Ok(())
}

fn draw_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    caption: &str,
    rows: &[EfficiencyRow],
    scale: &Scale,
) -> DrawResult<DB> {
    let area = area.titled(caption, (FONT, scale.caption))?;
    if rows.is_empty() {
        return draw_no_data(&area, scale);
    }

    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let line_count = rows.len() as i32 + 1;
    let row_height = ((scale.table * 1.8) as i32).min(h / line_count).max(1);
    let col_width = (w * 9 / 10) / 4;
    let left = (w - col_width * 4) / 2;
    let top = ((h - row_height * line_count) / 2).max(0);

    let style = TextStyle::from((FONT, scale.table)).pos(Pos::new(HPos::Center, VPos::Center));
    let header = ["source", "costs", "revenue", "roas"].map(String::from);
    let lines = std::iter::once(header).chain(rows.iter().map(|r| {
        [
            r.source.clone(),
            format!("{:.2}", r.costs),
            format!("{:.2}", r.revenue),
            r.roas
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string()),
        ]
    }));

    for (r, cells) in lines.enumerate() {
        let y0 = top + r as i32 * row_height;
        let fill = if r == 0 { HEADER_FILL } else { WHITE };
        for (c, text) in cells.iter().enumerate() {
            let x0 = left + c as i32 * col_width;
            let corners = [(x0, y0), (x0 + col_width, y0 + row_height)];
            area.draw(&Rectangle::new(corners, fill.filled()))?;
            area.draw(&Rectangle::new(corners, BLACK.stroke_width(1)))?;
            area.draw(&Text::new(
                text.as_str(),
                (x0 + col_width / 2, y0 + row_height / 2),
                style.clone(),
            ))?;
        }
    }
    Ok(())
}

fn draw_no_data<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, scale: &Scale) -> DrawResult<DB> {
    let (w, h) = area.dim_in_pixel();
    let style = TextStyle::from((FONT, scale.label)).pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", (w as i32 / 2, h as i32 / 2), style))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Evenly spaced hues, one per slice.
fn palette(n: usize) -> Vec<RGBColor> {
    let n = n.max(1);
    (0..n)
        .map(|i| {
            let (r, g, b) = HSLColor(i as f64 / n as f64, 0.65, 0.55)
                .to_backend_color()
                .rgb;
            RGBColor(r, g, b)
        })
        .collect()
}

/// Category `i` sits at x = i; the range leaves half a slot on each side.
fn category_range(n: usize) -> std::ops::Range<f64> {
    -0.5..(n as f64 - 0.5)
}

fn category_label(labels: &[&str], x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    labels
        .get(nearest as usize)
        .map(|l| l.to_string())
        .unwrap_or_default()
}

/// Upper y bound with headroom; a flat or empty series still gets an axis.
fn axis_top(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
