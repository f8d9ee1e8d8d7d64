//! Plotters-powered PNG renderers for the published charts.
//!
//! Two chart families:
//!
//! - the intraday snapshot: dark palette, percent-vs-open line with an area
//!   fill down to 0%, green when the day is up and red when it is down
//! - trailing-window level charts (7d/1m/1y): plain line on white
//!
//! Both are data-driven and deterministic given the same input series, so a
//! re-run with identical data reproduces the same image.

use std::path::Path;

use chrono_tz::America::New_York;
use plotters::prelude::*;

use crate::domain::{IntradayPoint, LevelPoint};
use crate::error::AppError;

const INTRADAY_SIZE: (u32, u32) = (1500, 850);
const WINDOW_SIZE: (u32, u32) = (900, 400);

// Dark palette for the intraday chart.
const BG: RGBColor = RGBColor(0x0b, 0x14, 0x20);
const TEXT: RGBColor = RGBColor(0xe6, 0xf2, 0xfb);
const TICKS: RGBColor = RGBColor(0x9f, 0xb6, 0xc7);
const GRID: RGBColor = RGBColor(0x1f, 0x2d, 0x3d);
const ZERO_LINE: RGBColor = RGBColor(0x28, 0x40, 0x56);
const UP: RGBColor = RGBColor(0x10, 0xb9, 0x81);
const DOWN: RGBColor = RGBColor(0xfb, 0x71, 0x85);

fn plot_err<E: std::fmt::Display>(path: &Path) -> impl Fn(E) -> AppError + '_ {
    move |e| AppError::write(format!("Failed to render chart '{}': {e}", path.display()))
}

/// Render the intraday percent-vs-open chart.
///
/// The series is smoothed with a 3-point trailing moving average before
/// drawing; `updated_at` goes into the title.
pub fn render_intraday_chart(
    path: &Path,
    series: &[IntradayPoint],
    updated_at: &str,
) -> Result<(), AppError> {
    let Some(first) = series.first() else {
        return Err(AppError::data("Cannot render an empty intraday series."));
    };
    let last_pct = series.last().map(|p| p.pct_vs_open).unwrap_or(0.0);
    let line_color = if last_pct >= 0.0 { UP } else { DOWN };

    let smoothed = moving_average(series, 3);
    let points: Vec<(f64, f64)> = smoothed
        .iter()
        .map(|p| {
            let minutes = (p.timestamp - first.timestamp).num_seconds() as f64 / 60.0;
            (minutes, p.pct_vs_open)
        })
        .collect();

    let x_max = points.last().map(|&(x, _)| x).unwrap_or(0.0).max(1.0);
    let (mut y_min, mut y_max) = value_bounds(points.iter().map(|&(_, y)| y));
    // Always keep the 0% line in frame with a little headroom.
    let pad = ((y_max - y_min) * 0.1).max(1.0);
    y_min = (y_min - pad).min(-pad);
    y_max = (y_max + pad).max(pad);

    let start = first.timestamp;
    let fmt_x = move |v: &f64| {
        let t = start + chrono::Duration::seconds((v * 60.0) as i64);
        t.with_timezone(&New_York).format("%H:%M").to_string()
    };

    let root = BitMapBackend::new(path, INTRADAY_SIZE).into_drawing_area();
    root.fill(&BG).map_err(plot_err(path))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!("QBIT-5 Intraday Snapshot ({updated_at})"),
            ("sans-serif", 28).into_font().color(&TEXT),
        )
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(plot_err(path))?;

    chart
        .configure_mesh()
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|v| format!("{v:.1}%"))
        .y_desc("Change vs Open (%)")
        .label_style(("sans-serif", 16).into_font().color(&TICKS))
        .axis_desc_style(("sans-serif", 18).into_font().color(&TEXT))
        .axis_style(&GRID)
        .bold_line_style(GRID.mix(0.6))
        .light_line_style(GRID.mix(0.35))
        .draw()
        .map_err(plot_err(path))?;

    // 0% reference line.
    chart
        .draw_series(LineSeries::new(
            [(0.0, 0.0), (x_max, 0.0)],
            ZERO_LINE.stroke_width(1),
        ))
        .map_err(plot_err(path))?;

    chart
        .draw_series(AreaSeries::new(points.iter().copied(), 0.0, line_color.mix(0.16)))
        .map_err(plot_err(path))?;
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            line_color.stroke_width(2),
        ))
        .map_err(plot_err(path))?;

    root.present().map_err(plot_err(path))?;
    Ok(())
}

/// Render a trailing-window level chart (7d/1m/1y).
pub fn render_level_chart(path: &Path, series: &[LevelPoint], title: &str) -> Result<(), AppError> {
    let Some(first) = series.first() else {
        return Err(AppError::data(format!(
            "Cannot render '{title}' from an empty level series."
        )));
    };

    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|p| ((p.date - first.date).num_days() as f64, p.level))
        .collect();

    let x_max = points.last().map(|&(x, _)| x).unwrap_or(0.0).max(1.0);
    let (mut y_min, mut y_max) = value_bounds(points.iter().map(|&(_, y)| y));
    let pad = ((y_max - y_min) * 0.05).max(0.5);
    y_min -= pad;
    y_max += pad;

    let start = first.date;
    let fmt_x = move |v: &f64| {
        (start + chrono::Duration::days(*v as i64))
            .format("%Y-%m-%d")
            .to_string()
    };

    let root = BitMapBackend::new(path, WINDOW_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err(path))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .caption(title, ("sans-serif", 24).into_font())
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..x_max, y_min..y_max)
        .map_err(plot_err(path))?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&fmt_x)
        .y_label_formatter(&|v| format!("{v:.0}"))
        .label_style(("sans-serif", 14))
        .bold_line_style(BLACK.mix(0.15))
        .light_line_style(BLACK.mix(0.05))
        .draw()
        .map_err(plot_err(path))?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            RGBColor(0x29, 0x62, 0xff).stroke_width(2),
        ))
        .map_err(plot_err(path))?;

    root.present().map_err(plot_err(path))?;
    Ok(())
}

/// Trailing moving average over `window` points (min 1 point at the start),
/// matching the smoothing of the published intraday chart.
fn moving_average(series: &[IntradayPoint], window: usize) -> Vec<IntradayPoint> {
    let window = window.max(1);
    series
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let lo = i.saturating_sub(window - 1);
            let slice = &series[lo..=i];
            let mean = slice.iter().map(|q| q.pct_vs_open).sum::<f64>() / slice.len() as f64;
            IntradayPoint {
                timestamp: p.timestamp,
                pct_vs_open: mean,
            }
        })
        .collect()
}

fn value_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    if (max - min).abs() < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(minute: u32, pct: f64) -> IntradayPoint {
        IntradayPoint {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 14, minute, 0).unwrap(),
            pct_vs_open: pct,
        }
    }

    #[test]
    fn moving_average_warms_up_from_one_point() {
        let series = vec![point(30, 3.0), point(31, 0.0), point(32, 0.0), point(33, 0.0)];
        let smoothed = moving_average(&series, 3);
        assert_eq!(smoothed[0].pct_vs_open, 3.0);
        assert_eq!(smoothed[1].pct_vs_open, 1.5);
        assert_eq!(smoothed[2].pct_vs_open, 1.0);
        assert_eq!(smoothed[3].pct_vs_open, 0.0);
    }

    #[test]
    fn value_bounds_pads_degenerate_ranges() {
        let (lo, hi) = value_bounds([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);
    }

    #[test]
    fn empty_series_do_not_render() {
        let path = std::env::temp_dir().join("qbit5_chart_empty.png");
        assert!(render_intraday_chart(&path, &[], "now").is_err());
        assert!(render_level_chart(&path, &[], "QBIT-5 (7D)").is_err());
    }
}
