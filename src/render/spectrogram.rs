use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::dsp::level::to_db;
use crate::dsp::spectrum::Spectrogram;
use crate::error::PlotError;
use crate::render::colormap::power_color;
use crate::render::style::{fontsizes, scaled};

/// Where the colorbar strip sits relative to the spectrogram cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorbarSide {
    Right,
    Bottom,
}

/// Dashed vertical marker drawn over the heatmap.
#[derive(Clone, Copy, Debug)]
pub struct VLine {
    pub x: f32,
    pub color: RGBColor,
}

/// One spectrogram cell ready to draw.
pub struct SpectrogramView<'a> {
    pub spec: &'a Spectrogram,
    /// Time extent of the underlying trace (shifted for compressed chirps).
    pub extent_s: (f32, f32),
    /// Visible time range; the full extent when `None`.
    pub window_s: Option<(f32, f32)>,
    pub freq_max_hz: f32,
    pub dynamic_range_db: f32,
    pub x_label: Option<&'a str>,
    pub y_label: Option<&'a str>,
}

/// Draw the power matrix as filled cells with a dB colorbar strip.
///
/// The color scale spans `dynamic_range_db` below the matrix peak.
pub fn draw_spectrogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    view: &SpectrogramView,
    colorbar: ColorbarSide,
    lines: &[VLine],
    dpi: u32,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    let fonts = fontsizes();

    if view.spec.is_empty() {
        let (w, h) = area.dim_in_pixel();
        area.draw(&Text::new(
            "spectrogram data unavailable",
            (w as i32 / 2 - 80, h as i32 / 2),
            ("sans-serif", scaled(fonts.small, dpi))
                .into_font()
                .color(&RED),
        ))?;
        return Ok(());
    }

    let peak_db = to_db(view.spec.peak_power());
    let floor_db = peak_db - view.dynamic_range_db;

    let (w, h) = area.dim_in_pixel();
    let (plot_area, bar_area) = match colorbar {
        ColorbarSide::Right => {
            let bar = ((w as f32 * 0.16) as u32).max(30);
            area.split_horizontally(w.saturating_sub(bar) as i32)
        }
        ColorbarSide::Bottom => {
            let bar = ((h as f32 * 0.24) as u32).max(26);
            area.split_vertically(h.saturating_sub(bar) as i32)
        }
    };

    let (t0, t1) = view.window_s.unwrap_or(view.extent_s);
    let mut chart = ChartBuilder::on(&plot_area)
        .margin(2)
        .x_label_area_size(scaled(if view.x_label.is_some() { 30 } else { 18 }, dpi))
        .y_label_area_size(scaled(if view.y_label.is_some() { 50 } else { 36 }, dpi))
        .build_cartesian_2d(t0..t1, 0f32..view.freq_max_hz)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_labels(5)
            .y_labels(5)
            .label_style(("sans-serif", scaled(fonts.small, dpi)))
            .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)));
        if let Some(label) = view.x_label {
            mesh.x_desc(label);
        }
        if let Some(label) = view.y_label {
            mesh.y_desc(label);
        }
        mesh.draw()?;
    }

    let times = &view.spec.times_s;
    let hop_s = if times.len() >= 2 {
        times[1] - times[0]
    } else {
        view.extent_s.1 - view.extent_s.0
    };
    let bin_hz = view.spec.frequencies_hz.get(1).copied().unwrap_or(view.freq_max_hz);

    for (frame, &centre) in times.iter().enumerate() {
        let t_centre = view.extent_s.0 + centre;
        let x0 = t_centre - hop_s / 2.0;
        let x1 = t_centre + hop_s / 2.0;
        if x1 < t0 || x0 > t1 {
            continue;
        }
        for (bin, &freq) in view.spec.frequencies_hz.iter().enumerate() {
            let y0 = (freq - bin_hz / 2.0).max(0.0);
            if y0 > view.freq_max_hz {
                break;
            }
            let y1 = (freq + bin_hz / 2.0).min(view.freq_max_hz);
            let power = view.spec.power[[bin, frame]];
            let normalized = (to_db(power) - floor_db) / view.dynamic_range_db;
            chart.plotting_area().draw(&Rectangle::new(
                [(x0.max(t0), y0), (x1.min(t1), y1)],
                power_color(normalized).filled(),
            ))?;
        }
    }

    for line in lines {
        if line.x < t0 || line.x > t1 {
            continue;
        }
        chart.draw_series(DashedLineSeries::new(
            [(line.x, 0.0), (line.x, view.freq_max_hz)],
            6,
            4,
            line.color.stroke_width(2),
        ))?;
    }

    draw_colorbar(&bar_area, floor_db, peak_db, colorbar, dpi)?;
    Ok(())
}

/// dB scale strip next to a spectrogram.
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    floor_db: f32,
    peak_db: f32,
    side: ColorbarSide,
    dpi: u32,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    let fonts = fontsizes();
    let label_font = ("sans-serif", scaled(fonts.small, dpi));
    const STEPS: usize = 64;

    match side {
        ColorbarSide::Right => {
            let mut chart = ChartBuilder::on(area)
                .margin(scaled(6, dpi))
                .set_label_area_size(LabelAreaPosition::Right, scaled(38, dpi))
                .build_cartesian_2d(0f32..1f32, floor_db..peak_db)?;
            chart
                .configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_labels(4)
                .y_label_formatter(&|v| format!("{v:.0} dB"))
                .label_style(label_font)
                .draw()?;
            for i in 0..STEPS {
                let f0 = i as f32 / STEPS as f32;
                let f1 = (i + 1) as f32 / STEPS as f32;
                chart.plotting_area().draw(&Rectangle::new(
                    [
                        (0.0, floor_db + f0 * (peak_db - floor_db)),
                        (1.0, floor_db + f1 * (peak_db - floor_db)),
                    ],
                    power_color(f0).filled(),
                ))?;
            }
        }
        ColorbarSide::Bottom => {
            let mut chart = ChartBuilder::on(area)
                .margin(scaled(4, dpi))
                .set_label_area_size(LabelAreaPosition::Bottom, scaled(18, dpi))
                .build_cartesian_2d(floor_db..peak_db, 0f32..1f32)?;
            chart
                .configure_mesh()
                .disable_mesh()
                .disable_y_axis()
                .x_labels(5)
                .x_label_formatter(&|v| format!("{v:.0} dB"))
                .label_style(label_font)
                .draw()?;
            for i in 0..STEPS {
                let f0 = i as f32 / STEPS as f32;
                let f1 = (i + 1) as f32 / STEPS as f32;
                chart.plotting_area().draw(&Rectangle::new(
                    [
                        (floor_db + f0 * (peak_db - floor_db), 0.0),
                        (floor_db + f1 * (peak_db - floor_db), 1.0),
                    ],
                    power_color(f0).filled(),
                ))?;
            }
        }
    }
    Ok(())
}
