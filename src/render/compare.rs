use plotters::coord::Shift;
use plotters::prelude::*;

use crate::dsp::correlate::lag_axis_seconds;
use crate::dsp::level::{peak_db, to_db_slice};
use crate::dsp::spectrum::{magnitude_spectrum_db, spectrogram};
use crate::error::PlotError;
use crate::measurement::ChannelTrace;
use crate::render::figure::{cell_area, Figure};
use crate::render::layout::{column_of, grid_cells, validate_kind_order, Margins, PlotKind};
use crate::render::spectrogram::{draw_spectrogram, ColorbarSide, SpectrogramView};
use crate::render::style::{fontsizes, scaled, SERIES_CYCLE};

/// Fixed y-range of the FFT column, dB.
const FFT_DB_RANGE: (f32, f32) = (-25.0, 80.0);
/// Visible time window for compressed-chirp spectrograms, seconds.
const COMPRESSED_WINDOW_S: (f32, f32) = (-0.005, 0.095);
/// Display window below the peak when the time trace is drawn in dB.
const LOG_TIME_RANGE_DB: f32 = 60.0;

/// Options for the comparison grid.
#[derive(Clone, Debug)]
pub struct CompareOptions {
    /// Ordered subset of time, spectrogram, fft.
    pub kinds: Vec<PlotKind>,
    pub nfft: usize,
    /// Share the time-trace y-range across all channels.
    pub share_y: bool,
    pub freq_max_hz: f32,
    pub dynamic_range_db: f32,
    /// Draw the time trace in dB instead of linear amplitude.
    pub log_time_signal: bool,
    /// Traces are matched-filter compressions, centred on zero lag.
    pub compressed_chirps: bool,
    /// Pin every channel onto this grid row (stacking passes).
    pub set_row: Option<usize>,
    /// Total grid rows when larger than the number of traces.
    pub grid_rows: Option<usize>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            kinds: vec![PlotKind::Time, PlotKind::Spectrogram, PlotKind::Fft],
            nfft: 256,
            share_y: false,
            freq_max_hz: 45_000.0,
            dynamic_range_db: 60.0,
            log_time_signal: false,
            compressed_chirps: false,
            set_row: None,
            grid_rows: None,
        }
    }
}

/// Render every channel as a row of the requested representations.
pub fn compare_signals(
    fig: &mut Figure,
    margins: Margins,
    traces: &[ChannelTrace],
    sample_rate_hz: f32,
    opts: &CompareOptions,
) -> Result<(), PlotError> {
    validate_kind_order(&opts.kinds)?;
    if sample_rate_hz <= 0.0 {
        return Err(PlotError::InvalidSampleRate);
    }
    if traces.is_empty() {
        return Err(PlotError::EmptySignal("comparison grid".into()));
    }
    for trace in traces {
        if trace.samples.is_empty() {
            return Err(PlotError::EmptySignal(trace.label.clone()));
        }
    }

    let mut rows = opts.grid_rows.unwrap_or(traces.len());
    rows = match opts.set_row {
        Some(row) => rows.max(row + 1),
        None => rows.max(traces.len()),
    };
    let cols = opts.kinds.len();
    let dpi = fig.dpi();
    let cells = grid_cells(fig.width(), fig.height(), rows, cols, margins);

    let shared_bounds = opts.share_y.then(|| {
        let mut bounds = (f32::INFINITY, f32::NEG_INFINITY);
        for trace in traces {
            let (lo, hi) = series_bounds(&trace.samples);
            bounds = (bounds.0.min(lo), bounds.1.max(hi));
        }
        bounds
    });

    fig.draw(|root| {
        for (i, trace) in traces.iter().enumerate() {
            let row = opts.set_row.unwrap_or(i);
            let bottom_row = row + 1 == rows;
            for &kind in &opts.kinds {
                let col = column_of(&opts.kinds, kind);
                let cell = cell_area(root, cells[row][col]);
                match kind {
                    PlotKind::Time => draw_time_cell(
                        &cell,
                        trace,
                        sample_rate_hz,
                        opts,
                        shared_bounds,
                        bottom_row,
                        dpi,
                    )?,
                    PlotKind::Spectrogram => {
                        let spec = spectrogram(&trace.samples, sample_rate_hz, opts.nfft);
                        let duration = trace.duration_seconds(sample_rate_hz);
                        let (extent, window) = if opts.compressed_chirps {
                            ((-duration / 2.0, duration / 2.0), Some(COMPRESSED_WINDOW_S))
                        } else {
                            ((0.0, duration), None)
                        };
                        let view = SpectrogramView {
                            spec: &spec,
                            extent_s: extent,
                            window_s: window,
                            freq_max_hz: opts.freq_max_hz,
                            dynamic_range_db: opts.dynamic_range_db,
                            x_label: bottom_row.then_some("Time [s]"),
                            y_label: Some("Frequency [Hz]"),
                        };
                        let side = if opts.set_row.is_some() {
                            ColorbarSide::Bottom
                        } else {
                            ColorbarSide::Right
                        };
                        draw_spectrogram(&cell, &view, side, &[], dpi)?;
                    }
                    PlotKind::Fft => draw_fft_cell(
                        &cell,
                        trace,
                        sample_rate_hz,
                        opts.freq_max_hz,
                        bottom_row,
                        dpi,
                    )?,
                }
            }
        }
        Ok(())
    })
}

fn draw_time_cell<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    trace: &ChannelTrace,
    sample_rate_hz: f32,
    opts: &CompareOptions,
    shared_bounds: Option<(f32, f32)>,
    bottom_row: bool,
    dpi: u32,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    let fonts = fontsizes();
    let n = trace.samples.len();
    let duration = trace.duration_seconds(sample_rate_hz);

    let time_axis: Vec<f32> = if opts.compressed_chirps {
        lag_axis_seconds(n, sample_rate_hz)
    } else {
        (0..n).map(|i| i as f32 / sample_rate_hz).collect()
    };
    let x_range = if opts.compressed_chirps {
        -duration / 2.0..duration / 2.0
    } else {
        0.0..duration
    };

    let values: Vec<f32>;
    let (y_lo, y_hi) = if opts.log_time_signal {
        values = to_db_slice(&trace.samples);
        let peak = peak_db(&trace.samples);
        (peak - LOG_TIME_RANGE_DB, peak + 5.0)
    } else {
        values = trace.samples.clone();
        let bounds = shared_bounds.unwrap_or_else(|| series_bounds(&values));
        padded_range(bounds.0, bounds.1)
    };

    let y_label = if opts.compressed_chirps {
        "Correlation coefficient [-]"
    } else {
        "Amplitude [V]"
    };

    let mut chart = ChartBuilder::on(area)
        .margin(2)
        .x_label_area_size(scaled(if bottom_row { 30 } else { 18 }, dpi))
        .y_label_area_size(scaled(50, dpi))
        .build_cartesian_2d(x_range, y_lo..y_hi)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(&BLACK.mix(0.15))
            .light_line_style(&TRANSPARENT)
            .x_labels(5)
            .y_labels(4)
            .y_desc(y_label)
            .label_style(("sans-serif", scaled(fonts.small, dpi)))
            .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)));
        if bottom_row {
            mesh.x_desc("Time [s]");
        }
        mesh.draw()?;
    }

    // clamp into the y-range so nothing bleeds into neighbouring cells
    let series = time_axis
        .iter()
        .zip(&values)
        .map(|(&t, &v)| (t, v.clamp(y_lo, y_hi)));
    chart.draw_series(LineSeries::new(series, &SERIES_CYCLE[0]))?;
    Ok(())
}

fn draw_fft_cell<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    trace: &ChannelTrace,
    sample_rate_hz: f32,
    freq_max_hz: f32,
    bottom_row: bool,
    dpi: u32,
) -> Result<(), PlotError>
where
    DB::ErrorType: 'static,
{
    let fonts = fontsizes();
    let spectrum = magnitude_spectrum_db(&trace.samples, sample_rate_hz);
    let freq_max_khz = freq_max_hz / 1_000.0;

    let mut chart = ChartBuilder::on(area)
        .margin(2)
        .x_label_area_size(scaled(if bottom_row { 30 } else { 18 }, dpi))
        .y_label_area_size(scaled(50, dpi))
        .build_cartesian_2d(0.0..freq_max_khz, FFT_DB_RANGE.0..FFT_DB_RANGE.1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.bold_line_style(&BLACK.mix(0.15))
            .light_line_style(&TRANSPARENT)
            .x_labels(5)
            .y_labels(4)
            .y_desc("Amplitude [dB]")
            .label_style(("sans-serif", scaled(fonts.small, dpi)))
            .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)));
        if bottom_row {
            mesh.x_desc("Frequency [kHz]");
        }
        mesh.draw()?;
    }

    let series = spectrum
        .frequencies_hz
        .iter()
        .zip(&spectrum.magnitudes_db)
        .map(|(&f, &db)| (f / 1_000.0, db.clamp(FFT_DB_RANGE.0, FFT_DB_RANGE.1)))
        .filter(|&(f, _)| f <= freq_max_khz);
    chart.draw_series(LineSeries::new(series, &SERIES_CYCLE[0]))?;
    Ok(())
}

fn series_bounds(values: &[f32]) -> (f32, f32) {
    values.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |acc, &v| {
        (acc.0.min(v), acc.1.max(v))
    })
}

fn padded_range(min: f32, max: f32) -> (f32, f32) {
    let span = (max - min).abs();
    let pad = if span < 1e-6 { 0.5 } else { span * 0.05 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::subplot_margins;

    fn burst(len: usize) -> ChannelTrace {
        let samples = (0..len)
            .map(|i| {
                let t = i as f32 / len as f32;
                (2.0 * std::f32::consts::PI * 24.0 * t).sin() * (-8.0 * (t - 0.3).powi(2)).exp()
            })
            .collect();
        ChannelTrace::new("Sensor 1", samples)
    }

    #[test]
    fn full_grid_renders() {
        let traces = vec![burst(2048), burst(2048), burst(2048)];
        let opts = CompareOptions::default();
        let margins = subplot_margins(&opts.kinds, 1, 1).unwrap();
        let mut fig = Figure::for_grid(3, 3, 100).unwrap();
        compare_signals(&mut fig, margins, &traces, 150_000.0, &opts).unwrap();
        assert!(!fig.into_png().unwrap().is_empty());
    }

    #[test]
    fn log_time_and_shared_y_render() {
        let traces = vec![burst(1024), burst(1024)];
        let opts = CompareOptions {
            kinds: vec![PlotKind::Time],
            log_time_signal: true,
            share_y: true,
            ..CompareOptions::default()
        };
        let margins = subplot_margins(&opts.kinds, 2, 1).unwrap();
        let mut fig = Figure::for_grid(2, 1, 100).unwrap();
        compare_signals(&mut fig, margins, &traces, 150_000.0, &opts).unwrap();
    }

    #[test]
    fn stacked_passes_share_one_figure() {
        let trace = vec![burst(2048)];
        let margins =
            subplot_margins(&[PlotKind::Time, PlotKind::Spectrogram], 2, 1).unwrap();
        let mut fig = Figure::for_grid(2, 1, 100).unwrap();

        let time_pass = CompareOptions {
            kinds: vec![PlotKind::Time],
            compressed_chirps: true,
            set_row: Some(0),
            grid_rows: Some(2),
            ..CompareOptions::default()
        };
        compare_signals(&mut fig, margins, &trace, 150_000.0, &time_pass).unwrap();

        let spec_pass = CompareOptions {
            kinds: vec![PlotKind::Spectrogram],
            compressed_chirps: true,
            set_row: Some(1),
            grid_rows: Some(2),
            ..CompareOptions::default()
        };
        compare_signals(&mut fig, margins, &trace, 150_000.0, &spec_pass).unwrap();
    }

    #[test]
    fn rejects_misordered_kinds() {
        let traces = vec![burst(256)];
        let opts = CompareOptions {
            kinds: vec![PlotKind::Fft, PlotKind::Time],
            ..CompareOptions::default()
        };
        let margins = subplot_margins(&[PlotKind::Time], 1, 1).unwrap();
        let mut fig = Figure::for_grid(1, 2, 100).unwrap();
        assert!(matches!(
            compare_signals(&mut fig, margins, &traces, 150_000.0, &opts),
            Err(PlotError::KindOrder)
        ));
    }

    #[test]
    fn rejects_empty_trace() {
        let traces = vec![ChannelTrace::new("Sensor 1", vec![])];
        let opts = CompareOptions::default();
        let margins = subplot_margins(&opts.kinds, 1, 1).unwrap();
        let mut fig = Figure::for_grid(1, 3, 100).unwrap();
        assert!(matches!(
            compare_signals(&mut fig, margins, &traces, 150_000.0, &opts),
            Err(PlotError::EmptySignal(_))
        ));
    }
}
