use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::dsp::correlate::lag_axis_seconds;
use crate::dsp::envelope::envelope;
use crate::dsp::spectrum::spectrogram;
use crate::error::PlotError;
use crate::measurement::ChannelTrace;
use crate::render::figure::{cell_area, Figure};
use crate::render::layout::{grid_cells, subplot_margins, PlotKind};
use crate::render::spectrogram::{draw_spectrogram, ColorbarSide, SpectrogramView, VLine};
use crate::render::style::{
    fontsizes, scaled, DIRECT_WAVE, FIRST_REFLECTIONS, SECOND_REFLECTIONS, SERIES_CYCLE,
};

/// Frequency ceiling of the arrival-time spectrogram, Hz.
const ARRIVAL_FREQ_MAX_HZ: f32 = 40_000.0;
/// Visible lag window of the envelope plot, milliseconds.
const ENVELOPE_WINDOW_MS: (f32, f32) = (0.0, 5.0);

/// Ordered arrival times: index 0 is the direct wave, 1..5 the first-order
/// reflections, 5.. the second-order ones.
fn group_of(index: usize) -> (RGBColor, &'static str) {
    match index {
        0 => (DIRECT_WAVE, "Direct wave"),
        1..=4 => (FIRST_REFLECTIONS, "1st reflections"),
        _ => (SECOND_REFLECTIONS, "2nd reflections"),
    }
}

/// Spectrogram of a measured trace with the expected echo arrivals marked.
pub fn spectrogram_with_lines(
    fig: &mut Figure,
    trace: &ChannelTrace,
    sample_rate_hz: f32,
    arrival_times_s: &[f32],
    nfft: usize,
    dynamic_range_db: f32,
    window_s: (f32, f32),
) -> Result<(), PlotError> {
    if trace.samples.is_empty() {
        return Err(PlotError::EmptySignal(trace.label.clone()));
    }
    if sample_rate_hz <= 0.0 {
        return Err(PlotError::InvalidSampleRate);
    }
    let margins = subplot_margins(&[PlotKind::Spectrogram], 1, 1)?;
    let rect = grid_cells(fig.width(), fig.height(), 1, 1, margins)[0][0];
    let dpi = fig.dpi();

    let spec = spectrogram(&trace.samples, sample_rate_hz, nfft);
    let duration = trace.duration_seconds(sample_rate_hz);
    let lines: Vec<VLine> = arrival_times_s
        .iter()
        .enumerate()
        .map(|(i, &t)| VLine {
            x: t,
            color: group_of(i).0,
        })
        .collect();

    fig.draw(|root| {
        let cell = cell_area(root, rect);
        let view = SpectrogramView {
            spec: &spec,
            extent_s: (0.0, duration),
            window_s: Some(window_s),
            freq_max_hz: ARRIVAL_FREQ_MAX_HZ,
            dynamic_range_db,
            x_label: Some("Time [s]"),
            y_label: Some("Frequency [Hz]"),
        };
        draw_spectrogram(&cell, &view, ColorbarSide::Right, &lines, dpi)
    })
}

/// Compressed trace plus its envelope, with the expected arrivals marked
/// and a deduplicated legend.
pub fn envelope_with_lines(
    fig: &mut Figure,
    compressed: &ChannelTrace,
    sample_rate_hz: f32,
    arrival_times_s: &[f32],
) -> Result<(), PlotError> {
    if compressed.samples.is_empty() {
        return Err(PlotError::EmptySignal(compressed.label.clone()));
    }
    if sample_rate_hz <= 0.0 {
        return Err(PlotError::InvalidSampleRate);
    }
    let margins = subplot_margins(&[PlotKind::Time], 1, 1)?;
    let rect = grid_cells(fig.width(), fig.height(), 1, 1, margins)[0][0];
    let dpi = fig.dpi();

    let env = envelope(&compressed.samples);
    let time_ms: Vec<f32> = lag_axis_seconds(compressed.samples.len(), sample_rate_hz)
        .into_iter()
        .map(|t| t * 1_000.0)
        .collect();

    let (mut y_lo, mut y_hi) = (f32::INFINITY, f32::NEG_INFINITY);
    for v in compressed.samples.iter().chain(&env) {
        y_lo = y_lo.min(*v);
        y_hi = y_hi.max(*v);
    }
    let pad = ((y_hi - y_lo).abs() * 0.05).max(1e-6);
    let (y_lo, y_hi) = (y_lo - pad, y_hi + pad);

    fig.draw(|root| {
        let fonts = fontsizes();
        let cell = cell_area(root, rect);
        let mut chart = ChartBuilder::on(&cell)
            .margin(2)
            .x_label_area_size(scaled(30, dpi))
            .y_label_area_size(scaled(55, dpi))
            .build_cartesian_2d(ENVELOPE_WINDOW_MS.0..ENVELOPE_WINDOW_MS.1, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .bold_line_style(&BLACK.mix(0.15))
            .light_line_style(&TRANSPARENT)
            .x_labels(6)
            .y_labels(4)
            .x_desc("Time [ms]")
            .y_desc("Amplitude [V]")
            .y_label_formatter(&|v| format!("{v:.1e}"))
            .label_style(("sans-serif", scaled(fonts.small, dpi)))
            .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)))
            .draw()?;

        let in_window =
            |&(t, _): &(f32, f32)| t >= ENVELOPE_WINDOW_MS.0 && t <= ENVELOPE_WINDOW_MS.1;
        chart.draw_series(LineSeries::new(
            time_ms
                .iter()
                .zip(&compressed.samples)
                .map(|(&t, &v)| (t, v))
                .filter(in_window),
            &SERIES_CYCLE[0],
        ))?;
        chart.draw_series(LineSeries::new(
            time_ms
                .iter()
                .zip(&env)
                .map(|(&t, &v)| (t, v))
                .filter(in_window),
            &SERIES_CYCLE[1],
        ))?;

        // one legend entry per arrival group, no matter how many lines
        let mut labelled = [false; 3];
        for (i, &arrival_s) in arrival_times_s.iter().enumerate() {
            let x = arrival_s * 1_000.0;
            if !(ENVELOPE_WINDOW_MS.0..=ENVELOPE_WINDOW_MS.1).contains(&x) {
                continue;
            }
            let (color, label) = group_of(i);
            let group = match i {
                0 => 0,
                1..=4 => 1,
                _ => 2,
            };
            let series = chart.draw_series(DashedLineSeries::new(
                [(x, y_lo), (x, y_hi)],
                6,
                4,
                color.stroke_width(2),
            ))?;
            if !labelled[group] {
                labelled[group] = true;
                series.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.4))
            .label_font(("sans-serif", scaled(fonts.small, dpi)))
            .draw()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::correlate::compress_chirp;

    fn chirp(len: usize, fs: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f32 / fs;
                (2.0 * std::f32::consts::PI * (5_000.0 + 2.0e6 * t) * t).sin()
            })
            .collect()
    }

    #[test]
    fn spectrogram_with_arrivals_renders() {
        let fs = 150_000.0;
        let mut samples = vec![0.0f32; 30_000];
        let probe = chirp(450, fs);
        samples[7_500..7_950].copy_from_slice(&probe);
        let trace = ChannelTrace::new("Sensor 1", samples);

        let arrivals = [0.0505, 0.0512, 0.0514, 0.0516, 0.0519, 0.0523, 0.0526];
        let mut fig = Figure::for_grid(1, 1, 100).unwrap();
        spectrogram_with_lines(
            &mut fig,
            &trace,
            fs,
            &arrivals,
            1024,
            40.0,
            (0.05, 0.055),
        )
        .unwrap();
        assert!(!fig.into_png().unwrap().is_empty());
    }

    #[test]
    fn envelope_with_arrivals_renders() {
        let fs = 150_000.0;
        let probe = chirp(450, fs);
        let mut measurement = vec![0.0f32; 8_192];
        measurement[600..1_050]
            .iter_mut()
            .zip(&probe)
            .for_each(|(slot, &v)| *slot += v);
        let compressed = ChannelTrace::new(
            "Sensor 1",
            compress_chirp(&measurement, &probe),
        );

        let arrivals = [0.0040, 0.0043, 0.0045, 0.0047, 0.0049, 0.0060];
        let mut fig = Figure::for_grid(1, 1, 100).unwrap();
        envelope_with_lines(&mut fig, &compressed, fs, &arrivals).unwrap();
    }

    #[test]
    fn empty_trace_is_rejected() {
        let trace = ChannelTrace::new("Sensor 1", vec![]);
        let mut fig = Figure::for_grid(1, 1, 100).unwrap();
        assert!(matches!(
            spectrogram_with_lines(&mut fig, &trace, 150_000.0, &[], 1024, 40.0, (0.0, 1.0)),
            Err(PlotError::EmptySignal(_))
        ));
    }
}
