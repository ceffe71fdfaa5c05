use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;

use crate::dsp::stats::{average_of_captures, variance_of_captures};
use crate::error::PlotError;
use crate::measurement::MeasurementSet;
use crate::render::figure::{cell_area, Figure};
use crate::render::layout::{grid_cells, Margins};
use crate::render::style::{fontsizes, scaled, SERIES_CYCLE};

/// At most this many channels are drawn, one row each.
const MAX_CHANNELS: usize = 3;

/// Mean and mean +/- variance of the repeated captures, per channel.
pub fn wave_statistics(
    fig: &mut Figure,
    margins: Margins,
    set: &MeasurementSet,
) -> Result<(), PlotError> {
    let channels: Vec<_> = set.channels.iter().take(MAX_CHANNELS).collect();
    if channels.is_empty() {
        return Err(PlotError::EmptySignal("wave statistics".into()));
    }
    for channel in &channels {
        channel.validate()?;
    }

    let rows = channels.len();
    let dpi = fig.dpi();
    let sample_rate_hz = set.sample_rate_hz;
    let cells = grid_cells(fig.width(), fig.height(), rows, 1, margins);

    fig.draw(|root| {
        let fonts = fontsizes();
        for (row, channel) in channels.iter().enumerate() {
            let mean = average_of_captures(&channel.captures);
            let variance = variance_of_captures(&channel.captures);
            let upper: Vec<f32> = mean.iter().zip(&variance).map(|(m, v)| m + v).collect();
            let lower: Vec<f32> = mean.iter().zip(&variance).map(|(m, v)| m - v).collect();

            let duration = mean.len() as f32 / sample_rate_hz;
            let (mut y_lo, mut y_hi) = (f32::INFINITY, f32::NEG_INFINITY);
            for v in upper.iter().chain(&lower) {
                y_lo = y_lo.min(*v);
                y_hi = y_hi.max(*v);
            }
            let pad = ((y_hi - y_lo).abs() * 0.05).max(1e-6);
            let (y_lo, y_hi) = (y_lo - pad, y_hi + pad);

            let cell = cell_area(root, cells[row][0]);
            let mut chart = ChartBuilder::on(&cell)
                .margin(2)
                .x_label_area_size(scaled(28, dpi))
                .y_label_area_size(scaled(50, dpi))
                .build_cartesian_2d(0.0..duration, y_lo..y_hi)?;

            chart
                .configure_mesh()
                .bold_line_style(&BLACK.mix(0.15))
                .light_line_style(&TRANSPARENT)
                .x_labels(5)
                .y_labels(4)
                .x_desc("Time [s]")
                .label_style(("sans-serif", scaled(fonts.small, dpi)))
                .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)))
                .draw()?;

            let time = |i: usize| i as f32 / sample_rate_hz;
            let average_color = SERIES_CYCLE[0];
            let variance_color = SERIES_CYCLE[1];

            chart
                .draw_series(LineSeries::new(
                    mean.iter().enumerate().map(|(i, &v)| (time(i), v)),
                    &average_color,
                ))?
                .label("Average")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], average_color.stroke_width(2))
                });
            chart
                .draw_series(DashedLineSeries::new(
                    upper.iter().enumerate().map(|(i, &v)| (time(i), v)),
                    5,
                    4,
                    variance_color.stroke_width(1),
                ))?
                .label("Average + variance")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], variance_color.stroke_width(2))
                });
            chart
                .draw_series(DashedLineSeries::new(
                    lower.iter().enumerate().map(|(i, &v)| (time(i), v)),
                    5,
                    4,
                    variance_color.stroke_width(1),
                ))?
                .label("Average - variance")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], variance_color.stroke_width(2))
                });

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK.mix(0.4))
                .label_font(("sans-serif", scaled(fonts.small, dpi)))
                .draw()?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::ChannelEnsemble;
    use crate::render::layout::{subplot_margins, PlotKind};

    fn noisy_channel(label: &str, len: usize, offset: f32) -> ChannelEnsemble {
        let captures = (0..4)
            .map(|c| {
                (0..len)
                    .map(|i| {
                        let t = i as f32 / len as f32;
                        (2.0 * std::f32::consts::PI * 12.0 * t).sin()
                            + offset
                            + 0.01 * c as f32
                    })
                    .collect()
            })
            .collect();
        ChannelEnsemble {
            label: label.into(),
            captures,
        }
    }

    #[test]
    fn renders_three_channel_statistics() {
        let set = MeasurementSet::new(
            150_000.0,
            vec![
                noisy_channel("Sensor 1", 512, 0.0),
                noisy_channel("Sensor 2", 512, 0.1),
                noisy_channel("Sensor 3", 512, -0.1),
            ],
        )
        .unwrap();
        let margins = subplot_margins(&[PlotKind::Time], 3, 1).unwrap();
        let mut fig = Figure::for_grid(3, 1, 100).unwrap();
        wave_statistics(&mut fig, margins, &set).unwrap();
        assert!(!fig.into_png().unwrap().is_empty());
    }

    #[test]
    fn extra_channels_are_ignored() {
        let set = MeasurementSet::new(
            150_000.0,
            (0..5)
                .map(|i| noisy_channel(&format!("Sensor {}", i + 1), 128, 0.0))
                .collect(),
        )
        .unwrap();
        let margins = subplot_margins(&[PlotKind::Time], 3, 1).unwrap();
        let mut fig = Figure::for_grid(3, 1, 100).unwrap();
        wave_statistics(&mut fig, margins, &set).unwrap();
    }

    #[test]
    fn empty_set_is_an_error() {
        let set = MeasurementSet::new(150_000.0, vec![]).unwrap();
        let margins = subplot_margins(&[PlotKind::Time], 3, 1).unwrap();
        let mut fig = Figure::for_grid(3, 1, 100).unwrap();
        assert!(wave_statistics(&mut fig, margins, &set).is_err());
    }
}
