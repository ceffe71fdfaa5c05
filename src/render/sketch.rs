use plotters::prelude::*;

use crate::error::PlotError;
use crate::measurement::SetupGeometry;
use crate::render::figure::{cell_area, Figure};
use crate::render::layout::{grid_cells, setup_margins};
use crate::render::style::{fontsizes, scaled, SERIES_CYCLE};

/// Plate outline with the actuator and sensor positions of a setup.
pub fn setup_sketch(fig: &mut Figure, geometry: &SetupGeometry) -> Result<(), PlotError> {
    let rect = grid_cells(fig.width(), fig.height(), 1, 1, setup_margins())[0][0];
    let dpi = fig.dpi();
    let (plate_w, plate_h) = geometry.plate_size_m;
    let pad = 0.05 * plate_w.max(plate_h);

    fig.draw(|root| {
        let fonts = fontsizes();
        let cell = cell_area(root, rect);
        let mut chart = ChartBuilder::on(&cell)
            .margin(2)
            .x_label_area_size(scaled(30, dpi))
            .y_label_area_size(scaled(40, dpi))
            .build_cartesian_2d(-pad..plate_w + pad, -pad..plate_h + pad)?;

        chart
            .configure_mesh()
            .bold_line_style(&BLACK.mix(0.1))
            .light_line_style(&TRANSPARENT)
            .x_labels(5)
            .y_labels(4)
            .x_desc("x [m]")
            .y_desc("y [m]")
            .label_style(("sans-serif", scaled(fonts.small, dpi)))
            .axis_desc_style(("sans-serif", scaled(fonts.medium, dpi)))
            .draw()?;

        chart.draw_series(std::iter::once(Rectangle::new(
            [(0.0, 0.0), (plate_w, plate_h)],
            BLACK.stroke_width(2),
        )))?;

        let sensor_color = SERIES_CYCLE[0];
        chart
            .draw_series(
                geometry
                    .sensors
                    .iter()
                    .map(|s| Circle::new(s.position_m, scaled(5, dpi) as i32, sensor_color.filled())),
            )?
            .label("Sensors")
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, sensor_color.filled()));

        let actuator_color = SERIES_CYCLE[3];
        chart
            .draw_series(std::iter::once(TriangleMarker::new(
                geometry.actuator.position_m,
                scaled(6, dpi) as i32,
                actuator_color.filled(),
            )))?
            .label("Actuator")
            .legend(move |(x, y)| TriangleMarker::new((x + 10, y), 5, actuator_color.filled()));

        let label_offset = 0.03 * plate_h;
        chart.draw_series(geometry.sensors.iter().map(|s| {
            Text::new(
                s.name.clone(),
                (s.position_m.0, s.position_m.1 + label_offset),
                ("sans-serif", scaled(fonts.small, dpi)).into_font(),
            )
        }))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.4))
            .label_font(("sans-serif", scaled(fonts.small, dpi)))
            .draw()?;
        Ok(())
    })
}
