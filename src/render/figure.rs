use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::PlotError;
use crate::render::layout::{window_size, CellRect};

/// Off-screen RGB canvas a figure is drawn into, PNG-encoded once done.
///
/// The canvas survives across `draw` calls, so several render passes can
/// share one figure (a time trace stacked over its spectrogram, for
/// instance).
pub struct Figure {
    width: u32,
    height: u32,
    dpi: u32,
    buffer: Vec<u8>, // width * height * RGB
}

impl Figure {
    /// Figure sized from the window-size table, scaled to `dpi`.
    pub fn for_grid(rows: usize, cols: usize, dpi: u32) -> Result<Self, PlotError> {
        let (w_in, h_in) = window_size(rows, cols)?;
        Ok(Self::with_size_px(
            (w_in * dpi as f32).round() as u32,
            (h_in * dpi as f32).round() as u32,
            dpi,
        ))
    }

    pub fn with_size_px(width: u32, height: u32, dpi: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            dpi,
            // white canvas, same as an untouched figure background
            buffer: vec![255u8; (width * height * 3) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Run one drawing pass against the canvas.
    pub fn draw<F>(&mut self, draw_fn: F) -> Result<(), PlotError>
    where
        F: for<'a> FnOnce(
            &DrawingArea<BitMapBackend<'a>, Shift>,
        ) -> Result<(), PlotError>,
    {
        let (width, height) = (self.width, self.height);
        let root =
            BitMapBackend::with_buffer(&mut self.buffer, (width, height)).into_drawing_area();
        draw_fn(&root)?;
        root.present()?;
        Ok(())
    }

    /// Encode the canvas as PNG bytes.
    pub fn into_png(self) -> Result<Vec<u8>, PlotError> {
        let image = ImageBuffer::<Rgb<u8>, _>::from_raw(self.width, self.height, self.buffer)
            .ok_or_else(|| PlotError::Draw("failed to allocate image buffer".into()))?;
        let mut output = Vec::new();
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
        Ok(output)
    }
}

/// Sub-area of the root covering one grid cell.
pub fn cell_area<'a, 'b>(
    root: &'b DrawingArea<BitMapBackend<'a>, Shift>,
    rect: CellRect,
) -> DrawingArea<BitMapBackend<'a>, Shift> {
    let (width, height) = root.dim_in_pixel();
    root.margin(
        rect.y0 as i32,
        height.saturating_sub(rect.y1) as i32,
        rect.x0 as i32,
        width.saturating_sub(rect.x1) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_figure_uses_size_table() {
        let fig = Figure::for_grid(1, 1, 100).unwrap();
        assert_eq!((fig.width(), fig.height()), (550, 350));
        let fig = Figure::for_grid(3, 3, 200).unwrap();
        assert_eq!((fig.width(), fig.height()), (1800, 600));
    }

    #[test]
    fn unsupported_grid_is_an_error() {
        assert!(Figure::for_grid(5, 1, 100).is_err());
    }

    #[test]
    fn drawing_produces_a_png() {
        let mut fig = Figure::with_size_px(64, 48, 100);
        fig.draw(|root| {
            root.fill(&WHITE)?;
            let area = cell_area(
                root,
                CellRect {
                    x0: 8,
                    y0: 8,
                    x1: 56,
                    y1: 40,
                },
            );
            area.fill(&BLACK)?;
            Ok(())
        })
        .unwrap();
        let png = fig.into_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
