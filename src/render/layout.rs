use crate::error::PlotError;

/// The three signal representations a comparison grid can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotKind {
    Time,
    Spectrogram,
    Fft,
}

impl PlotKind {
    pub fn label(self) -> &'static str {
        match self {
            PlotKind::Time => "time",
            PlotKind::Spectrogram => "spectrogram",
            PlotKind::Fft => "fft",
        }
    }

    fn rank(self) -> usize {
        match self {
            PlotKind::Time => 0,
            PlotKind::Spectrogram => 1,
            PlotKind::Fft => 2,
        }
    }
}

/// Kinds must be a non-empty subset of time, spectrogram, fft in that order.
pub fn validate_kind_order(kinds: &[PlotKind]) -> Result<(), PlotError> {
    if kinds.is_empty() {
        return Err(PlotError::KindOrder);
    }
    let ordered = kinds.windows(2).all(|w| w[0].rank() < w[1].rank());
    if ordered {
        Ok(())
    } else {
        Err(PlotError::KindOrder)
    }
}

/// Subplot column a representation lands in, given which kinds are present:
/// time is always first, a spectrogram moves right if a time column exists,
/// and the FFT sits after whichever of the two are present.
pub fn column_of(kinds: &[PlotKind], kind: PlotKind) -> usize {
    let has = |k: PlotKind| kinds.contains(&k);
    match kind {
        PlotKind::Time => 0,
        PlotKind::Spectrogram => usize::from(has(PlotKind::Time)),
        PlotKind::Fft => {
            usize::from(has(PlotKind::Time)) + usize::from(has(PlotKind::Spectrogram))
        }
    }
}

/// Figure size in inches for a subplot grid. Only the combinations the
/// reports use are defined; anything else is an error.
pub fn window_size(rows: usize, cols: usize) -> Result<(f32, f32), PlotError> {
    match (rows, cols) {
        (1, 1) => Ok((5.5, 3.5)),
        (2, 1) => Ok((5.5, 4.0)),
        (3, 1) => Ok((5.5, 4.0)),
        (1, 2) => Ok((9.0, 3.0)),
        (_, 2) => Ok((9.0, 3.0)),
        (_, 3) => Ok((9.0, 3.0)),
        _ => Err(PlotError::UnsupportedWindowSize { rows, cols }),
    }
}

/// Figure margins and inter-subplot spacing, as fractions of the figure.
///
/// `left`/`right`/`bottom`/`top` locate the axes block inside the figure
/// (measured from the left/bottom edge); `wspace`/`hspace` are gaps between
/// columns/rows as a fraction of the average cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub hspace: f32,
    pub wspace: f32,
}

/// Spacing preset for a plot-kind combination and grid shape. The table is
/// deliberately literal; combinations nobody tuned are an error.
pub fn subplot_margins(
    kinds: &[PlotKind],
    rows: usize,
    cols: usize,
) -> Result<Margins, PlotError> {
    validate_kind_order(kinds)?;
    // every single-cell layout shares one margin set
    if rows == 1 && cols == 1 {
        return Ok(Margins {
            left: 0.175,
            right: 0.98,
            top: 0.935,
            bottom: 0.155,
            hspace: 0.28,
            wspace: 0.2,
        });
    }
    let margins = match (kinds, rows, cols) {
        ([PlotKind::Time], 2, 1) => Margins {
            left: 0.153,
            right: 0.98,
            top: 0.957,
            bottom: 0.079,
            hspace: 0.237,
            wspace: 0.2,
        },
        ([PlotKind::Time], 3, 1) => Margins {
            left: 0.125,
            right: 0.965,
            top: 0.955,
            bottom: 0.07,
            hspace: 0.28,
            wspace: 0.2,
        },
        ([PlotKind::Spectrogram], 2, 1) => Margins {
            left: 0.167,
            right: 1.0,
            top: 0.955,
            bottom: 0.08,
            hspace: 0.236,
            wspace: 0.2,
        },
        ([PlotKind::Spectrogram], 3, 1) => Margins {
            left: 0.125,
            right: 1.05,
            top: 0.955,
            bottom: 0.07,
            hspace: 0.28,
            wspace: 0.2,
        },
        ([PlotKind::Fft], 2, 1) => Margins {
            left: 0.125,
            right: 0.957,
            top: 0.955,
            bottom: 0.075,
            hspace: 0.28,
            wspace: 0.2,
        },
        ([PlotKind::Fft], 3, 1) => Margins {
            left: 0.125,
            right: 0.95,
            top: 0.955,
            bottom: 0.07,
            hspace: 0.28,
            wspace: 0.2,
        },
        ([PlotKind::Time, PlotKind::Spectrogram], 2, 1) => Margins {
            left: 0.18,
            right: 0.97,
            top: 0.955,
            bottom: 0.0,
            hspace: 0.19,
            wspace: 0.2,
        },
        _ => {
            let kinds = kinds
                .iter()
                .map(|k| k.label())
                .collect::<Vec<_>>()
                .join("+");
            return Err(PlotError::UnsupportedSpacing { kinds, rows, cols });
        }
    };
    Ok(margins)
}

/// Margins for setup-sketch figures.
pub fn setup_margins() -> Margins {
    Margins {
        left: 0.088,
        right: 1.0,
        top: 0.988,
        bottom: 0.152,
        hspace: 0.28,
        wspace: 0.2,
    }
}

/// Pixel rectangle of one subplot cell; `y` grows downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

/// Split a figure into subplot cells, row-major with row 0 on top.
pub fn grid_cells(
    width_px: u32,
    height_px: u32,
    rows: usize,
    cols: usize,
    margins: Margins,
) -> Vec<Vec<CellRect>> {
    let w = width_px as f32;
    let h = height_px as f32;
    // fractions above 1.0 are legal in the table; clip to the figure
    let left = (margins.left * w).max(0.0);
    let right = (margins.right.min(1.0) * w).max(left + 1.0);
    let top = ((1.0 - margins.top) * h).max(0.0);
    let bottom = ((1.0 - margins.bottom).min(1.0) * h).max(top + 1.0);

    let cell_w = (right - left) / (cols as f32 + margins.wspace * (cols as f32 - 1.0));
    let gap_w = margins.wspace * cell_w;
    let cell_h = (bottom - top) / (rows as f32 + margins.hspace * (rows as f32 - 1.0));
    let gap_h = margins.hspace * cell_h;

    (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    let x0 = left + c as f32 * (cell_w + gap_w);
                    let y0 = top + r as f32 * (cell_h + gap_h);
                    CellRect {
                        x0: x0.round() as u32,
                        y0: y0.round() as u32,
                        x1: (x0 + cell_w).round().min(w) as u32,
                        y1: (y0 + cell_h).round().min(h) as u32,
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_order_is_enforced() {
        use PlotKind::*;
        assert!(validate_kind_order(&[Time, Spectrogram, Fft]).is_ok());
        assert!(validate_kind_order(&[Time, Fft]).is_ok());
        assert!(validate_kind_order(&[Spectrogram]).is_ok());
        assert!(validate_kind_order(&[]).is_err());
        assert!(validate_kind_order(&[Fft, Time]).is_err());
        assert!(validate_kind_order(&[Time, Time]).is_err());
    }

    #[test]
    fn column_arithmetic_matches_layout_rules() {
        use PlotKind::*;
        let all = [Time, Spectrogram, Fft];
        assert_eq!(column_of(&all, Time), 0);
        assert_eq!(column_of(&all, Spectrogram), 1);
        assert_eq!(column_of(&all, Fft), 2);

        assert_eq!(column_of(&[Spectrogram, Fft], Spectrogram), 0);
        assert_eq!(column_of(&[Spectrogram, Fft], Fft), 1);
        assert_eq!(column_of(&[Time, Fft], Fft), 1);
        assert_eq!(column_of(&[Fft], Fft), 0);
    }

    #[test]
    fn window_size_table() {
        assert_eq!(window_size(1, 1).unwrap(), (5.5, 3.5));
        assert_eq!(window_size(3, 1).unwrap(), (5.5, 4.0));
        assert_eq!(window_size(2, 2).unwrap(), (9.0, 3.0));
        assert_eq!(window_size(3, 3).unwrap(), (9.0, 3.0));
        assert!(matches!(
            window_size(4, 1),
            Err(PlotError::UnsupportedWindowSize { rows: 4, cols: 1 })
        ));
    }

    #[test]
    fn spacing_table_hits_and_misses() {
        use PlotKind::*;
        // any kind at 1x1 takes the shared margin set
        let shared = subplot_margins(&[Fft], 1, 1).unwrap();
        assert_eq!(shared, subplot_margins(&[Time, Spectrogram, Fft], 1, 1).unwrap());
        assert!((shared.left - 0.175).abs() < 1e-6);

        let stacked = subplot_margins(&[Time, Spectrogram], 2, 1).unwrap();
        assert!((stacked.bottom - 0.0).abs() < 1e-6);

        assert!(matches!(
            subplot_margins(&[Time, Spectrogram], 3, 2),
            Err(PlotError::UnsupportedSpacing { .. })
        ));
    }

    #[test]
    fn grid_cells_respect_margins() {
        let margins = subplot_margins(&[PlotKind::Time], 3, 1).unwrap();
        let cells = grid_cells(550, 400, 3, 1, margins);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].len(), 1);
        // rows stack top-down without overlap
        assert!(cells[0][0].y1 <= cells[1][0].y0);
        assert!(cells[1][0].y1 <= cells[2][0].y0);
        assert_eq!(cells[0][0].x0, (0.125f32 * 550.0).round() as u32);
        assert!(cells[2][0].y1 <= 400);
    }

    #[test]
    fn oversized_right_margin_is_clipped() {
        let margins = subplot_margins(&[PlotKind::Spectrogram], 3, 1).unwrap();
        let cells = grid_cells(550, 400, 3, 1, margins);
        assert!(cells[0][0].x1 <= 550);
    }
}
