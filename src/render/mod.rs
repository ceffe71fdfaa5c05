pub mod arrivals;
pub mod colormap;
pub mod compare;
pub mod figure;
pub mod layout;
pub mod sketch;
pub mod spectrogram;
pub mod statistics;
pub mod style;

pub use arrivals::{envelope_with_lines, spectrogram_with_lines};
pub use compare::{compare_signals, CompareOptions};
pub use figure::Figure;
pub use layout::{subplot_margins, window_size, Margins, PlotKind};
pub use sketch::setup_sketch;
pub use statistics::wave_statistics;
pub use style::{set_fontsizes, FontSizes};
