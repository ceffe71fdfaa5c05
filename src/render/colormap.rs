use plotters::style::RGBColor;

// Anchor points of the blue-green-yellow sequential map the spectrograms
// use, interpolated linearly in RGB.
const ANCHORS: [(f32, (u8, u8, u8)); 9] = [
    (0.0, (68, 1, 84)),
    (0.125, (71, 44, 122)),
    (0.25, (59, 81, 139)),
    (0.375, (44, 113, 142)),
    (0.5, (33, 144, 141)),
    (0.625, (39, 173, 129)),
    (0.75, (92, 200, 99)),
    (0.875, (170, 220, 50)),
    (1.0, (253, 231, 37)),
];

/// Color for a power value normalized into `0.0..=1.0`.
pub fn power_color(normalized: f32) -> RGBColor {
    let t = normalized.clamp(0.0, 1.0);
    let mut lower = ANCHORS[0];
    for &upper in &ANCHORS[1..] {
        if t <= upper.0 {
            let span = upper.0 - lower.0;
            let f = if span > 0.0 { (t - lower.0) / span } else { 0.0 };
            let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f).round() as u8;
            return RGBColor(
                lerp(lower.1 .0, upper.1 .0),
                lerp(lower.1 .1, upper.1 .1),
                lerp(lower.1 .2, upper.1 .2),
            );
        }
        lower = upper;
    }
    let (r, g, b) = ANCHORS[ANCHORS.len() - 1].1;
    RGBColor(r, g, b)
}
