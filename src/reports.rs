use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::RenderConfig;
use crate::dsp::correlate::compress_chirp;
use crate::measurement::{
    ChannelEnsemble, ChannelTrace, MeasurementSet, Sensor, SetupGeometry, SAMPLE_RATE_HZ,
};
use crate::render::compare::{compare_signals, CompareOptions};
use crate::render::figure::Figure;
use crate::render::layout::{subplot_margins, PlotKind};
use crate::render::{envelope_with_lines, setup_sketch, spectrogram_with_lines, wave_statistics};

/// Probe chirp sweep and length.
const CHIRP_START_HZ: f32 = 1_000.0;
const CHIRP_STOP_HZ: f32 = 40_000.0;
const CHIRP_DURATION_S: f32 = 0.003;
/// When the actuator fires on the capture timeline.
const PROBE_EMIT_S: f32 = 0.05;
/// Total capture length.
const CAPTURE_DURATION_S: f32 = 0.25;
/// Amplitude kept per wall bounce.
const REFLECTION_LOSS: f32 = 0.55;
/// Additive sensor noise, volts.
const NOISE_AMPLITUDE: f32 = 0.003;
/// Arrival-time spectrogram window: the 5 ms following the probe onset.
const ARRIVAL_WINDOW_S: (f32, f32) = (PROBE_EMIT_S, PROBE_EMIT_S + 0.005);
/// Color scale depth of the arrival-time spectrogram.
const ARRIVAL_DYNAMIC_RANGE_DB: f32 = 40.0;

pub fn setup1_results(config: &RenderConfig) -> Result<Vec<PathBuf>> {
    run_report(&setup1(), 1, config)
}

pub fn setup2_results(config: &RenderConfig) -> Result<Vec<PathBuf>> {
    run_report(&setup2(), 2, config)
}

pub fn setup3_results(config: &RenderConfig) -> Result<Vec<PathBuf>> {
    run_report(&setup3(), 3, config)
}

/// Sensors in a line away from the actuator.
fn setup1() -> SetupGeometry {
    SetupGeometry {
        name: "Setup 1".into(),
        plate_size_m: (0.8, 0.6),
        actuator: Sensor::new("Actuator", 0.2, 0.3),
        sensors: vec![
            Sensor::new("Sensor 1", 0.35, 0.3),
            Sensor::new("Sensor 2", 0.5, 0.3),
            Sensor::new("Sensor 3", 0.65, 0.3),
        ],
        wave_speed_m_s: 600.0,
    }
}

/// Sensors on a parallel edge, actuator off-centre.
fn setup2() -> SetupGeometry {
    SetupGeometry {
        name: "Setup 2".into(),
        plate_size_m: (0.8, 0.6),
        actuator: Sensor::new("Actuator", 0.4, 0.15),
        sensors: vec![
            Sensor::new("Sensor 1", 0.2, 0.45),
            Sensor::new("Sensor 2", 0.4, 0.45),
            Sensor::new("Sensor 3", 0.6, 0.45),
        ],
        wave_speed_m_s: 600.0,
    }
}

/// Sensors spread across the plate, actuator near a corner.
fn setup3() -> SetupGeometry {
    SetupGeometry {
        name: "Setup 3".into(),
        plate_size_m: (0.8, 0.6),
        actuator: Sensor::new("Actuator", 0.1, 0.1),
        sensors: vec![
            Sensor::new("Sensor 1", 0.7, 0.5),
            Sensor::new("Sensor 2", 0.4, 0.3),
            Sensor::new("Sensor 3", 0.7, 0.1),
        ],
        wave_speed_m_s: 600.0,
    }
}

/// Hann-tapered linear sweep from `CHIRP_START_HZ` to `CHIRP_STOP_HZ`.
fn probe_chirp(sample_rate_hz: f32) -> Vec<f32> {
    let n = (CHIRP_DURATION_S * sample_rate_hz).round() as usize;
    let sweep_rate = (CHIRP_STOP_HZ - CHIRP_START_HZ) / CHIRP_DURATION_S;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate_hz;
            let phase = 2.0 * std::f32::consts::PI * (CHIRP_START_HZ * t + 0.5 * sweep_rate * t * t);
            let taper = 0.5
                * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (n.max(2) - 1) as f32).cos());
            phase.sin() * taper
        })
        .collect()
}

/// Propagation delays from the actuator to one sensor: the direct path,
/// then the four first-order wall mirrors, then the four second-order
/// corner mirrors, each group sorted by arrival.
fn arrival_delays_s(geometry: &SetupGeometry, sensor: &Sensor) -> Vec<f32> {
    let (w, h) = geometry.plate_size_m;
    let (ax, ay) = geometry.actuator.position_m;
    let (sx, sy) = sensor.position_m;
    let dist = |x: f32, y: f32| ((x - sx).powi(2) + (y - sy).powi(2)).sqrt();

    let mut first = [
        dist(-ax, ay),
        dist(2.0 * w - ax, ay),
        dist(ax, -ay),
        dist(ax, 2.0 * h - ay),
    ];
    first.sort_by(f32::total_cmp);
    let mut second = [
        dist(-ax, -ay),
        dist(-ax, 2.0 * h - ay),
        dist(2.0 * w - ax, -ay),
        dist(2.0 * w - ax, 2.0 * h - ay),
    ];
    second.sort_by(f32::total_cmp);

    std::iter::once(dist(ax, ay))
        .chain(first)
        .chain(second)
        .map(|d| d / geometry.wave_speed_m_s)
        .collect()
}

/// Build the measurement session for a setup: the probe chirp travels the
/// direct and mirrored paths to each sensor, losing amplitude per bounce
/// and with distance, and every capture adds fresh noise.
fn synthesize_session(
    geometry: &SetupGeometry,
    captures: usize,
    sample_rate_hz: f32,
    seed: u64,
) -> Result<(MeasurementSet, Vec<f32>)> {
    let chirp = probe_chirp(sample_rate_hz);
    let len = (CAPTURE_DURATION_S * sample_rate_hz).round() as usize;
    let emit = (PROBE_EMIT_S * sample_rate_hz).round() as usize;

    let mut excitation = vec![0.0f32; len];
    for (i, &v) in chirp.iter().enumerate() {
        if emit + i < len {
            excitation[emit + i] = v;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut channels = Vec::with_capacity(geometry.sensors.len());
    for sensor in &geometry.sensors {
        let delays = arrival_delays_s(geometry, sensor);
        let mut clean = vec![0.0f32; len];
        for (path, &delay) in delays.iter().enumerate() {
            let order = match path {
                0 => 0,
                1..=4 => 1,
                _ => 2,
            };
            let distance = delay * geometry.wave_speed_m_s;
            let amplitude = REFLECTION_LOSS.powi(order) / (1.0 + distance);
            let offset = emit + (delay * sample_rate_hz).round() as usize;
            for (i, &v) in chirp.iter().enumerate() {
                if offset + i < len {
                    clean[offset + i] += amplitude * v;
                }
            }
        }
        let captures: Vec<Vec<f32>> = (0..captures)
            .map(|_| {
                clean
                    .iter()
                    .map(|&v| v + rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE))
                    .collect()
            })
            .collect();
        channels.push(ChannelEnsemble {
            label: sensor.name.clone(),
            captures,
        });
    }

    let set = MeasurementSet::new(sample_rate_hz, channels)?;
    Ok((set, excitation))
}

fn run_report(geometry: &SetupGeometry, index: u64, config: &RenderConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("failed to create output dir {}", config.output_dir.display())
    })?;
    info!("generating {} report", geometry.name);

    let (set, excitation) =
        synthesize_session(geometry, config.captures, SAMPLE_RATE_HZ, index)?;
    let slug = format!("setup{index}");
    let mut saved = Vec::new();

    // sensor layout sketch
    let mut fig = Figure::for_grid(1, 1, config.dpi)?;
    setup_sketch(&mut fig, geometry)?;
    saved.push(write_png(fig, &config.output_dir, &format!("{slug}_layout.png"))?);

    // time / spectrogram / fft grid over the first capture of every channel
    let traces = set.first_traces();
    let opts = CompareOptions {
        nfft: config.nfft_compare,
        ..Default::default()
    };
    let margins = subplot_margins(&opts.kinds, 1, 1)?;
    let mut fig = Figure::for_grid(traces.len(), opts.kinds.len(), config.dpi)?;
    compare_signals(&mut fig, margins, &traces, set.sample_rate_hz, &opts)?;
    saved.push(write_png(fig, &config.output_dir, &format!("{slug}_signals.png"))?);

    // average and variance across the repeated captures
    let stat_rows = set.channels.len().min(3);
    let margins = subplot_margins(&[PlotKind::Time], stat_rows, 1)?;
    let mut fig = Figure::for_grid(stat_rows, 1, config.dpi)?;
    wave_statistics(&mut fig, margins, &set)?;
    saved.push(write_png(fig, &config.output_dir, &format!("{slug}_statistics.png"))?);

    // echo analysis of the first sensor
    let sensor = &geometry.sensors[0];
    let trace = &traces[0];
    let delays = arrival_delays_s(geometry, sensor);
    let absolute: Vec<f32> = delays.iter().map(|d| d + PROBE_EMIT_S).collect();
    let sensor_slug = slugify(&sensor.name);

    let mut fig = Figure::for_grid(1, 1, config.dpi)?;
    spectrogram_with_lines(
        &mut fig,
        trace,
        set.sample_rate_hz,
        &absolute,
        config.nfft_arrivals,
        ARRIVAL_DYNAMIC_RANGE_DB,
        ARRIVAL_WINDOW_S,
    )?;
    saved.push(write_png(
        fig,
        &config.output_dir,
        &format!("{slug}_{sensor_slug}_arrival_spectrogram.png"),
    )?);

    // matched-filter compression against the emitted excitation
    let compressed = ChannelTrace::new(
        trace.label.clone(),
        compress_chirp(&trace.samples, &excitation),
    );
    let mut fig = Figure::for_grid(1, 1, config.dpi)?;
    envelope_with_lines(&mut fig, &compressed, set.sample_rate_hz, &delays)?;
    saved.push(write_png(
        fig,
        &config.output_dir,
        &format!("{slug}_{sensor_slug}_arrival_envelope.png"),
    )?);

    // compressed trace stacked over its spectrogram, one shared figure
    let margins = subplot_margins(&[PlotKind::Time, PlotKind::Spectrogram], 2, 1)?;
    let mut fig = Figure::for_grid(2, 1, config.dpi)?;
    let stack = [compressed];
    let time_pass = CompareOptions {
        kinds: vec![PlotKind::Time],
        nfft: config.nfft_compare,
        compressed_chirps: true,
        set_row: Some(0),
        grid_rows: Some(2),
        ..Default::default()
    };
    compare_signals(&mut fig, margins, &stack, set.sample_rate_hz, &time_pass)?;
    let spectrogram_pass = CompareOptions {
        kinds: vec![PlotKind::Spectrogram],
        nfft: config.nfft_compare,
        compressed_chirps: true,
        set_row: Some(1),
        grid_rows: Some(2),
        ..Default::default()
    };
    compare_signals(&mut fig, margins, &stack, set.sample_rate_hz, &spectrogram_pass)?;
    saved.push(write_png(
        fig,
        &config.output_dir,
        &format!("{slug}_{sensor_slug}_chirp_detail.png"),
    )?);

    Ok(saved)
}

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn write_png(fig: Figure, dir: &Path, name: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    let png = fig.into_png()?;
    fs::write(&path, png).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_delays_are_grouped_and_sorted() {
        let geometry = setup1();
        let delays = arrival_delays_s(&geometry, &geometry.sensors[0]);
        assert_eq!(delays.len(), 9);
        // direct path is the shortest
        assert!(delays[1..].iter().all(|&d| d >= delays[0]));
        // both reflection groups come out sorted
        assert!(delays[1..5].windows(2).all(|w| w[0] <= w[1]));
        assert!(delays[5..].windows(2).all(|w| w[0] <= w[1]));
        // direct: 0.15 m at 600 m/s
        assert!((delays[0] - 0.00025).abs() < 1e-6);
    }

    #[test]
    fn probe_chirp_is_tapered() {
        let chirp = probe_chirp(SAMPLE_RATE_HZ);
        assert_eq!(chirp.len(), 450);
        assert!(chirp[0].abs() < 1e-6);
        assert!(chirp.last().unwrap().abs() < 1e-3);
        assert!(chirp.iter().any(|v| v.abs() > 0.5));
    }

    #[test]
    fn synthesized_session_matches_geometry() {
        let geometry = setup2();
        let (set, excitation) =
            synthesize_session(&geometry, 3, SAMPLE_RATE_HZ, 42).unwrap();
        assert_eq!(set.channels.len(), 3);
        assert_eq!(set.channels[0].captures.len(), 3);
        assert_eq!(excitation.len(), 37_500);
        // the probe sits at the emission offset in the excitation trace
        assert!(excitation[..7_400].iter().all(|&v| v == 0.0));
        assert!(excitation[7_500..8_000].iter().any(|&v| v.abs() > 0.1));
    }

    #[test]
    fn synthesis_is_deterministic_per_seed() {
        let geometry = setup3();
        let (a, _) = synthesize_session(&geometry, 2, SAMPLE_RATE_HZ, 7).unwrap();
        let (b, _) = synthesize_session(&geometry, 2, SAMPLE_RATE_HZ, 7).unwrap();
        assert_eq!(a.channels[0].captures[0], b.channels[0].captures[0]);
    }

    #[test]
    fn setup1_report_writes_all_figures() {
        let dir = std::env::temp_dir().join(format!("echoview-report-{}", std::process::id()));
        let config = RenderConfig {
            output_dir: dir.clone(),
            dpi: 100,
            nfft_compare: 256,
            nfft_arrivals: 1024,
            captures: 2,
        };
        let saved = setup1_results(&config).unwrap();
        assert_eq!(saved.len(), 6);
        for path in &saved {
            assert!(path.exists(), "missing {}", path.display());
        }
        fs::remove_dir_all(&dir).unwrap();
    }
}
