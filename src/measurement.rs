use crate::error::PlotError;

/// Acquisition rate of the ultrasonic front-end.
pub const SAMPLE_RATE_HZ: f32 = 150_000.0;

/// Transducer bonded to the plate, with its position in plate coordinates.
#[derive(Clone, Debug)]
pub struct Sensor {
    pub name: String,
    pub position_m: (f32, f32),
}

impl Sensor {
    pub fn new(name: impl Into<String>, x_m: f32, y_m: f32) -> Self {
        Self {
            name: name.into(),
            position_m: (x_m, y_m),
        }
    }
}

/// Sensor arrangement for one experimental setup: a plate probed by an
/// actuator, observed by a handful of sensors.
#[derive(Clone, Debug)]
pub struct SetupGeometry {
    pub name: String,
    pub plate_size_m: (f32, f32),
    pub actuator: Sensor,
    pub sensors: Vec<Sensor>,
    pub wave_speed_m_s: f32,
}

/// Single captured waveform for one channel.
#[derive(Clone, Debug)]
pub struct ChannelTrace {
    pub label: String,
    pub samples: Vec<f32>,
}

impl ChannelTrace {
    pub fn new(label: impl Into<String>, samples: Vec<f32>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }

    pub fn duration_seconds(&self, sample_rate_hz: f32) -> f32 {
        self.samples.len() as f32 / sample_rate_hz
    }
}

/// Repeated captures of the same excitation for one channel.
#[derive(Clone, Debug)]
pub struct ChannelEnsemble {
    pub label: String,
    pub captures: Vec<Vec<f32>>, // capture x samples
}

impl ChannelEnsemble {
    pub fn validate(&self) -> Result<(), PlotError> {
        let Some(first) = self.captures.first() else {
            return Err(PlotError::EmptySignal(self.label.clone()));
        };
        if first.is_empty() {
            return Err(PlotError::EmptySignal(self.label.clone()));
        }
        for capture in &self.captures {
            if capture.len() != first.len() {
                return Err(PlotError::CaptureLengthMismatch {
                    label: self.label.clone(),
                    expected: first.len(),
                    actual: capture.len(),
                });
            }
        }
        Ok(())
    }

    /// The first capture as a standalone trace.
    pub fn first_trace(&self) -> Option<ChannelTrace> {
        self.captures
            .first()
            .map(|samples| ChannelTrace::new(self.label.clone(), samples.clone()))
    }
}

/// One recording session: every channel with all of its repeated captures.
#[derive(Clone, Debug)]
pub struct MeasurementSet {
    pub sample_rate_hz: f32,
    pub channels: Vec<ChannelEnsemble>,
}

impl MeasurementSet {
    pub fn new(
        sample_rate_hz: f32,
        channels: Vec<ChannelEnsemble>,
    ) -> Result<Self, PlotError> {
        if sample_rate_hz <= 0.0 {
            return Err(PlotError::InvalidSampleRate);
        }
        for channel in &channels {
            channel.validate()?;
        }
        Ok(Self {
            sample_rate_hz,
            channels,
        })
    }

    /// First capture of every channel, the shape the comparison grid plots.
    pub fn first_traces(&self) -> Vec<ChannelTrace> {
        self.channels
            .iter()
            .filter_map(ChannelEnsemble::first_trace)
            .collect()
    }
}
