use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Rendering knobs, layered as defaults, then an optional JSON file,
/// then `ECHOVIEW_*` environment overrides.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub output_dir: PathBuf,
    /// Pixels per inch of the figure-size table.
    pub dpi: u32,
    /// FFT window of comparison-grid spectrograms.
    pub nfft_compare: usize,
    /// FFT window of the arrival-time spectrogram.
    pub nfft_arrivals: usize,
    /// Repeated captures per channel when synthesizing a session.
    pub captures: usize,
}

impl RenderConfig {
    pub fn defaults() -> Self {
        Self {
            output_dir: PathBuf::from("figures"),
            dpi: 100,
            nfft_compare: 256,
            nfft_arrivals: 1024,
            captures: 5,
        }
    }

    pub fn load() -> Result<Self> {
        let mut cfg = Self::defaults();

        // file first, env second.
        if let Some(file_cfg) = load_file_config()? {
            cfg.apply_file(file_cfg);
        }

        cfg.apply_env();
        cfg.sanitize();

        Ok(cfg)
    }

    fn apply_file(&mut self, fc: FileConfig) {
        if let Some(v) = fc.output_dir {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = fc.dpi {
            self.dpi = v;
        }
        if let Some(v) = fc.nfft_compare {
            self.nfft_compare = v;
        }
        if let Some(v) = fc.nfft_arrivals {
            self.nfft_arrivals = v;
        }
        if let Some(v) = fc.captures {
            self.captures = v;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var("ECHOVIEW_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = env_parse::<u32>("ECHOVIEW_DPI") {
            self.dpi = v;
        }
        if let Some(v) = env_parse::<usize>("ECHOVIEW_NFFT_COMPARE") {
            self.nfft_compare = v;
        }
        if let Some(v) = env_parse::<usize>("ECHOVIEW_NFFT_ARRIVALS") {
            self.nfft_arrivals = v;
        }
        if let Some(v) = env_parse::<usize>("ECHOVIEW_CAPTURES") {
            self.captures = v;
        }
    }

    fn sanitize(&mut self) {
        // clamp instead of failing
        self.dpi = self.dpi.clamp(50, 300);
        self.nfft_compare = self.nfft_compare.clamp(64, 8_192);
        self.nfft_arrivals = self.nfft_arrivals.clamp(64, 8_192);
        self.captures = self.captures.clamp(2, 50);
    }
}

#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    output_dir: Option<String>,
    dpi: Option<u32>,
    nfft_compare: Option<usize>,
    nfft_arrivals: Option<usize>,
    captures: Option<usize>,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse::<T>().ok())
}

fn load_file_config() -> Result<Option<FileConfig>> {
    if let Ok(p) = env::var("ECHOVIEW_CONFIG") {
        let path = PathBuf::from(p);
        if !path.exists() {
            anyhow::bail!("ECHOVIEW_CONFIG points to a missing file: {}", path.display());
        }
        return Ok(Some(read_json(&path)?));
    }

    let path = PathBuf::from("echoview.json");
    if path.exists() {
        return Ok(Some(read_json(&path)?));
    }

    Ok(None)
}

fn read_json(path: &PathBuf) -> Result<FileConfig> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    serde_json::from_str::<FileConfig>(&s)
        .with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let mut cfg = RenderConfig::defaults();
        cfg.apply_file(FileConfig {
            output_dir: Some("out".into()),
            dpi: Some(200),
            nfft_compare: None,
            nfft_arrivals: Some(2_048),
            captures: None,
        });
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.dpi, 200);
        assert_eq!(cfg.nfft_compare, 256);
        assert_eq!(cfg.nfft_arrivals, 2_048);
    }

    #[test]
    fn sanitize_clamps_extremes() {
        let mut cfg = RenderConfig::defaults();
        cfg.dpi = 10_000;
        cfg.nfft_compare = 1;
        cfg.captures = 0;
        cfg.sanitize();
        assert_eq!(cfg.dpi, 300);
        assert_eq!(cfg.nfft_compare, 64);
        assert_eq!(cfg.captures, 2);
    }

    #[test]
    fn file_config_parses_partial_json() {
        let fc: FileConfig = serde_json::from_str(r#"{"dpi": 150}"#).unwrap();
        assert_eq!(fc.dpi, Some(150));
        assert!(fc.output_dir.is_none());
    }
}
