//! TOML configuration for searches and announcers.
//!
//! A config file is optional. Values it sets override the built-in defaults;
//! command-line flags override both.
//!
//! ```toml
//! [search]
//! coeffs = "1,-6,11,-6"   # or: preset = "p1"
//! target = 3
//! workers = 8
//! trace = true
//! deadline_secs = 30.0
//!
//! [[announcer]]
//! label = "ROJO"
//! period_secs = 3.0
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::polynomial::{Polynomial, Preset};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub announcer: Vec<AnnouncerConfig>,
}

/// The `[search]` table. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub preset: Option<String>,
    pub coeffs: Option<String>,
    pub target: Option<usize>,
    pub workers: Option<usize>,
    pub trace: Option<bool>,
    pub deadline_secs: Option<f64>,
}

/// Convert user-supplied seconds into a `Duration`, rejecting negative,
/// non-finite and out-of-range values.
pub fn seconds(secs: f64, what: &str) -> Result<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        bail!("{} must be a non-negative number (got {})", what, secs);
    }
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} is too large (got {})", what, secs))
}

/// One `[[announcer]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnouncerConfig {
    pub label: String,
    pub period_secs: f64,
}

impl AnnouncerConfig {
    /// Parse `LABEL:SECS`, e.g. `ROJO:3` or `AZUL:0.5`.
    pub fn parse(entry: &str) -> Result<Self> {
        let (label, secs) = entry
            .rsplit_once(':')
            .with_context(|| format!("announcer {:?} must look like LABEL:SECS", entry))?;
        let label = label.trim();
        if label.is_empty() {
            bail!("announcer {:?} has an empty label", entry);
        }
        let period_secs: f64 = secs
            .trim()
            .parse()
            .with_context(|| format!("announcer {:?} has an invalid period", entry))?;
        let cfg = AnnouncerConfig {
            label: label.to_string(),
            period_secs,
        };
        cfg.period()?;
        Ok(cfg)
    }

    pub fn period(&self) -> Result<Duration> {
        if self.period_secs <= 0.0 {
            bail!(
                "announcer {:?} period must be positive (got {})",
                self.label,
                self.period_secs
            );
        }
        seconds(self.period_secs, &format!("announcer {:?} period", self.label))
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("invalid configuration TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.search;
        if s.preset.is_some() && s.coeffs.is_some() {
            bail!("[search] sets both preset and coeffs; choose one");
        }
        if let Some(preset) = &s.preset {
            preset.parse::<Preset>()?;
        }
        if let Some(coeffs) = &s.coeffs {
            Polynomial::parse(coeffs)?;
        }
        if s.workers == Some(0) {
            bail!("[search] workers must be at least 1");
        }
        if let Some(secs) = s.deadline_secs {
            seconds(secs, "[search] deadline_secs")?;
        }
        for a in &self.announcer {
            a.period()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let c = Config::parse("").unwrap();
        assert!(c.search.coeffs.is_none());
        assert!(c.announcer.is_empty());
    }

    #[test]
    fn full_file_parses() {
        let c = Config::parse(
            r#"
            [search]
            coeffs = "1,-6,11,-6"
            target = 3
            workers = 8
            trace = true
            deadline_secs = 2.5

            [[announcer]]
            label = "ROJO"
            period_secs = 3.0

            [[announcer]]
            label = "AZUL"
            period_secs = 5.0
            "#,
        )
        .unwrap();
        assert_eq!(c.search.target, Some(3));
        assert_eq!(c.search.workers, Some(8));
        assert_eq!(c.search.trace, Some(true));
        assert_eq!(c.search.deadline_secs, Some(2.5));
        assert_eq!(c.announcer.len(), 2);
        assert_eq!(c.announcer[1].period().unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_preset_and_coeffs_together() {
        let err = Config::parse("[search]\npreset = \"p1\"\ncoeffs = \"1,2\"\n").unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::parse("[search]\nworkers = 0\n").is_err());
        assert!(Config::parse("[search]\npreset = \"p7\"\n").is_err());
        assert!(Config::parse("[search]\ncoeffs = \"1\"\n").is_err());
        assert!(Config::parse("[search]\ndeadline_secs = -1.0\n").is_err());
        assert!(Config::parse("[search]\ndeadline_secs = 1e300\n").is_err());
        assert!(Config::parse("[[announcer]]\nlabel = \"X\"\nperiod_secs = 1e300\n").is_err());
        assert!(Config::parse("[[announcer]]\nlabel = \"X\"\nperiod_secs = 0.0\n").is_err());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::parse("[search]\nthreads = 4\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[search]\npreset = \"p1\"").unwrap();
        let c = Config::load(f.path()).unwrap();
        assert_eq!(c.search.preset.as_deref(), Some("p1"));
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = Config::load(Path::new("/nonexistent/rootquorum.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/rootquorum.toml"));
    }

    #[test]
    fn announcer_entry_parsing() {
        assert_eq!(
            AnnouncerConfig::parse("ROJO:3").unwrap(),
            AnnouncerConfig {
                label: "ROJO".into(),
                period_secs: 3.0
            }
        );
        assert_eq!(AnnouncerConfig::parse("a:b:0.5").unwrap().label, "a:b");
        assert!(AnnouncerConfig::parse("ROJO").is_err());
        assert!(AnnouncerConfig::parse(":3").is_err());
        assert!(AnnouncerConfig::parse("ROJO:x").is_err());
        assert!(AnnouncerConfig::parse("ROJO:-1").is_err());
        assert!(AnnouncerConfig::parse("ROJO:1e300").is_err());
        assert!(AnnouncerConfig::parse("ROJO:NaN").is_err());
    }

    #[test]
    fn seconds_rejects_out_of_range_values() {
        assert_eq!(seconds(2.5, "x").unwrap(), Duration::from_millis(2500));
        assert_eq!(seconds(0.0, "x").unwrap(), Duration::ZERO);
        assert!(seconds(-0.5, "x").is_err());
        assert!(seconds(f64::INFINITY, "x").is_err());
        let err = seconds(1e300, "--deadline-secs").unwrap_err();
        assert!(err.to_string().contains("--deadline-secs"));
    }
}
