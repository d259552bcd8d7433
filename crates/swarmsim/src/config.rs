//! Config loading and small CLI parsing helpers.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use swarm_core::SimulationConfig;

/// Load and validate the YAML simulation config.
///
/// `schema` is the schema file consumed by the deployment's external
/// validator; when given, it only has to exist and be readable here.
pub fn load(config_path: &Path, schema: Option<&Path>) -> Result<SimulationConfig> {
    if let Some(schema) = schema {
        std::fs::metadata(schema)
            .with_context(|| format!("schema file {} not readable", schema.display()))?;
    }
    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("cannot read config {}", config_path.display()))?;
    let cfg: SimulationConfig =
        serde_yaml::from_str(&raw).context("cannot parse simulation config")?;
    cfg.validate().context("invalid simulation config")?;
    Ok(cfg)
}

/// Parse a human duration string: `500ms`, `2s`, `1.5m`, `1h`, or bare
/// seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let (value, unit): (&str, &str) = if let Some(v) = s.strip_suffix("ms") {
        (v, "ms")
    } else if let Some(v) = s.strip_suffix('h') {
        (v, "h")
    } else if let Some(v) = s.strip_suffix('m') {
        (v, "m")
    } else if let Some(v) = s.strip_suffix('s') {
        (v, "s")
    } else {
        (s, "s")
    };

    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("invalid duration {s:?}"))?;
    if value < 0.0 || !value.is_finite() {
        bail!("invalid duration {s:?}");
    }
    let secs = match unit {
        "ms" => value / 1000.0,
        "m" => value * 60.0,
        "h" => value * 3600.0,
        _ => value,
    };
    Ok(Duration::from_secs_f64(secs))
}

/// A boolean environment override: unset or unparsable leaves `current`.
pub fn env_bool(name: &str, current: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => v.parse().unwrap_or(current),
        Err(_) => current,
    }
}
