use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for the force-directed placement phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Simulation step count.
    pub iterations: usize,
    /// Ideal spring length `k`.
    pub optimal_distance: f32,
    pub attraction_strength: f32,
    /// Multiplier on the `k² / d` repulsion term. 1.0 is the plain formula.
    pub repulsion_strength: f32,
    /// Vertical nudge per unit of (out-degree - in-degree).
    pub flow_bias: f32,
    pub initial_temperature: f32,
    pub cooling_rate: f32,
    /// Distance floor for repulsion.
    pub min_distance: f32,
    /// Scale of the hash-seeded start positions.
    pub initial_spread: f32,
    pub component_spacing: f32,
    /// Gap between grid-packed isolated nodes.
    pub isolated_spacing: f32,
    pub horizontal_stretch: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 150,
            optimal_distance: 36.0,
            attraction_strength: 0.02,
            repulsion_strength: 1.0,
            flow_bias: 20.0,
            initial_temperature: 80.0,
            cooling_rate: 0.95,
            min_distance: 10.0,
            initial_spread: 150.0,
            component_spacing: 50.0,
            isolated_spacing: 20.0,
            horizontal_stretch: 2.0,
        }
    }
}

/// Tuning knobs for bezier edge routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Fraction of the endpoint distance used as control-point push.
    pub control_ratio: f32,
    pub control_min: f32,
    pub control_max: f32,
    /// Padding around endpoint rectangles during collision checks.
    pub collision_padding: f32,
    /// Interior bezier samples per collision check (at least 20 are taken).
    pub collision_samples: usize,
    /// Push multipliers tried after the first curve collides.
    pub retry_factors: Vec<f32>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            control_ratio: 0.4,
            control_min: 40.0,
            control_max: 150.0,
            collision_padding: 5.0,
            collision_samples: 20,
            retry_factors: vec![1.5, 2.0, 2.5],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub layout: LayoutConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    layout: Option<LayoutConfigFile>,
    routing: Option<RoutingConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    iterations: Option<usize>,
    optimal_distance: Option<f32>,
    attraction_strength: Option<f32>,
    repulsion_strength: Option<f32>,
    flow_bias: Option<f32>,
    initial_temperature: Option<f32>,
    cooling_rate: Option<f32>,
    min_distance: Option<f32>,
    initial_spread: Option<f32>,
    component_spacing: Option<f32>,
    isolated_spacing: Option<f32>,
    horizontal_stretch: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RoutingConfigFile {
    control_ratio: Option<f32>,
    control_min: Option<f32>,
    control_max: Option<f32>,
    collision_padding: Option<f32>,
    collision_samples: Option<usize>,
    retry_factors: Option<Vec<f32>>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(&contents).map_err(|_| {
            anyhow::anyhow!("invalid config file {}: {json_err}", path.display())
        })?,
    };
    apply_config_file(&mut config, parsed);
    Ok(config)
}

/// Merges an inline `config` object (same shape as a config file) over `config`.
pub fn merge_inline_config(
    mut config: Config,
    inline: &serde_json::Value,
) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_value(inline.clone())?;
    apply_config_file(&mut config, parsed);
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.iterations {
            target.iterations = v;
        }
        if let Some(v) = layout.optimal_distance {
            target.optimal_distance = v;
        }
        if let Some(v) = layout.attraction_strength {
            target.attraction_strength = v;
        }
        if let Some(v) = layout.repulsion_strength {
            target.repulsion_strength = v;
        }
        if let Some(v) = layout.flow_bias {
            target.flow_bias = v;
        }
        if let Some(v) = layout.initial_temperature {
            target.initial_temperature = v;
        }
        if let Some(v) = layout.cooling_rate {
            target.cooling_rate = v;
        }
        if let Some(v) = layout.min_distance {
            target.min_distance = v;
        }
        if let Some(v) = layout.initial_spread {
            target.initial_spread = v;
        }
        if let Some(v) = layout.component_spacing {
            target.component_spacing = v;
        }
        if let Some(v) = layout.isolated_spacing {
            target.isolated_spacing = v;
        }
        if let Some(v) = layout.horizontal_stretch {
            target.horizontal_stretch = v;
        }
    }

    if let Some(routing) = parsed.routing {
        let target = &mut config.routing;
        if let Some(v) = routing.control_ratio {
            target.control_ratio = v;
        }
        if let Some(v) = routing.control_min {
            target.control_min = v;
        }
        if let Some(v) = routing.control_max {
            target.control_max = v;
        }
        if let Some(v) = routing.collision_padding {
            target.collision_padding = v;
        }
        if let Some(v) = routing.collision_samples {
            target.collision_samples = v;
        }
        if let Some(v) = routing.retry_factors {
            target.retry_factors = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn inline_config_overrides_only_named_fields() {
        let inline = serde_json::json!({
            "layout": { "flowBias": 0.0, "horizontalStretch": 1.5 },
            "routing": { "retryFactors": [2.0] }
        });
        let config = merge_inline_config(Config::default(), &inline).unwrap();
        assert_eq!(config.layout.flow_bias, 0.0);
        assert_eq!(config.layout.horizontal_stretch, 1.5);
        assert_eq!(config.layout.iterations, 150);
        assert_eq!(config.routing.retry_factors, vec![2.0]);
        assert_eq!(config.routing.control_min, 40.0);
    }

    #[test]
    fn loads_json5_config_file() {
        let dir = std::env::temp_dir().join(format!("sfl-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json5");
        std::fs::write(&path, "{ layout: { iterations: 10, }, // short run\n}").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.layout.iterations, 10);
        std::fs::remove_dir_all(&dir).ok();
    }
}
