use crate::templates::UnitSpec;
use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Animation pacing for the live encounter, in milliseconds.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PacingConfig {
    pub victory_delay_ms: u64,
    pub turn_announcement_delay_ms: u64,
    pub monster_action_delay_ms: u64,
    pub round_end_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            victory_delay_ms: 1000,
            turn_announcement_delay_ms: 1500,
            monster_action_delay_ms: 1000,
            round_end_delay_ms: 500,
        }
    }
}

impl PacingConfig {
    pub fn victory_delay(&self) -> Duration {
        Duration::from_millis(self.victory_delay_ms)
    }

    pub fn turn_announcement_delay(&self) -> Duration {
        Duration::from_millis(self.turn_announcement_delay_ms)
    }

    pub fn monster_action_delay(&self) -> Duration {
        Duration::from_millis(self.monster_action_delay_ms)
    }

    pub fn round_end_delay(&self) -> Duration {
        Duration::from_millis(self.round_end_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    pub all_success_trials: usize,
    pub all_fail_trials: usize,
    /// Larger than the other buckets: this strategy has variance.
    pub random_trials: usize,
    pub max_rounds: u32,
    pub seed: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            all_success_trials: 100,
            all_fail_trials: 100,
            random_trials: 500,
            max_rounds: 100,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncounterPartyConfig {
    pub party: Vec<UnitSpec>,
}

/// Input of the simulation CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    pub adventure_id: String,
    pub encounters: BTreeMap<String, EncounterPartyConfig>,
}

pub fn load_simulation_config(path: &Path) -> anyhow::Result<SimulationConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read simulation config at {}", path.display()))?;
    let parsed: SimulationConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_simulation_config(&parsed)?;
    Ok(parsed)
}

pub fn validate_simulation_config(config: &SimulationConfig) -> anyhow::Result<()> {
    if config.encounters.is_empty() {
        anyhow::bail!("Simulation config lists no encounters");
    }
    for (id, encounter) in &config.encounters {
        if encounter.party.is_empty() {
            anyhow::bail!("Encounter {id} has an empty party");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cli_collaborator_shape() {
        let raw = r#"{
            "adventureId": "meadow",
            "encounters": {
                "meadow-1": { "party": [{ "templateId": "sparky", "level": 3 }] }
            }
        }"#;
        let config: SimulationConfig = serde_json::from_str(raw).expect("valid config");
        assert_eq!(config.adventure_id, "meadow");
        assert_eq!(config.encounters["meadow-1"].party[0].level, 3);
        validate_simulation_config(&config).expect("config is valid");
    }

    #[test]
    fn empty_party_is_rejected() {
        let raw = r#"{ "adventureId": "meadow", "encounters": { "x": { "party": [] } } }"#;
        let config: SimulationConfig = serde_json::from_str(raw).expect("valid json");
        assert!(validate_simulation_config(&config).is_err());
    }

    #[test]
    fn pacing_defaults_fill_missing_fields() {
        let pacing: PacingConfig =
            serde_json::from_str(r#"{ "victoryDelayMs": 10 }"#).expect("valid json");
        assert_eq!(pacing.victory_delay(), Duration::from_millis(10));
        assert_eq!(pacing.round_end_delay_ms, 500);
    }
}
