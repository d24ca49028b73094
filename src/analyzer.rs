use crate::config::{AnalyzerConfig, SimulationConfig};
use crate::model::Unit;
use crate::roster::{build_monsters, build_party};
use crate::simulator::{simulate_battle, UltimateStrategy};
use crate::templates::{LevelScaling, TemplateCatalog};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub strategy: UltimateStrategy,
    pub trials: usize,
    pub wins: usize,
    /// Percentage in `0.0..=100.0`.
    pub win_rate: f64,
    /// Mean turn count over victorious trials only.
    pub avg_turns_on_victory: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterSimulationResults {
    pub encounter_id: String,
    pub all_success: BucketStats,
    pub random: BucketStats,
    pub all_fail: BucketStats,
}

pub struct DifficultyAnalyzer {
    config: AnalyzerConfig,
}

impl DifficultyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Runs `trials` independent battles in parallel under one strategy.
    pub fn run_bucket(
        &self,
        party: &[Unit],
        monsters: &[Unit],
        strategy: UltimateStrategy,
        trials: usize,
        salt: u64,
    ) -> BucketStats {
        let max_rounds = self.config.max_rounds;
        let base = mix_seed(self.config.seed, salt, strategy as u64);
        let victories: Vec<Option<u32>> = (0..trials)
            .into_par_iter()
            .map(|trial| {
                let seed = mix_seed(base, trial as u64, 0);
                let result = simulate_battle(party, monsters, strategy, seed, max_rounds);
                result.victory.then_some(result.turn_count)
            })
            .collect();

        let turns: Vec<u32> = victories.into_iter().flatten().collect();
        let wins = turns.len();
        let win_rate = if trials == 0 {
            0.0
        } else {
            wins as f64 * 100.0 / trials as f64
        };
        let avg_turns_on_victory = if wins == 0 {
            None
        } else {
            Some(turns.iter().map(|&t| t as f64).sum::<f64>() / wins as f64)
        };
        BucketStats {
            strategy,
            trials,
            wins,
            win_rate,
            avg_turns_on_victory,
        }
    }

    pub fn analyze(
        &self,
        encounter_id: &str,
        party: &[Unit],
        monsters: &[Unit],
    ) -> EncounterSimulationResults {
        let salt = encounter_salt(encounter_id);
        tracing::info!(encounter = encounter_id, "simulating encounter");
        EncounterSimulationResults {
            encounter_id: encounter_id.to_string(),
            all_success: self.run_bucket(
                party,
                monsters,
                UltimateStrategy::AllSuccess,
                self.config.all_success_trials,
                salt,
            ),
            random: self.run_bucket(
                party,
                monsters,
                UltimateStrategy::Random,
                self.config.random_trials,
                salt,
            ),
            all_fail: self.run_bucket(
                party,
                monsters,
                UltimateStrategy::AllFail,
                self.config.all_fail_trials,
                salt,
            ),
        }
    }
}

/// Builds each configured encounter from the catalog and analyzes it.
pub fn analyze_adventure(
    catalog: &TemplateCatalog,
    scaling: &dyn LevelScaling,
    simulation: &SimulationConfig,
    analyzer: &DifficultyAnalyzer,
) -> anyhow::Result<Vec<EncounterSimulationResults>> {
    let adventure = catalog
        .adventure(&simulation.adventure_id)
        .ok_or_else(|| anyhow::anyhow!("Unknown adventure {}", simulation.adventure_id))?;
    let mut results = Vec::with_capacity(simulation.encounters.len());
    for (encounter_id, party_config) in &simulation.encounters {
        let (_, definition) = adventure.encounter(encounter_id).ok_or_else(|| {
            anyhow::anyhow!("Encounter {encounter_id} not found in adventure {}", adventure.id)
        })?;
        let party = build_party(catalog, scaling, &party_config.party, 0);
        let monsters = build_monsters(
            catalog,
            scaling,
            &definition.monsters,
            definition.difficulty,
            party.len() as u32,
        );
        if party.is_empty() || monsters.is_empty() {
            anyhow::bail!("Encounter {encounter_id} resolved to an empty side");
        }
        results.push(analyzer.analyze(encounter_id, &party, &monsters));
    }
    Ok(results)
}

fn format_bucket(stats: &BucketStats) -> String {
    let turns = stats
        .avg_turns_on_victory
        .map(|t| format!("{t:.1}"))
        .unwrap_or_else(|| "-".to_string());
    format!("{:>6.1}% ({:>5}) {:>6}", stats.win_rate, stats.trials, turns)
}

pub fn render_report(results: &[EncounterSimulationResults]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} | {:<22} | {:<22} | {:<22}\n",
        "encounter", "all success", "random", "all fail"
    ));
    out.push_str(&format!("{}\n", "-".repeat(95)));
    for row in results {
        out.push_str(&format!(
            "{:<20} | {:<22} | {:<22} | {:<22}\n",
            row.encounter_id,
            format_bucket(&row.all_success),
            format_bucket(&row.random),
            format_bucket(&row.all_fail),
        ));
    }
    out
}

pub fn write_report(
    results: &[EncounterSimulationResults],
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn encounter_salt(encounter_id: &str) -> u64 {
    encounter_id
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

pub(crate) fn mix_seed(base: u64, a: u64, b: u64) -> u64 {
    let mut x = base ^ a.wrapping_mul(0x9E3779B97F4A7C15);
    x ^= b.wrapping_mul(0xC2B2AE3D27D4EB4F);
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51afd7ed558ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ceb9fe1a85ec53);
    x ^ (x >> 33)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_seed_spreads_neighbouring_inputs() {
        assert_ne!(mix_seed(0, 1, 0), mix_seed(0, 2, 0));
        assert_ne!(mix_seed(0, 1, 0), mix_seed(0, 1, 1));
        assert_eq!(mix_seed(7, 3, 2), mix_seed(7, 3, 2));
    }

    #[test]
    fn salt_is_stable_per_encounter() {
        assert_eq!(encounter_salt("meadow-1"), encounter_salt("meadow-1"));
        assert_ne!(encounter_salt("meadow-1"), encounter_salt("meadow-2"));
    }
}
