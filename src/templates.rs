use crate::model::AbilityDescriptor;
use anyhow::Context;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseStats {
    pub max_health: u32,
    pub damage: u32,
    #[serde(default)]
    pub spirit_gain: u32,
    #[serde(default)]
    pub shield: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Evolution {
    pub level: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitTemplate {
    pub id: String,
    pub name: String,
    pub base_stats: BaseStats,
    pub special_ability: AbilityDescriptor,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
}

impl UnitTemplate {
    /// Display name for `level`: the last evolution reached, else the base name.
    pub fn name_at_level(&self, level: u32) -> &str {
        self.evolutions
            .iter()
            .filter(|evo| evo.level <= level)
            .max_by_key(|evo| evo.level)
            .map(|evo| evo.name.as_str())
            .unwrap_or(&self.name)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to monster health and damage.
    pub fn monster_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSpec {
    pub template_id: String,
    #[serde(default = "default_level")]
    pub level: u32,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterDefinition {
    pub id: String,
    pub monsters: Vec<UnitSpec>,
    #[serde(default)]
    pub xp_reward: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Adventure {
    pub id: String,
    pub encounters: Vec<EncounterDefinition>,
}

impl Adventure {
    pub fn encounter(&self, id: &str) -> Option<(usize, &EncounterDefinition)> {
        self.encounters
            .iter()
            .enumerate()
            .find(|(_, enc)| enc.id == id)
    }
}

/// Read-only companion/monster lookup.
pub trait TemplateProvider {
    fn companion(&self, id: &str) -> Option<&UnitTemplate>;
    fn monster(&self, id: &str) -> Option<&UnitTemplate>;
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    companions: Vec<UnitTemplate>,
    #[serde(default)]
    monsters: Vec<UnitTemplate>,
    #[serde(default)]
    adventures: Vec<Adventure>,
}

#[derive(Debug, Default)]
pub struct TemplateCatalog {
    companions: HashMap<String, UnitTemplate>,
    monsters: HashMap<String, UnitTemplate>,
    adventures: HashMap<String, Adventure>,
}

impl TemplateCatalog {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw).context("Failed to parse catalog JSON")?;
        Ok(Self {
            companions: file
                .companions
                .into_iter()
                .map(|t| (t.id.clone(), t))
                .collect(),
            monsters: file.monsters.into_iter().map(|t| (t.id.clone(), t)).collect(),
            adventures: file
                .adventures
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect(),
        })
    }

    pub fn adventure(&self, id: &str) -> Option<&Adventure> {
        self.adventures.get(id)
    }
}

impl TemplateProvider for TemplateCatalog {
    fn companion(&self, id: &str) -> Option<&UnitTemplate> {
        self.companions.get(id)
    }

    fn monster(&self, id: &str) -> Option<&UnitTemplate> {
        self.monsters.get(id)
    }
}

pub fn load_catalog(path: &Path) -> anyhow::Result<TemplateCatalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog at {}", path.display()))?;
    TemplateCatalog::from_json(&raw).with_context(|| format!("Invalid catalog {}", path.display()))
}

static BUILTIN_CATALOG: Lazy<TemplateCatalog> = Lazy::new(|| {
    let json_str = include_str!("../data/catalog.json");
    TemplateCatalog::from_json(json_str).expect("Failed to parse data/catalog.json")
});

/// Catalog bundled with the crate.
pub fn builtin_catalog() -> &'static TemplateCatalog {
    &BUILTIN_CATALOG
}

/// Level-derived stats consumed when instantiating a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelStats {
    pub max_health: u32,
    pub ability_damage: u32,
    pub special_ability: AbilityDescriptor,
    pub spirit_gain: u32,
}

pub trait LevelScaling {
    fn stats_for_level(&self, template: &UnitTemplate, level: u32) -> LevelStats;
}

/// Percentage growth per level above 1.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GrowthCurve {
    pub health_per_level: f64,
    pub damage_per_level: f64,
    pub ability_per_level: f64,
    /// Levels needed for +1 spirit gain.
    pub spirit_step: u32,
}

impl Default for GrowthCurve {
    fn default() -> Self {
        Self {
            health_per_level: 0.08,
            damage_per_level: 0.06,
            ability_per_level: 0.06,
            spirit_step: 5,
        }
    }
}

fn grow(base: u32, rate: f64, level: u32) -> u32 {
    let steps = level.saturating_sub(1) as f64;
    (base as f64 * (1.0 + rate * steps)).round() as u32
}

impl LevelScaling for GrowthCurve {
    fn stats_for_level(&self, template: &UnitTemplate, level: u32) -> LevelStats {
        let base = &template.base_stats;
        let mut special_ability = template.special_ability.clone();
        special_ability.value = grow(special_ability.value, self.ability_per_level, level);
        let spirit_bonus = if self.spirit_step == 0 {
            0
        } else {
            level.saturating_sub(1) / self.spirit_step
        };
        LevelStats {
            max_health: grow(base.max_health, self.health_per_level, level).max(1),
            ability_damage: grow(base.damage, self.damage_per_level, level),
            special_ability,
            spirit_gain: base.spirit_gain + spirit_bonus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_companions_and_monsters() {
        let catalog = builtin_catalog();
        assert!(catalog.companion("sparky").is_some());
        assert!(catalog.monster("slime").is_some());
        assert!(catalog.adventure("meadow").is_some());
    }

    #[test]
    fn evolutions_pick_the_highest_reached() {
        let template = builtin_catalog().companion("sparky").expect("template exists");
        assert_eq!(template.name_at_level(1), "Sparky");
        assert_eq!(template.name_at_level(10), "Voltfox");
        assert_eq!(template.name_at_level(30), "Stormfox");
    }

    #[test]
    fn growth_curve_is_identity_at_level_one() {
        let template = builtin_catalog().companion("sparky").expect("template exists");
        let stats = GrowthCurve::default().stats_for_level(template, 1);
        assert_eq!(stats.max_health, template.base_stats.max_health);
        assert_eq!(stats.ability_damage, template.base_stats.damage);
        assert_eq!(stats.special_ability.value, template.special_ability.value);
    }

    #[test]
    fn growth_curve_scales_with_level() {
        let template = builtin_catalog().companion("sparky").expect("template exists");
        let low = GrowthCurve::default().stats_for_level(template, 1);
        let high = GrowthCurve::default().stats_for_level(template, 11);
        assert!(high.max_health > low.max_health);
        assert!(high.ability_damage > low.ability_damage);
        assert_eq!(high.spirit_gain, low.spirit_gain + 2);
    }
}
