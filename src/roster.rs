use crate::model::{Side, Unit, UnitId, FULL_SPIRIT};
use crate::templates::{Difficulty, LevelScaling, TemplateProvider, UnitSpec, UnitTemplate};

fn scaled(value: u32, multiplier: f64) -> u32 {
    (value as f64 * multiplier).round() as u32
}

pub fn instantiate(
    template: &UnitTemplate,
    level: u32,
    id: UnitId,
    side: Side,
    scaling: &dyn LevelScaling,
) -> Unit {
    let stats = scaling.stats_for_level(template, level);
    let scaled_value = stats.special_ability.value;
    Unit {
        id,
        template_id: template.id.clone(),
        name: template.name_at_level(level).to_string(),
        side,
        level,
        max_health: stats.max_health,
        current_health: stats.max_health,
        max_shield: template.base_stats.shield,
        current_shield: template.base_stats.shield,
        damage: stats.ability_damage,
        special_ability: stats.special_ability,
        scaled_ability_value: Some(scaled_value),
        current_spirit: 0,
        max_spirit: FULL_SPIRIT,
        spirit_gain: stats.spirit_gain,
        has_acted: false,
        status_effects: Vec::new(),
    }
}

/// Builds the party. Unknown template ids are skipped with a warning.
pub fn build_party(
    provider: &dyn TemplateProvider,
    scaling: &dyn LevelScaling,
    members: &[UnitSpec],
    first_id: u32,
) -> Vec<Unit> {
    let mut next_id = first_id;
    let mut party = Vec::with_capacity(members.len());
    for spec in members {
        let Some(template) = provider.companion(&spec.template_id) else {
            tracing::warn!(template = %spec.template_id, "unknown companion template; skipping");
            continue;
        };
        party.push(instantiate(template, spec.level, UnitId(next_id), Side::Player, scaling));
        next_id += 1;
    }
    party
}

/// Builds the opposing side with difficulty scaling on health and damage.
pub fn build_monsters(
    provider: &dyn TemplateProvider,
    scaling: &dyn LevelScaling,
    specs: &[UnitSpec],
    difficulty: Difficulty,
    first_id: u32,
) -> Vec<Unit> {
    let multiplier = difficulty.monster_multiplier();
    let mut next_id = first_id;
    let mut monsters = Vec::with_capacity(specs.len());
    for spec in specs {
        let Some(template) = provider.monster(&spec.template_id) else {
            tracing::warn!(template = %spec.template_id, "unknown monster template; skipping");
            continue;
        };
        let mut unit = instantiate(template, spec.level, UnitId(next_id), Side::Opponent, scaling);
        unit.max_health = scaled(unit.max_health, multiplier).max(1);
        unit.current_health = unit.max_health;
        unit.damage = scaled(unit.damage, multiplier);
        monsters.push(unit);
        next_id += 1;
    }
    monsters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{builtin_catalog, GrowthCurve};

    fn spec(id: &str, level: u32) -> UnitSpec {
        UnitSpec {
            template_id: id.to_string(),
            level,
        }
    }

    #[test]
    fn unknown_templates_are_dropped() {
        let party = build_party(
            builtin_catalog(),
            &GrowthCurve::default(),
            &[spec("sparky", 1), spec("missingno", 3), spec("bubbles", 1)],
            0,
        );
        assert_eq!(party.len(), 2);
        assert_eq!(party[0].id, UnitId(0));
        assert_eq!(party[1].id, UnitId(1));
        assert_eq!(party[1].template_id, "bubbles");
    }

    #[test]
    fn hard_monsters_are_tougher() {
        let specs = [spec("goblin", 1)];
        let curve = GrowthCurve::default();
        let normal = build_monsters(builtin_catalog(), &curve, &specs, Difficulty::Normal, 10);
        let hard = build_monsters(builtin_catalog(), &curve, &specs, Difficulty::Hard, 10);
        assert_eq!(normal[0].max_health, 55);
        assert!(hard[0].max_health > normal[0].max_health);
        assert!(hard[0].damage > normal[0].damage);
        assert_eq!(hard[0].side, Side::Opponent);
    }
}
