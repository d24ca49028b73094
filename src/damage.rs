use crate::model::Unit;
use crate::status::{apply_damage_modifiers, MARKED};

/// Multiplier applied to standard hits against a marked target.
pub const MARKED_MULTIPLIER: f64 = 1.25;

pub fn target_damage_multiplier(target: &Unit) -> f64 {
    if target.has_effect(MARKED) {
        MARKED_MULTIPLIER
    } else {
        1.0
    }
}

/// Scales a unit's base damage, rounding to the nearest whole point.
pub fn scaled_damage(base: u32, multiplier: f64) -> u32 {
    (base as f64 * multiplier).round().max(0.0) as u32
}

/// Runs `raw_amount` through the unit's status modifiers, then the shield
/// pool, then health. Returns the updated unit and the health actually lost.
pub fn apply_damage(unit: &Unit, raw_amount: u32) -> (Unit, u32) {
    let effective = apply_damage_modifiers(raw_amount as f64, &unit.status_effects)
        .round()
        .max(0.0) as u32;

    let mut next = unit.clone();
    let absorbed = effective.min(next.current_shield);
    next.current_shield -= absorbed;
    let overflow = effective - absorbed;

    let dealt = overflow.min(next.current_health);
    next.current_health -= dealt;
    (next, dealt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbilityDescriptor, AbilityType, Side, TargetPolicy, UnitId};
    use crate::status::StatusEffect;

    fn target(health: u32) -> Unit {
        Unit::new(
            UnitId(7),
            "Grumble",
            Side::Opponent,
            health,
            4,
            AbilityDescriptor::new("stomp", AbilityType::Damage, 5, TargetPolicy::SingleEnemy),
        )
    }

    #[test]
    fn shield_pool_absorbs_before_health() {
        let mut t = target(50);
        t.current_shield = 15;
        let (after, dealt) = apply_damage(&t, 20);
        assert_eq!(after.current_shield, 0);
        assert_eq!(after.current_health, 45);
        assert_eq!(dealt, 5);
    }

    #[test]
    fn status_reduction_runs_before_shield_pool() {
        let mut t = target(50);
        t.current_shield = 8;
        t.status_effects.push(StatusEffect::shield(50.0, 3));
        let (after, dealt) = apply_damage(&t, 20);
        assert_eq!(after.current_shield, 0);
        assert_eq!(after.current_health, 48);
        assert_eq!(dealt, 2);
    }

    #[test]
    fn marked_target_takes_extra_damage() {
        let mut t = target(50);
        assert_eq!(target_damage_multiplier(&t), 1.0);
        t.status_effects.push(StatusEffect::marked(2));
        assert_eq!(scaled_damage(10, target_damage_multiplier(&t)), 13);
    }
}
