//! Combat engine: stateless functions over unit rosters.
//!
//! Every function takes the current roster by reference and returns the
//! next roster together with the log lines it produced. Shared by the live
//! encounter controller and the headless simulator.

use crate::ability::{
    resolve_all, resolve_first, resolve_lowest, resolve_random_hits, Hit, Primitive, Resolution,
};
use crate::combat_log::CombatLog;
use crate::damage::{apply_damage, scaled_damage, target_damage_multiplier};
use crate::model::{AbilityDescriptor, AbilityType, TargetPolicy, Unit};
use crate::status::process_effect_tick;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Clone, Debug)]
pub struct CombatOutcome {
    pub units: Vec<Unit>,
    pub log: CombatLog,
}

impl CombatOutcome {
    fn unchanged(units: &[Unit]) -> Self {
        Self {
            units: units.to_vec(),
            log: CombatLog::new(),
        }
    }
}

/// First living unit on the attacker's opposing side, excluding the attacker.
pub fn find_first_valid_enemy(attacker: &Unit, units: &[Unit]) -> Option<usize> {
    units
        .iter()
        .position(|u| u.is_alive() && u.id != attacker.id && u.side != attacker.side)
}

/// Uniformly random living unit from `units`.
pub fn select_random_target<R: Rng + ?Sized>(units: &[Unit], rng: &mut R) -> Option<usize> {
    let living: Vec<usize> = units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.is_alive())
        .map(|(idx, _)| idx)
        .collect();
    living.choose(rng).copied()
}

fn strike(attacker: &Unit, units: &[Unit], target_idx: usize) -> CombatOutcome {
    let mut out = CombatOutcome::unchanged(units);
    let target = &units[target_idx];
    let amount = scaled_damage(attacker.damage, target_damage_multiplier(target));
    let (next, dealt) = apply_damage(target, amount);
    out.log.log_attack(&attacker.name, &next.name, dealt);
    out.units[target_idx] = next;
    out
}

pub fn execute_standard_attack(attacker: &Unit, units: &[Unit]) -> CombatOutcome {
    match find_first_valid_enemy(attacker, units) {
        Some(idx) => strike(attacker, units, idx),
        None => {
            tracing::debug!(attacker = %attacker.name, "standard attack found no target");
            CombatOutcome::unchanged(units)
        }
    }
}

/// Resolves `ability` for `caster` with the already-scaled `value`.
///
/// Offensive types accept enemy policies and supportive types accept ally
/// policies; anything else resolves to no effect.
pub fn execute_special_ability<R: Rng + ?Sized>(
    caster: &Unit,
    units: &[Unit],
    ability: &AbilityDescriptor,
    value: u32,
    rng: &mut R,
) -> CombatOutcome {
    let enemies = caster.side.opponent();
    let allies = caster.side;
    let effect = ability.effect.as_ref();

    let resolution: Resolution<Unit> = match (ability.ability_type, ability.target) {
        (AbilityType::Damage | AbilityType::MultiHit, TargetPolicy::RandomEnemy { hits }) => {
            resolve_random_hits(units, enemies, value, hits, effect, rng).resolution
        }
        (AbilityType::Damage | AbilityType::MultiHit, TargetPolicy::AllEnemies) => {
            resolve_all(units, enemies, Primitive::Damage, value, effect)
        }
        (AbilityType::Damage | AbilityType::MultiHit, TargetPolicy::SingleEnemy) => {
            resolve_first(units, enemies, Primitive::Damage, value, effect)
        }
        (AbilityType::Heal, TargetPolicy::AllAllies) => {
            resolve_all(units, allies, Primitive::Heal, value, effect)
        }
        (AbilityType::Heal, TargetPolicy::SingleAlly) => {
            resolve_lowest(units, allies, Primitive::Heal, value, effect)
        }
        (AbilityType::Shield, TargetPolicy::AllAllies) => {
            resolve_all(units, allies, Primitive::Shield, value, effect)
        }
        (AbilityType::Shield, TargetPolicy::SingleAlly) => {
            resolve_lowest(units, allies, Primitive::Shield, value, effect)
        }
        (AbilityType::Unknown, _) => {
            tracing::warn!(
                ability = %ability.id,
                caster = %caster.name,
                "unknown ability type; no effect"
            );
            return CombatOutcome::unchanged(units);
        }
        (kind, policy) => {
            tracing::warn!(
                ability = %ability.id,
                ?kind,
                ?policy,
                "ability type does not support this target policy; no effect"
            );
            return CombatOutcome::unchanged(units);
        }
    };

    let mut log = CombatLog::new();
    log.log_ability(&caster.name, &ability.id);
    for hit in per_unit(&resolution.hits) {
        log.log_hit(&hit);
    }
    CombatOutcome {
        units: resolution.units,
        log,
    }
}

/// Sums repeated hits on the same unit, keeping first-hit order.
fn per_unit(hits: &[Hit]) -> Vec<Hit> {
    let mut merged: Vec<Hit> = Vec::with_capacity(hits.len());
    for hit in hits {
        match merged.iter_mut().find(|m| m.index == hit.index) {
            Some(existing) => existing.amount += hit.amount,
            None => merged.push(hit.clone()),
        }
    }
    merged
}

/// A monster hits a random living party member. Returns the updated party.
pub fn process_monster_action<R: Rng + ?Sized>(
    attacker: &Unit,
    party: &[Unit],
    rng: &mut R,
) -> CombatOutcome {
    match select_random_target(party, rng) {
        Some(idx) => strike(attacker, party, idx),
        None => CombatOutcome::unchanged(party),
    }
}

pub fn regenerate_spirit(units: &[Unit]) -> Vec<Unit> {
    units
        .iter()
        .map(|u| {
            let mut next = u.clone();
            if next.is_alive() {
                next.current_spirit = next
                    .current_spirit
                    .saturating_add(next.spirit_gain)
                    .min(next.max_spirit);
            }
            next
        })
        .collect()
}

/// Drains the gauge; applies to both successful and failed attempts.
pub fn consume_spirit_cost(unit: &Unit) -> Unit {
    let mut next = unit.clone();
    next.current_spirit = 0;
    next
}

pub fn tick_status_effects(units: &[Unit]) -> Vec<Unit> {
    units
        .iter()
        .map(|u| {
            let mut next = u.clone();
            next.status_effects = process_effect_tick(&u.status_effects);
            next
        })
        .collect()
}

pub fn all_dead(units: &[Unit]) -> bool {
    units.iter().all(|u| u.is_dead())
}
