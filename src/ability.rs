//! Target-policy resolution layered over the damage, heal and shield
//! primitives.
//!
//! Resolvers take the whole roster plus the side they act on. Units on the
//! other side, and dead units on the acting side, pass through unchanged and
//! keep their original positions.

use crate::model::{Combatant, Side};
use crate::status::StatusEffect;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Primitive {
    Damage,
    Heal,
    Shield,
}

/// One landed application of a primitive on one unit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hit {
    pub index: usize,
    pub target: String,
    pub primitive: Primitive,
    /// Health lost, health restored or shield added.
    pub amount: u32,
}

#[derive(Clone, Debug)]
pub struct Resolution<U> {
    pub units: Vec<U>,
    pub hits: Vec<Hit>,
}

impl<U: Combatant> Resolution<U> {
    fn unchanged(units: &[U]) -> Self {
        Self {
            units: units.to_vec(),
            hits: Vec::new(),
        }
    }
}

fn apply_primitive<U: Combatant>(unit: &U, primitive: Primitive, value: u32) -> (U, u32) {
    match primitive {
        Primitive::Damage => unit.take_damage(value),
        Primitive::Heal => unit.heal(value),
        Primitive::Shield => unit.grant_shield(value),
    }
}

fn land<U: Combatant>(
    units: &mut [U],
    hits: &mut Vec<Hit>,
    index: usize,
    primitive: Primitive,
    value: u32,
    effect: Option<&StatusEffect>,
) {
    let (mut next, amount) = apply_primitive(&units[index], primitive, value);
    if let Some(effect) = effect {
        if !next.is_dead() {
            next = next.with_effect(effect.clone());
        }
    }
    hits.push(Hit {
        index,
        target: next.name().to_string(),
        primitive,
        amount,
    });
    units[index] = next;
}

fn living_indices<U: Combatant>(units: &[U], side: Side) -> Vec<usize> {
    units
        .iter()
        .enumerate()
        .filter(|(_, u)| u.side() == side && !u.is_dead())
        .map(|(idx, _)| idx)
        .collect()
}

/// First living unit of `side`, in roster order.
pub fn first_living<U: Combatant>(units: &[U], side: Side) -> Option<usize> {
    units
        .iter()
        .position(|u| u.side() == side && !u.is_dead())
}

/// Living unit of `side` with the lowest health; earliest wins ties.
pub fn lowest_health_living<U: Combatant>(units: &[U], side: Side) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for idx in living_indices(units, side) {
        let hp = units[idx].current_health();
        match best {
            Some((_, lowest)) if hp >= lowest => {}
            _ => best = Some((idx, hp)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Applies the primitive to every living unit of `side`.
pub fn resolve_all<U: Combatant>(
    units: &[U],
    side: Side,
    primitive: Primitive,
    value: u32,
    effect: Option<&StatusEffect>,
) -> Resolution<U> {
    let mut out = Resolution::unchanged(units);
    for idx in living_indices(units, side) {
        land(&mut out.units, &mut out.hits, idx, primitive, value, effect);
    }
    out
}

/// Applies the primitive to the first living unit of `side`.
pub fn resolve_first<U: Combatant>(
    units: &[U],
    side: Side,
    primitive: Primitive,
    value: u32,
    effect: Option<&StatusEffect>,
) -> Resolution<U> {
    let mut out = Resolution::unchanged(units);
    if let Some(idx) = first_living(units, side) {
        land(&mut out.units, &mut out.hits, idx, primitive, value, effect);
    }
    out
}

/// Applies the primitive to the lowest-health living unit of `side`.
pub fn resolve_lowest<U: Combatant>(
    units: &[U],
    side: Side,
    primitive: Primitive,
    value: u32,
    effect: Option<&StatusEffect>,
) -> Resolution<U> {
    let mut out = Resolution::unchanged(units);
    if let Some(idx) = lowest_health_living(units, side) {
        land(&mut out.units, &mut out.hits, idx, primitive, value, effect);
    }
    out
}

#[derive(Clone, Debug)]
pub struct MultiHit<U> {
    pub resolution: Resolution<U>,
    pub hits_landed: u32,
    /// Per-hit value times landed hits.
    pub total_damage: u32,
}

/// `count` hits of `per_hit` damage, each on a uniformly random living unit
/// of `side`. The candidate set is rebuilt before every hit so a unit killed
/// mid-sequence is not hit again.
pub fn resolve_random_hits<U: Combatant, R: Rng + ?Sized>(
    units: &[U],
    side: Side,
    per_hit: u32,
    count: u32,
    effect: Option<&StatusEffect>,
    rng: &mut R,
) -> MultiHit<U> {
    let mut resolution = Resolution::unchanged(units);
    let mut hits_landed = 0u32;
    for _ in 0..count {
        let candidates = living_indices(&resolution.units, side);
        let Some(&idx) = candidates.choose(rng) else {
            break;
        };
        land(
            &mut resolution.units,
            &mut resolution.hits,
            idx,
            Primitive::Damage,
            per_hit,
            effect,
        );
        hits_landed += 1;
    }
    MultiHit {
        resolution,
        hits_landed,
        total_damage: per_hit.saturating_mul(hits_landed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AbilityDescriptor, AbilityType, TargetPolicy, Unit, UnitId};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn unit(id: u32, side: Side, health: u32) -> Unit {
        let mut u = Unit::new(
            UnitId(id),
            format!("u{id}"),
            side,
            50,
            10,
            AbilityDescriptor::new("poke", AbilityType::Damage, 5, TargetPolicy::SingleEnemy),
        );
        u.current_health = health;
        u
    }

    #[test]
    fn lowest_health_prefers_first_on_ties() {
        let units = vec![
            unit(0, Side::Player, 30),
            unit(1, Side::Player, 12),
            unit(2, Side::Player, 12),
            unit(3, Side::Player, 0),
            unit(4, Side::Opponent, 1),
        ];
        assert_eq!(lowest_health_living(&units, Side::Player), Some(1));
    }

    #[test]
    fn first_living_skips_dead_and_other_side() {
        let units = vec![
            unit(0, Side::Player, 30),
            unit(1, Side::Opponent, 0),
            unit(2, Side::Opponent, 9),
        ];
        assert_eq!(first_living(&units, Side::Opponent), Some(2));
        assert_eq!(first_living(&units[..2], Side::Opponent), None);
    }

    #[test]
    fn random_hits_never_target_the_dead() {
        let units = vec![
            unit(0, Side::Opponent, 5),
            unit(1, Side::Opponent, 0),
            unit(2, Side::Opponent, 40),
        ];
        let mut rng = SmallRng::seed_from_u64(3);
        let out = resolve_random_hits(&units, Side::Opponent, 6, 4, None, &mut rng);
        assert_eq!(out.hits_landed, 4);
        assert_eq!(out.total_damage, 24);
        assert!(out.resolution.hits.iter().all(|h| h.index != 1));
        let hits_on_first = out.resolution.hits.iter().filter(|h| h.index == 0).count();
        assert!(hits_on_first <= 1, "unit 0 dies on its first hit");
    }

    #[test]
    fn random_hits_stop_when_nobody_is_left() {
        let units = vec![unit(0, Side::Opponent, 3)];
        let mut rng = SmallRng::seed_from_u64(9);
        let out = resolve_random_hits(&units, Side::Opponent, 6, 5, None, &mut rng);
        assert_eq!(out.hits_landed, 1);
        assert!(out.resolution.units[0].is_dead());
    }
}
