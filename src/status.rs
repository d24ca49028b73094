//! Status effect registry.
//!
//! Effects are stored on a unit as an id plus a numeric state bag. The id is
//! resolved through a static table to an [`EffectKind`], whose hooks drive the
//! damage-modifier and tick pipelines. Ids missing from the table resolve to
//! [`EffectKind::Unknown`], which is inert and expires at the next tick.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SHIELD: &str = "SHIELD";
pub const MARKED: &str = "MARKED";

pub const DURATION: &str = "duration";
pub const REDUCTION: &str = "reduction";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuiltinEffect {
    Shield,
    Marked,
}

static EFFECT_TABLE: phf::Map<&'static str, BuiltinEffect> = phf::phf_map! {
    "SHIELD" => BuiltinEffect::Shield,
    "MARKED" => BuiltinEffect::Marked,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EffectKind {
    /// Percentage damage reduction for `duration` turns.
    Shield,
    /// Tag read by the standard-attack multiplier.
    Marked,
    Unknown(String),
}

impl EffectKind {
    pub fn from_id(id: &str) -> Self {
        match EFFECT_TABLE.get(id) {
            Some(BuiltinEffect::Shield) => EffectKind::Shield,
            Some(BuiltinEffect::Marked) => EffectKind::Marked,
            None => EffectKind::Unknown(id.to_string()),
        }
    }

    pub fn on_damage_received(&self, damage: f64, state: &EffectState) -> f64 {
        match self {
            EffectKind::Shield => {
                let reduction = state.get(REDUCTION).copied().unwrap_or(0.0).clamp(0.0, 100.0);
                damage * (100.0 - reduction) / 100.0
            }
            EffectKind::Marked | EffectKind::Unknown(_) => damage,
        }
    }

    pub fn on_tick(&self, state: &EffectState) -> EffectState {
        match self {
            EffectKind::Shield | EffectKind::Marked => {
                let mut next = state.clone();
                *next.entry(DURATION.to_string()).or_insert(0.0) -= 1.0;
                next
            }
            EffectKind::Unknown(_) => state.clone(),
        }
    }

    pub fn is_expired(&self, state: &EffectState) -> bool {
        match self {
            EffectKind::Shield | EffectKind::Marked => {
                state.get(DURATION).copied().unwrap_or(0.0) <= 0.0
            }
            EffectKind::Unknown(id) => {
                tracing::warn!(effect = %id, "unknown status effect; dropping it");
                true
            }
        }
    }
}

pub type EffectState = BTreeMap<String, f64>;

/// An active effect instance attached to a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: String,
    #[serde(default)]
    pub state: EffectState,
}

impl StatusEffect {
    pub fn new(id: impl Into<String>, state: EffectState) -> Self {
        Self {
            id: id.into(),
            state,
        }
    }

    /// Percentage damage reduction lasting `duration` ticks.
    pub fn shield(reduction: f64, duration: u32) -> Self {
        let mut state = EffectState::new();
        state.insert(REDUCTION.to_string(), reduction);
        state.insert(DURATION.to_string(), duration as f64);
        Self::new(SHIELD, state)
    }

    pub fn marked(duration: u32) -> Self {
        let mut state = EffectState::new();
        state.insert(DURATION.to_string(), duration as f64);
        Self::new(MARKED, state)
    }

    pub fn kind(&self) -> EffectKind {
        EffectKind::from_id(&self.id)
    }
}

/// Folds every effect's damage hook over `damage`, in list order.
pub fn apply_damage_modifiers(damage: f64, effects: &[StatusEffect]) -> f64 {
    effects
        .iter()
        .fold(damage, |acc, effect| effect.kind().on_damage_received(acc, &effect.state))
}

/// Ticks every effect, then drops the ones that report expiry.
pub fn process_effect_tick(effects: &[StatusEffect]) -> Vec<StatusEffect> {
    effects
        .iter()
        .map(|effect| StatusEffect {
            id: effect.id.clone(),
            state: effect.kind().on_tick(&effect.state),
        })
        .filter(|effect| !effect.kind().is_expired(&effect.state))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shield_halves_incoming_damage() {
        let effects = vec![StatusEffect::shield(50.0, 2)];
        assert_eq!(apply_damage_modifiers(20.0, &effects), 10.0);
    }

    #[test]
    fn modifiers_chain_in_list_order() {
        let effects = vec![StatusEffect::shield(50.0, 2), StatusEffect::shield(50.0, 2)];
        assert_eq!(apply_damage_modifiers(40.0, &effects), 10.0);
    }

    #[test]
    fn tick_decrements_and_expires() {
        let effects = vec![StatusEffect::shield(25.0, 2), StatusEffect::marked(1)];
        let after_one = process_effect_tick(&effects);
        assert_eq!(after_one.len(), 1);
        assert_eq!(after_one[0].id, SHIELD);
        assert_eq!(after_one[0].state[DURATION], 1.0);
        assert!(process_effect_tick(&after_one).is_empty());
    }

    #[test]
    fn unknown_effect_is_inert_and_dropped() {
        let odd = StatusEffect::new("GLITTER", EffectState::new());
        assert_eq!(odd.kind(), EffectKind::Unknown("GLITTER".to_string()));
        assert_eq!(apply_damage_modifiers(12.0, &[odd.clone()]), 12.0);
        assert!(process_effect_tick(&[odd]).is_empty());
    }
}
