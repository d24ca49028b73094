use crate::status::StatusEffect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gauge value at which a special ability becomes available.
pub const FULL_SPIRIT: u32 = 100;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityType {
    Damage,
    Heal,
    Shield,
    MultiHit,
    #[serde(other)]
    Unknown,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetPolicy {
    AllEnemies,
    SingleEnemy,
    AllAllies,
    SingleAlly,
    RandomEnemy { hits: u32 },
}

impl TargetPolicy {
    pub fn targets_enemies(self) -> bool {
        matches!(
            self,
            TargetPolicy::AllEnemies | TargetPolicy::SingleEnemy | TargetPolicy::RandomEnemy { .. }
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub ability_type: AbilityType,
    pub value: u32,
    pub target: TargetPolicy,
    /// Status effect attached to every unit the ability lands on.
    #[serde(default)]
    pub effect: Option<StatusEffect>,
}

impl AbilityDescriptor {
    pub fn new(
        id: impl Into<String>,
        ability_type: AbilityType,
        value: u32,
        target: TargetPolicy,
    ) -> Self {
        Self {
            id: id.into(),
            ability_type,
            value,
            target,
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// A single combatant in an encounter.
///
/// Every mutating helper returns a new value; callers swap it into their
/// roster. `current_health` stays within `0..=max_health`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub template_id: String,
    pub name: String,
    pub side: Side,
    pub level: u32,
    pub max_health: u32,
    pub current_health: u32,
    pub max_shield: u32,
    pub current_shield: u32,
    pub damage: u32,
    pub special_ability: AbilityDescriptor,
    /// Level-derived override for `special_ability.value`.
    pub scaled_ability_value: Option<u32>,
    pub current_spirit: u32,
    pub max_spirit: u32,
    pub spirit_gain: u32,
    pub has_acted: bool,
    pub status_effects: Vec<StatusEffect>,
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        side: Side,
        max_health: u32,
        damage: u32,
        special_ability: AbilityDescriptor,
    ) -> Self {
        let name = name.into();
        Self {
            id,
            template_id: name.to_ascii_lowercase(),
            name,
            side,
            level: 1,
            max_health,
            current_health: max_health,
            max_shield: 0,
            current_shield: 0,
            damage,
            special_ability,
            scaled_ability_value: None,
            current_spirit: 0,
            max_spirit: FULL_SPIRIT,
            spirit_gain: 0,
            has_acted: false,
            status_effects: Vec::new(),
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current_health == 0
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    pub fn has_full_spirit(&self) -> bool {
        self.current_spirit >= FULL_SPIRIT
    }

    /// Ability value after level scaling, falling back to the base value.
    pub fn ability_value(&self) -> u32 {
        self.scaled_ability_value.unwrap_or(self.special_ability.value)
    }

    pub fn has_effect(&self, effect_id: &str) -> bool {
        self.status_effects.iter().any(|e| e.id == effect_id)
    }
}

/// Structural capability the ability resolvers and engine need from a unit.
pub trait Combatant: Clone {
    fn name(&self) -> &str;
    fn side(&self) -> Side;
    fn current_health(&self) -> u32;
    fn is_dead(&self) -> bool;
    /// Runs the damage pipeline; returns the updated unit and health lost.
    fn take_damage(&self, amount: u32) -> (Self, u32);
    /// Returns the updated unit and the health actually restored.
    fn heal(&self, amount: u32) -> (Self, u32);
    /// Returns the updated unit and the shield actually added.
    fn grant_shield(&self, amount: u32) -> (Self, u32);
    fn with_effect(&self, effect: StatusEffect) -> Self;
}

impl Combatant for Unit {
    fn name(&self) -> &str {
        &self.name
    }

    fn side(&self) -> Side {
        self.side
    }

    fn current_health(&self) -> u32 {
        self.current_health
    }

    fn is_dead(&self) -> bool {
        Unit::is_dead(self)
    }

    fn take_damage(&self, amount: u32) -> (Self, u32) {
        crate::damage::apply_damage(self, amount)
    }

    fn heal(&self, amount: u32) -> (Self, u32) {
        let mut next = self.clone();
        next.current_health = self
            .current_health
            .saturating_add(amount)
            .min(self.max_health);
        let healed = next.current_health - self.current_health;
        (next, healed)
    }

    fn grant_shield(&self, amount: u32) -> (Self, u32) {
        let mut next = self.clone();
        next.current_shield = self.current_shield.saturating_add(amount);
        next.max_shield = next.max_shield.max(next.current_shield);
        let gained = next.current_shield - self.current_shield;
        (next, gained)
    }

    fn with_effect(&self, effect: StatusEffect) -> Self {
        let mut next = self.clone();
        next.status_effects.push(effect);
        next
    }
}
