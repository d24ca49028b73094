//! Headless battle simulator: the encounter's round logic with no pacing.

use crate::engine::{
    all_dead, consume_spirit_cost, execute_special_ability, execute_standard_attack,
    process_monster_action, regenerate_spirit, tick_status_effects,
};
use crate::model::{Side, Unit};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Whether a simulated special-ability attempt succeeds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UltimateStrategy {
    AllSuccess,
    AllFail,
    Random,
}

impl UltimateStrategy {
    fn attempt_succeeds(self, rng: &mut SmallRng) -> bool {
        match self {
            UltimateStrategy::AllSuccess => true,
            UltimateStrategy::AllFail => false,
            UltimateStrategy::Random => rng.gen_bool(0.5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub victory: bool,
    pub turn_count: u32,
    pub final_party_health: u32,
    pub final_monster_health: u32,
}

pub struct BattleSimulator {
    units: Vec<Unit>,
    strategy: UltimateStrategy,
    rng: SmallRng,
    turn_count: u32,
}

impl BattleSimulator {
    pub fn new(party: &[Unit], monsters: &[Unit], strategy: UltimateStrategy, seed: u64) -> Self {
        let units = party
            .iter()
            .chain(monsters.iter())
            .cloned()
            .map(|mut u| {
                u.has_acted = false;
                u
            })
            .collect();
        Self {
            units,
            strategy,
            rng: SmallRng::seed_from_u64(seed),
            turn_count: 0,
        }
    }

    fn side_indices(&self, side: Side) -> Vec<usize> {
        self.units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.side == side)
            .map(|(idx, _)| idx)
            .collect()
    }

    fn side_units(&self, side: Side) -> Vec<Unit> {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .cloned()
            .collect()
    }

    fn side_wiped(&self, side: Side) -> bool {
        all_dead(&self.side_units(side))
    }

    fn health_of(&self, side: Side) -> u32 {
        self.units
            .iter()
            .filter(|u| u.side == side)
            .map(|u| u.current_health)
            .sum()
    }

    fn party_action(&mut self, idx: usize) {
        let actor = self.units[idx].clone();
        if actor.has_full_spirit() {
            if self.strategy.attempt_succeeds(&mut self.rng) {
                let outcome = execute_special_ability(
                    &actor,
                    &self.units,
                    &actor.special_ability,
                    actor.ability_value(),
                    &mut self.rng,
                );
                self.units = outcome.units;
            }
            self.units[idx] = consume_spirit_cost(&self.units[idx]);
        } else {
            self.units = execute_standard_attack(&actor, &self.units).units;
        }
        self.units[idx].has_acted = true;
    }

    fn monster_action(&mut self, idx: usize) {
        self.units[idx].has_acted = true;
        let monster = self.units[idx].clone();
        let party_slots = self.side_indices(Side::Player);
        let party = self.side_units(Side::Player);
        let outcome = process_monster_action(&monster, &party, &mut self.rng);
        for (slot, unit) in party_slots.into_iter().zip(outcome.units) {
            self.units[slot] = unit;
        }
    }

    /// Plays one round. Returns `Some(victory)` once the battle is decided.
    fn run_round(&mut self) -> Option<bool> {
        self.turn_count += 1;
        let party_slots = self.side_indices(Side::Player);
        let regenerated = regenerate_spirit(&self.side_units(Side::Player));
        for (slot, unit) in party_slots.iter().copied().zip(regenerated) {
            self.units[slot] = unit;
        }

        for idx in party_slots {
            if self.units[idx].is_dead() {
                continue;
            }
            self.party_action(idx);
            if self.side_wiped(Side::Opponent) {
                return Some(true);
            }
        }

        for idx in self.side_indices(Side::Opponent) {
            if self.units[idx].is_dead() {
                continue;
            }
            self.monster_action(idx);
            if self.side_wiped(Side::Player) {
                return Some(false);
            }
        }

        self.units = tick_status_effects(&self.units);
        for unit in &mut self.units {
            unit.has_acted = false;
        }
        None
    }

    /// Runs rounds until one side falls or `max_rounds` is reached; hitting
    /// the cap counts as a loss.
    pub fn run(mut self, max_rounds: u32) -> SimulationResult {
        if self.side_wiped(Side::Player) || self.side_wiped(Side::Opponent) {
            let won = !self.side_wiped(Side::Player);
            return self.result(won);
        }
        let mut victory = false;
        while self.turn_count < max_rounds {
            if let Some(won) = self.run_round() {
                victory = won;
                break;
            }
        }
        self.result(victory)
    }

    fn result(&self, victory: bool) -> SimulationResult {
        SimulationResult {
            victory,
            turn_count: self.turn_count,
            final_party_health: self.health_of(Side::Player),
            final_monster_health: self.health_of(Side::Opponent),
        }
    }
}

pub fn simulate_battle(
    party: &[Unit],
    monsters: &[Unit],
    strategy: UltimateStrategy,
    seed: u64,
    max_rounds: u32,
) -> SimulationResult {
    BattleSimulator::new(party, monsters, strategy, seed).run(max_rounds)
}
