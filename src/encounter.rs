//! Live encounter flow controller.
//!
//! The controller owns one [`EncounterState`] and advances it through
//! `INIT -> PLAYER_TURN <-> MONSTER_TURN -> VICTORY | DEFEAT`. Multi-step
//! sequences (monster turn, post-victory pause) are queued as [`Step`]s on a
//! virtual clock and fired by [`EncounterController::advance`]; each step
//! reads the state as it is when it fires. Re-initialising cancels any steps
//! still queued for the previous encounter.

use crate::combat_log::CombatLog;
use crate::config::PacingConfig;
use crate::engine::{
    all_dead, consume_spirit_cost, execute_special_ability, execute_standard_attack,
    process_monster_action, regenerate_spirit, tick_status_effects,
};
use crate::model::{Side, Unit, UnitId};
use crate::roster::{build_monsters, build_party};
use crate::schedule::StepQueue;
use crate::templates::{Difficulty, EncounterDefinition, LevelScaling, TemplateProvider, UnitSpec};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::time::Duration;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Init,
    PlayerTurn,
    MonsterTurn,
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub xp_reward: u32,
    pub node_index: usize,
    pub difficulty: Difficulty,
}

/// Snapshot read by the presentation layer after every revision.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterState {
    pub phase: Phase,
    pub turn_count: u32,
    pub party: Vec<Unit>,
    pub monsters: Vec<Unit>,
    pub log: Vec<String>,
    pub selected_unit_id: Option<UnitId>,
    pub reward: Reward,
    pub revision: u64,
}

impl Default for EncounterState {
    fn default() -> Self {
        Self {
            phase: Phase::Init,
            turn_count: 0,
            party: Vec::new(),
            monsters: Vec::new(),
            log: Vec::new(),
            selected_unit_id: None,
            reward: Reward::default(),
            revision: 0,
        }
    }
}

impl EncounterState {
    fn all_units(&self) -> Vec<Unit> {
        self.party
            .iter()
            .chain(self.monsters.iter())
            .cloned()
            .collect()
    }

    /// Writes a combined roster back into the two sides, preserving order.
    fn store_units(&mut self, units: Vec<Unit>) {
        let (party, monsters): (Vec<Unit>, Vec<Unit>) =
            units.into_iter().partition(|u| u.side == Side::Player);
        self.party = party;
        self.monsters = monsters;
    }

    fn append_log(&mut self, log: CombatLog) {
        self.log.extend(log.into_lines());
    }

    fn party_index(&self, id: UnitId) -> Option<usize> {
        self.party.iter().position(|u| u.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct EncounterSetup {
    pub party: Vec<UnitSpec>,
    pub monsters: Vec<UnitSpec>,
    pub xp_reward: u32,
    pub node_index: usize,
    pub difficulty: Difficulty,
}

impl EncounterSetup {
    pub fn from_definition(
        definition: &EncounterDefinition,
        node_index: usize,
        party: Vec<UnitSpec>,
    ) -> Self {
        Self {
            party,
            monsters: definition.monsters.clone(),
            xp_reward: definition.xp_reward,
            node_index,
            difficulty: definition.difficulty,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Step {
    DeclareVictory,
    BeginMonsterTurn,
    MonsterAction,
    CloseRound,
}

pub struct EncounterController {
    state: EncounterState,
    pacing: PacingConfig,
    queue: StepQueue<Step>,
    rng: SmallRng,
    victory_pending: bool,
}

impl EncounterController {
    pub fn new(pacing: PacingConfig, seed: u64) -> Self {
        Self {
            state: EncounterState::default(),
            pacing,
            queue: StepQueue::new(),
            rng: SmallRng::seed_from_u64(seed),
            victory_pending: false,
        }
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn pending_steps(&self) -> usize {
        self.queue.len()
    }

    pub fn initialize_encounter(
        &mut self,
        provider: &dyn TemplateProvider,
        scaling: &dyn LevelScaling,
        setup: &EncounterSetup,
    ) {
        let cancelled = self.queue.cancel_all();
        if cancelled > 0 {
            tracing::debug!(cancelled, "dropped steps from the previous encounter");
        }
        let party = build_party(provider, scaling, &setup.party, 0);
        let monsters = build_monsters(
            provider,
            scaling,
            &setup.monsters,
            setup.difficulty,
            party.len() as u32,
        );

        let mut log = CombatLog::new();
        log.log_encounter_start(monsters.len());
        log.log_round(1);
        let revision = self.state.revision + 1;
        self.state = EncounterState {
            phase: Phase::PlayerTurn,
            turn_count: 1,
            party,
            monsters,
            log: log.into_lines(),
            selected_unit_id: None,
            reward: Reward {
                xp_reward: setup.xp_reward,
                node_index: setup.node_index,
                difficulty: setup.difficulty,
            },
            revision,
        };
        self.victory_pending = false;
        tracing::debug!(
            party = self.state.party.len(),
            monsters = self.state.monsters.len(),
            "encounter initialised"
        );

        // Rosters can come up empty when every template id was unknown.
        if all_dead(&self.state.party) {
            tracing::warn!("encounter started without a living party member");
            self.state.phase = Phase::Defeat;
            let mut log = CombatLog::new();
            log.log_defeat();
            self.state.append_log(log);
            self.touch();
        } else if all_dead(&self.state.monsters) {
            tracing::warn!("encounter started without a living monster");
            self.declare_victory_later();
        }
    }

    pub fn select_unit(&mut self, id: UnitId) {
        if self.state.phase.is_terminal() {
            return;
        }
        let selectable = self
            .state
            .party
            .iter()
            .any(|u| u.id == id && u.is_alive());
        if selectable {
            self.state.selected_unit_id = Some(id);
            self.touch();
        }
    }

    /// Standard attack by party unit `id`. Ignored if the unit cannot act.
    pub fn perform_action(&mut self, id: UnitId) {
        let Some(idx) = self.ready_unit(id) else {
            return;
        };
        self.state.party[idx].has_acted = true;
        let attacker = self.state.party[idx].clone();
        let outcome = execute_standard_attack(&attacker, &self.state.all_units());
        self.state.store_units(outcome.units);
        self.state.append_log(outcome.log);
        self.touch();
        self.after_player_action();
    }

    /// Special ability by party unit `id`; `success` comes from the challenge.
    ///
    /// The gauge is not checked here. Both outcomes drain it and use up the
    /// unit's action.
    pub fn resolve_special_attack(&mut self, id: UnitId, success: bool) {
        let Some(idx) = self.ready_unit(id) else {
            return;
        };
        let caster = self.state.party[idx].clone();
        if success {
            let outcome = execute_special_ability(
                &caster,
                &self.state.all_units(),
                &caster.special_ability,
                caster.ability_value(),
                &mut self.rng,
            );
            self.state.store_units(outcome.units);
            self.state.append_log(outcome.log);
        } else {
            let mut log = CombatLog::new();
            log.log_ability_failed(&caster.name);
            self.state.append_log(log);
        }
        if let Some(idx) = self.state.party_index(id) {
            let mut spent = consume_spirit_cost(&self.state.party[idx]);
            spent.has_acted = true;
            self.state.party[idx] = spent;
        }
        self.touch();
        self.after_player_action();
    }

    /// Advances the virtual clock, firing every step that comes due.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let deadline = self.queue.now() + elapsed;
        let mut fired = 0;
        while let Some(step) = self.queue.pop_until(deadline) {
            self.run_step(step);
            fired += 1;
        }
        self.queue.advance_to(deadline);
        fired
    }

    /// Fires queued steps until none remain, jumping the clock as needed.
    pub fn run_until_idle(&mut self) -> usize {
        let mut fired = 0;
        while let Some(step) = self.queue.pop_next() {
            self.run_step(step);
            fired += 1;
        }
        fired
    }

    pub fn cancel_pending(&mut self) -> usize {
        self.queue.cancel_all()
    }

    fn touch(&mut self) {
        self.state.revision += 1;
    }

    fn ready_unit(&self, id: UnitId) -> Option<usize> {
        if self.state.phase != Phase::PlayerTurn || self.victory_pending {
            return None;
        }
        let idx = self.state.party_index(id)?;
        let unit = &self.state.party[idx];
        (unit.is_alive() && !unit.has_acted).then_some(idx)
    }

    fn declare_victory_later(&mut self) {
        self.victory_pending = true;
        self.queue
            .schedule(self.pacing.victory_delay(), Step::DeclareVictory);
    }

    fn after_player_action(&mut self) {
        if all_dead(&self.state.monsters) {
            self.declare_victory_later();
            return;
        }
        let everyone_acted = self
            .state
            .party
            .iter()
            .filter(|u| u.is_alive())
            .all(|u| u.has_acted);
        if everyone_acted {
            self.end_player_turn();
        }
    }

    fn end_player_turn(&mut self) {
        for monster in &mut self.state.monsters {
            monster.has_acted = false;
        }
        self.state.phase = Phase::MonsterTurn;
        let mut log = CombatLog::new();
        log.log_monster_turn();
        self.state.append_log(log);
        self.touch();
        self.queue
            .schedule(self.pacing.turn_announcement_delay(), Step::BeginMonsterTurn);
    }

    fn run_step(&mut self, step: Step) {
        if self.state.phase.is_terminal() {
            tracing::debug!(?step, "ignoring step after the encounter ended");
            return;
        }
        tracing::debug!(?step, turn = self.state.turn_count, "running step");
        match step {
            Step::DeclareVictory => {
                self.state.phase = Phase::Victory;
                let mut log = CombatLog::new();
                log.log_victory();
                self.state.append_log(log);
                self.touch();
            }
            Step::BeginMonsterTurn | Step::MonsterAction => self.next_monster_action(),
            Step::CloseRound => self.close_round(),
        }
    }

    fn next_monster_action(&mut self) {
        if self.state.phase != Phase::MonsterTurn {
            return;
        }
        let next = self
            .state
            .monsters
            .iter()
            .position(|m| m.is_alive() && !m.has_acted);
        let Some(idx) = next else {
            self.finish_monster_turn();
            return;
        };
        self.state.monsters[idx].has_acted = true;
        let monster = self.state.monsters[idx].clone();
        let outcome = process_monster_action(&monster, &self.state.party, &mut self.rng);
        self.state.party = outcome.units;
        self.state.append_log(outcome.log);
        self.touch();

        let others_waiting = self
            .state
            .monsters
            .iter()
            .any(|m| m.is_alive() && !m.has_acted);
        if others_waiting {
            self.queue
                .schedule(self.pacing.monster_action_delay(), Step::MonsterAction);
        } else {
            self.finish_monster_turn();
        }
    }

    /// Ticks both sides and regenerates party spirit, then queues the round close.
    fn finish_monster_turn(&mut self) {
        self.state.party = regenerate_spirit(&tick_status_effects(&self.state.party));
        self.state.monsters = tick_status_effects(&self.state.monsters);
        self.touch();
        self.queue
            .schedule(self.pacing.round_end_delay(), Step::CloseRound);
    }

    fn close_round(&mut self) {
        if self.state.phase != Phase::MonsterTurn {
            return;
        }
        let mut log = CombatLog::new();
        if all_dead(&self.state.party) {
            self.state.phase = Phase::Defeat;
            log.log_defeat();
        } else {
            self.state.turn_count += 1;
            for unit in &mut self.state.party {
                unit.has_acted = false;
            }
            self.state.phase = Phase::PlayerTurn;
            log.log_round(self.state.turn_count);
        }
        self.state.append_log(log);
        self.touch();
    }
}
