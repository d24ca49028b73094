use crate::ability::{Hit, Primitive};

/// Append-only list of player-facing combat lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatLog {
    lines: Vec<String>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_attack(&mut self, attacker: &str, target: &str, dealt: u32) {
        self.lines
            .push(format!("{attacker} attacked {target} for {dealt} damage!"));
    }

    pub fn log_ability(&mut self, caster: &str, ability_id: &str) {
        self.lines.push(format!("{caster} used {ability_id}!"));
    }

    pub fn log_hit(&mut self, hit: &Hit) {
        let line = match hit.primitive {
            Primitive::Damage => format!("{} took {} damage!", hit.target, hit.amount),
            Primitive::Heal => format!("{} recovered {} health!", hit.target, hit.amount),
            Primitive::Shield => format!("{} gained {} shield!", hit.target, hit.amount),
        };
        self.lines.push(line);
    }

    pub fn log_ability_failed(&mut self, caster: &str) {
        self.lines
            .push(format!("{caster}'s ability FAILED! Charge lost."));
    }

    pub fn log_encounter_start(&mut self, monsters: usize) {
        self.lines
            .push(format!("A wild group of {monsters} monster(s) appears!"));
    }

    pub fn log_monster_turn(&mut self) {
        self.lines.push("The monsters are making their move!".to_string());
    }

    pub fn log_round(&mut self, turn: u32) {
        self.lines.push(format!("Turn {turn} begins."));
    }

    pub fn log_victory(&mut self) {
        self.lines.push("Victory! All monsters were defeated.".to_string());
    }

    pub fn log_defeat(&mut self) {
        self.lines.push("Defeat... your party has fallen.".to_string());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
