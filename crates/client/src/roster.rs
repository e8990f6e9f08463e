//! Roster files: the two combatants of a battle as JSON.
//!
//! ```json
//! {
//!   "challenger": { "id": "knight", "name": "Knight", "maxHp": 140,
//!                   "stats": { "atk": 28, "def": 12, "spd": 9 } },
//!   "opponent":   { "id": "archer", "name": "Archer", "maxHp": 100,
//!                   "stats": { "atk": 24, "def": 6, "spd": 14 },
//!                   "position": 6, "range": 3 }
//! }
//! ```
//!
//! Omitted stats fall back to plain values (no crits, no penetration, no
//! lifesteal).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use battle_core::{
    AbilityDefinition, AbilityKind, ActiveBuff, Combatant, CombatantStats, EquipmentBonuses,
    Trigger,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Roster {
    pub challenger: Fighter,
    pub opponent: Fighter,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Fighter {
    pub id: String,
    pub name: String,
    pub max_hp: u32,
    /// Starting HP, capped at `maxHp`. Defaults to full.
    pub hp: Option<u32>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub equipment: Equipment,
    pub position: Option<u32>,
    pub range: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Stats {
    pub atk: u32,
    pub def: u32,
    pub spd: u32,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub armor_pen: f64,
    pub lifesteal: f64,
}

impl Default for Stats {
    fn default() -> Self {
        let plain = CombatantStats::new(0, 0, 0);
        Self {
            atk: plain.atk,
            def: plain.def,
            spd: plain.spd,
            crit_chance: plain.crit_chance,
            crit_damage: plain.crit_damage,
            armor_pen: plain.armor_pen,
            lifesteal: plain.lifesteal,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Equipment {
    pub atk: i32,
    pub def: i32,
    pub spd: i32,
    pub crit_chance: f64,
    pub crit_damage: f64,
    pub armor_pen: f64,
    pub lifesteal: f64,
    pub weapon_range: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub kind: AbilityKind,
    pub trigger: Trigger,
    #[serde(default)]
    pub cooldown: u32,
    pub magnitude: Option<u32>,
    pub applies: Option<ActiveBuff>,
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid roster: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn into_combatants(self) -> Result<(Combatant, Combatant)> {
        Ok((self.challenger.build()?, self.opponent.build()?))
    }
}

impl Fighter {
    fn build(self) -> Result<Combatant> {
        let stats = CombatantStats::new(self.stats.atk, self.stats.def, self.stats.spd)
            .with_crit(self.stats.crit_chance, self.stats.crit_damage)
            .with_armor_pen(self.stats.armor_pen)
            .with_lifesteal(self.stats.lifesteal);
        let equipment = EquipmentBonuses {
            atk: self.equipment.atk,
            def: self.equipment.def,
            spd: self.equipment.spd,
            crit_chance: self.equipment.crit_chance,
            crit_damage: self.equipment.crit_damage,
            armor_pen: self.equipment.armor_pen,
            lifesteal: self.equipment.lifesteal,
            weapon_range: self.equipment.weapon_range,
        };
        let abilities = self.abilities.into_iter().map(Ability::into_definition);

        let mut combatant = Combatant::new(self.id, self.name, stats, self.max_hp)?
            .with_equipment(equipment)
            .with_abilities(abilities)?;
        if let Some(hp) = self.hp {
            combatant = combatant.with_hp(hp);
        }
        if let Some(position) = self.position {
            combatant = combatant.with_position(position);
        }
        if let Some(range) = self.range {
            combatant = combatant.with_range(range);
        }
        Ok(combatant)
    }
}

impl Ability {
    fn into_definition(self) -> AbilityDefinition {
        let mut definition =
            AbilityDefinition::new(self.id, self.name, self.kind, self.trigger, self.cooldown);
        if let Some(magnitude) = self.magnitude {
            definition = definition.with_magnitude(magnitude);
        }
        if let Some(buff) = self.applies {
            definition = definition.with_buff(buff);
        }
        definition
    }
}
