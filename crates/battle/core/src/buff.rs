//! Timed stat modifiers (buffs and debuffs) carried by a combatant.
//!
//! # Duration
//!
//! `remaining_duration` counts whole turns. [`Buffs::tick`] runs once per
//! resolved turn, decrements every buff by one and drops those that reach 0
//! before the next attack resolves.
//!
//! # Stacking
//!
//! When a buff is applied while another buff with the same `id` is active,
//! the incoming buff's [`StackRule`] decides the outcome:
//!
//! - `replace`: the incoming buff overwrites the active one in place
//! - `add`: stacks accumulate, contribution is `value × stacks`, the longer
//!   duration is kept
//! - `max`: the larger magnitude wins, the longer duration is kept

use crate::stats::{Modifier, StatKind};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuffKind {
    Buff,
    Debuff,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StackRule {
    Replace,
    Add,
    Max,
}

/// A single timed modifier on one stat.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBuff {
    pub id: String,
    pub name: String,
    pub kind: BuffKind,
    pub stat: StatKind,
    /// Signed per-stack delta. Debuffs usually carry negative values.
    pub value: f64,
    pub is_percentage: bool,
    pub remaining_duration: u32,
    pub stack_rule: StackRule,
    pub stacks: u32,
}

impl ActiveBuff {
    /// Creates a single-stack buff.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: BuffKind,
        stat: StatKind,
        value: f64,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            stat,
            value,
            is_percentage: false,
            remaining_duration: duration,
            stack_rule: StackRule::Replace,
            stacks: 1,
        }
    }

    #[must_use]
    pub fn percentage(mut self) -> Self {
        self.is_percentage = true;
        self
    }

    #[must_use]
    pub fn with_stack_rule(mut self, rule: StackRule) -> Self {
        self.stack_rule = rule;
        self
    }

    /// Total signed contribution of this buff.
    pub fn contribution(&self) -> f64 {
        self.value * f64::from(self.stacks.max(1))
    }

    /// Contribution expressed as a modifier for the effective-stat stack.
    pub fn modifier(&self) -> Modifier {
        if self.is_percentage {
            Modifier::Percent(self.contribution())
        } else {
            Modifier::Flat(self.contribution())
        }
    }
}

/// What happened when a buff was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuffApplication {
    /// No buff with this id was active; appended.
    Added,
    /// `replace` rule overwrote the active buff.
    Replaced,
    /// `add` rule increased the stack count.
    Stacked { stacks: u32 },
    /// `max` rule kept the incoming, larger-magnitude value.
    Strengthened,
    /// `max` rule kept the active value; only the duration may have grown.
    Refreshed,
    /// Zero-duration buffs are never stored.
    Discarded,
}

impl BuffApplication {
    pub fn is_stored(&self) -> bool {
        !matches!(self, Self::Discarded)
    }
}

/// Ordered list of active buffs on a combatant.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Buffs {
    buffs: Vec<ActiveBuff>,
}

impl Buffs {
    pub fn empty() -> Self {
        Self { buffs: Vec::new() }
    }

    /// Applies a buff following the incoming buff's stack rule.
    pub fn apply(&mut self, mut incoming: ActiveBuff) -> BuffApplication {
        if incoming.remaining_duration == 0 {
            return BuffApplication::Discarded;
        }
        incoming.stacks = incoming.stacks.max(1);

        let Some(existing) = self.buffs.iter_mut().find(|b| b.id == incoming.id) else {
            self.buffs.push(incoming);
            return BuffApplication::Added;
        };

        match incoming.stack_rule {
            StackRule::Replace => {
                *existing = incoming;
                BuffApplication::Replaced
            }
            StackRule::Add => {
                existing.stacks = existing.stacks.saturating_add(incoming.stacks);
                existing.remaining_duration = existing
                    .remaining_duration
                    .max(incoming.remaining_duration);
                existing.stack_rule = StackRule::Add;
                BuffApplication::Stacked {
                    stacks: existing.stacks,
                }
            }
            StackRule::Max => {
                let duration = existing
                    .remaining_duration
                    .max(incoming.remaining_duration);
                let outcome = if incoming.value.abs() > existing.value.abs() {
                    let stacks = existing.stacks;
                    *existing = incoming;
                    existing.stacks = stacks;
                    BuffApplication::Strengthened
                } else {
                    BuffApplication::Refreshed
                };
                existing.remaining_duration = duration;
                outcome
            }
        }
    }

    /// Decrements every buff by one turn and removes those that reach 0.
    ///
    /// Returns the removed buffs in their original order.
    pub fn tick(&mut self) -> Vec<ActiveBuff> {
        for buff in &mut self.buffs {
            buff.remaining_duration = buff.remaining_duration.saturating_sub(1);
        }

        let (expired, active): (Vec<_>, Vec<_>) = std::mem::take(&mut self.buffs)
            .into_iter()
            .partition(|b| b.remaining_duration == 0);
        self.buffs = active;
        expired
    }

    pub fn get(&self, id: &str) -> Option<&ActiveBuff> {
        self.buffs.iter().find(|b| b.id == id)
    }

    /// Removes a buff immediately.
    pub fn remove(&mut self, id: &str) -> Option<ActiveBuff> {
        let index = self.buffs.iter().position(|b| b.id == id)?;
        Some(self.buffs.remove(index))
    }

    pub fn as_slice(&self) -> &[ActiveBuff] {
        &self.buffs
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveBuff> {
        self.buffs.iter()
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}

impl From<Vec<ActiveBuff>> for Buffs {
    fn from(buffs: Vec<ActiveBuff>) -> Self {
        let mut set = Self::empty();
        for buff in buffs {
            set.apply(buff);
        }
        set
    }
}
