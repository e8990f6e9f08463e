//! One-dimensional arena: cells `0..size`, one combatant per cell.
//!
//! Movement never passes through or lands on the opponent's cell, and every
//! destination is clamped to the arena bounds.

/// Positions of the two combatants of a turn, seen from the attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaView {
    pub size: u32,
    pub attacker: u32,
    pub defender: u32,
}

impl ArenaView {
    pub fn new(size: u32, attacker: u32, defender: u32) -> Self {
        Self {
            size,
            attacker,
            defender,
        }
    }

    pub fn distance(&self) -> u32 {
        distance(self.attacker, self.defender)
    }

    /// Whether a strike with `range` reaches the defender.
    pub fn in_range(&self, range: u32) -> bool {
        self.distance() <= range.max(1)
    }

    /// Attacker destination after advancing `steps` cells.
    pub fn advance_attacker(&self, steps: u32) -> u32 {
        advance(self.attacker, self.defender, steps, self.size)
    }

    /// Attacker destination when jumping next to the defender.
    pub fn leap_target(&self) -> u32 {
        advance(self.attacker, self.defender, self.distance(), self.size)
    }

    /// Defender destination after being pushed `steps` cells away.
    pub fn knockback_defender(&self, steps: u32) -> u32 {
        push_away(self.defender, self.attacker, steps, self.size)
    }

    /// Attacker destination after stepping `steps` cells away.
    pub fn retreat_attacker(&self, steps: u32) -> u32 {
        push_away(self.attacker, self.defender, steps, self.size)
    }
}

/// Errors raised when combatant positions cannot form a valid arena.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("position {position} is outside the arena (size {size})")]
    OutOfBounds { position: u32, size: u32 },

    #[error("both combatants occupy cell {position}")]
    SameCell { position: u32 },

    #[error("arena mode requires a position for both combatants")]
    MissingPosition,
}

/// Validates a pair of optional positions.
///
/// `Ok(false)` means the battle is not in arena mode, `Ok(true)` that both
/// positions are valid.
pub fn validate_positions(
    challenger: Option<u32>,
    opponent: Option<u32>,
    size: u32,
) -> Result<bool, ArenaError> {
    match (challenger, opponent) {
        (None, None) => Ok(false),
        (Some(_), None) | (None, Some(_)) => Err(ArenaError::MissingPosition),
        (Some(a), Some(b)) => {
            for position in [a, b] {
                if position >= size {
                    return Err(ArenaError::OutOfBounds { position, size });
                }
            }
            if a == b {
                return Err(ArenaError::SameCell { position: a });
            }
            Ok(true)
        }
    }
}

pub fn distance(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

/// Moves `from` up to `steps` cells toward `target`, stopping on the adjacent
/// cell at the latest.
pub fn advance(from: u32, target: u32, steps: u32, size: u32) -> u32 {
    let gap = distance(from, target);
    if gap <= 1 {
        return from;
    }
    let moved = steps.min(gap - 1);
    let to = if target > from { from + moved } else { from - moved };
    clamp_cell(to, size)
}

/// Moves `from` up to `steps` cells away from `other`, stopping at the edge.
pub fn push_away(from: u32, other: u32, steps: u32, size: u32) -> u32 {
    let to = if from >= other {
        from.saturating_add(steps)
    } else {
        from.saturating_sub(steps)
    };
    clamp_cell(to, size)
}

fn clamp_cell(cell: u32, size: u32) -> u32 {
    cell.min(size.saturating_sub(1))
}
