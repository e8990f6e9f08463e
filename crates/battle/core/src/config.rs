/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleConfig {
    /// Base seed for every random draw of the battle.
    ///
    /// Combined with the turn number, the attacking side and a roll context to
    /// derive the seed of each individual roll.
    pub seed: u64,

    /// Number of cells on the one-dimensional arena.
    pub arena_size: u32,

    /// Cells a combatant advances on a regular movement turn.
    pub move_step: u32,

    /// Hard cap on resolved turns for the non-animated full simulation.
    ///
    /// Reaching the cap is a defined stop condition, not an error.
    pub max_turns: u32,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of abilities a combatant can have equipped.
    pub const MAX_ABILITIES: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_SEED: u64 = 0;
    pub const DEFAULT_ARENA_SIZE: u32 = 8;
    pub const DEFAULT_MOVE_STEP: u32 = 1;
    pub const DEFAULT_MAX_TURNS: u32 = 1000;

    pub fn new() -> Self {
        Self {
            seed: Self::DEFAULT_SEED,
            arena_size: Self::DEFAULT_ARENA_SIZE,
            move_step: Self::DEFAULT_MOVE_STEP,
            max_turns: Self::DEFAULT_MAX_TURNS,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the arena size (at least 2 cells, so two combatants always fit).
    #[must_use]
    pub fn with_arena_size(mut self, arena_size: u32) -> Self {
        self.arena_size = arena_size.max(2);
        self
    }

    #[must_use]
    pub fn with_move_step(mut self, move_step: u32) -> Self {
        self.move_step = move_step.max(1);
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
