//! Runtime configuration loaded from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_core::BattleConfig;
use directories::ProjectDirs;

use crate::workers::PersistenceConfig;

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Delay between two turns of an auto battle.
    pub auto_battle_interval: Duration,
    pub event_buffer_size: usize,
    pub persistence: PersistenceConfig,
    /// Hand finished records to the persistence worker (default: false)
    pub enable_persistence: bool,
    /// Overrides the platform data directory.
    pub save_data_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            auto_battle_interval: Duration::from_millis(Self::DEFAULT_AUTO_BATTLE_INTERVAL_MS),
            event_buffer_size: 100,
            persistence: PersistenceConfig::default(),
            enable_persistence: false,
            save_data_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_AUTO_BATTLE_INTERVAL_MS: u64 = 800;

    /// Construct runtime configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_SEED` - Base seed for every roll (default: 0)
    /// - `BATTLE_MAX_TURNS` - Turn cap of a full simulation (default: 1000)
    /// - `BATTLE_ARENA_SIZE` - Arena cells, at least 2 (default: 8)
    /// - `BATTLE_MOVE_STEP` - Cells per movement turn, at least 1 (default: 1)
    /// - `AUTO_BATTLE_INTERVAL_MS` - Delay between auto-battle turns (default: 800)
    /// - `EVENT_BUFFER_SIZE` - Buffered events per topic (default: 100)
    /// - `PERSISTENCE_MAX_ATTEMPTS` - Save attempts per record (default: 3)
    /// - `ENABLE_PERSISTENCE` - Store finished records (default: false)
    /// - `SAVE_DATA_DIR` - Directory for stored records
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(seed) = parse::<u64>(lookup("BATTLE_SEED")) {
            config.battle = config.battle.with_seed(seed);
        }
        if let Some(max_turns) = parse::<u32>(lookup("BATTLE_MAX_TURNS")) {
            config.battle = config.battle.with_max_turns(max_turns);
        }
        if let Some(size) = parse::<u32>(lookup("BATTLE_ARENA_SIZE")) {
            config.battle = config.battle.with_arena_size(size);
        }
        if let Some(step) = parse::<u32>(lookup("BATTLE_MOVE_STEP")) {
            config.battle = config.battle.with_move_step(step);
        }
        if let Some(ms) = parse::<u64>(lookup("AUTO_BATTLE_INTERVAL_MS")) {
            config.auto_battle_interval = Duration::from_millis(ms);
        }
        if let Some(capacity) = parse::<usize>(lookup("EVENT_BUFFER_SIZE")) {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(attempts) = parse::<u32>(lookup("PERSISTENCE_MAX_ATTEMPTS")) {
            config.persistence = config.persistence.with_max_attempts(attempts);
        }
        if let Some(enabled) = lookup("ENABLE_PERSISTENCE") {
            config.enable_persistence = matches!(
                enabled.to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(dir) = lookup("SAVE_DATA_DIR").filter(|dir| !dir.is_empty()) {
            config.save_data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    /// Directory that holds stored battle records.
    ///
    /// `SAVE_DATA_DIR` when set, else the platform data directory, else
    /// `./.battle`.
    pub fn records_dir(&self) -> PathBuf {
        self.save_data_dir
            .clone()
            .or_else(|| ProjectDirs::from("", "", "battle").map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".battle"))
            .join("records")
    }
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}
