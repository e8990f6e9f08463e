//! JSON serialization of [`BattleState`] with strict validation.
//!
//! `deserialize(&serialize(&state)?)? == state` for every state whose floats
//! are finite. Deserialization checks, in order:
//!
//! 1. the text parses as JSON
//! 2. the value is an object
//! 3. every required top-level key is present (no defaults)
//! 4. no unknown top-level key
//! 5. `phase` is one of `setup`, `ready`, `fighting`, `finished`
//! 6. every field has the expected shape

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{BattleError, ErrorSeverity};
use crate::state::{BattleState, Phase};

/// Top-level keys of a serialized [`BattleState`].
pub const REQUIRED_FIELDS: [&str; 8] = [
    "phase",
    "turn",
    "challenger",
    "opponent",
    "currentAttacker",
    "battleLog",
    "result",
    "isAutoBattle",
];

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid input: {0}")]
    InvalidInput(#[source] serde_json::Error),

    #[error("battle state must be an object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("invalid phase {0}")]
    InvalidPhase(String),

    #[error("invalid field: {0}")]
    InvalidField(#[source] serde_json::Error),

    #[error("failed to encode battle state: {0}")]
    Encode(#[source] serde_json::Error),
}

impl BattleError for CodecError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Encode(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "CODEC_INVALID_INPUT",
            Self::NotAnObject => "CODEC_NOT_AN_OBJECT",
            Self::MissingField(_) => "CODEC_MISSING_FIELD",
            Self::UnknownField(_) => "CODEC_UNKNOWN_FIELD",
            Self::InvalidPhase(_) => "CODEC_INVALID_PHASE",
            Self::InvalidField(_) => "CODEC_INVALID_FIELD",
            Self::Encode(_) => "CODEC_ENCODE",
        }
    }
}

/// Encodes a state as compact JSON.
///
/// Fails only on non-finite floats, which no valid state carries.
pub fn serialize(state: &BattleState) -> Result<String, CodecError> {
    if has_non_finite_float(state) {
        return Err(CodecError::Encode(<serde_json::Error as serde::ser::Error>::custom(
            "non-finite float in battle state",
        )));
    }
    serde_json::to_string(state).map_err(CodecError::Encode)
}

/// Decodes and validates a state.
pub fn deserialize(text: &str) -> Result<BattleState, CodecError> {
    let value: Value = serde_json::from_str(text).map_err(CodecError::InvalidInput)?;
    let Value::Object(object) = value else {
        return Err(CodecError::NotAnObject);
    };

    validate_keys(&object)?;
    validate_phase(&object)?;

    serde_json::from_value(Value::Object(object)).map_err(CodecError::InvalidField)
}

fn validate_keys(object: &Map<String, Value>) -> Result<(), CodecError> {
    if let Some(missing) = REQUIRED_FIELDS
        .iter()
        .find(|field| !object.contains_key(**field))
    {
        return Err(CodecError::MissingField(*missing));
    }
    if let Some(unknown) = object
        .keys()
        .find(|key| !REQUIRED_FIELDS.contains(&key.as_str()))
    {
        return Err(CodecError::UnknownField(unknown.clone()));
    }
    Ok(())
}

fn validate_phase(object: &Map<String, Value>) -> Result<(), CodecError> {
    match object.get("phase") {
        Some(Value::String(phase)) if Phase::from_str(phase).is_ok() => Ok(()),
        Some(other) => Err(CodecError::InvalidPhase(other.to_string())),
        None => Err(CodecError::MissingField("phase")),
    }
}

/// Whether any float of the state is NaN or infinite.
///
/// serde_json writes those as `null`, which would not decode back.
fn has_non_finite_float(state: &BattleState) -> bool {
    [&state.challenger, &state.opponent]
        .into_iter()
        .flatten()
        .any(|c| {
            let stats = [
                c.base_stats.crit_chance,
                c.base_stats.crit_damage,
                c.base_stats.armor_pen,
                c.base_stats.lifesteal,
                c.equipment.crit_chance,
                c.equipment.crit_damage,
                c.equipment.armor_pen,
                c.equipment.lifesteal,
            ];
            let buffs = c.buffs.iter().map(|b| b.value);
            let templates = c
                .abilities
                .iter()
                .filter_map(|a| a.definition.applies.as_ref().map(|b| b.value));
            stats
                .into_iter()
                .chain(buffs)
                .chain(templates)
                .any(|value| !value.is_finite())
        })
}
