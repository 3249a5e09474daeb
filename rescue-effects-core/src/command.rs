//! Effect code parsing.
//!
//! Turns a host code such as `floorup_10` or `weather_rain` into a typed
//! [`EffectCommand`]. All validation happens here, before any memory is
//! touched; execution in [`crate::pack`] is an exhaustive match.

use smallvec::SmallVec;

use crate::catalog::ParameterKind;
use crate::effects::leader::Leader;
use crate::effects::weather::Weather;
use crate::error::{EffectError, EffectResult};

/// Separator between a base code and its parameters.
pub const SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectCommand {
    /// Move toward the surface; lowers the floor number.
    FloorUp(u8),
    /// Move deeper; raises the floor number.
    FloorDown(u8),
    GiveMoney(u32),
    StealMoney(u32),
    RaiseMaxHp(u32),
    DropMaxHp(u32),
    UnseenForce,
    Immunity,
    SwapLeader(Leader),
    ChangeWeather(Weather),
    LevelUp,
}

impl EffectCommand {
    pub fn parse(code: &str) -> EffectResult<Self> {
        let parts: SmallVec<[&str; 4]> = code.split(SEPARATOR).collect();
        let base = parts[0];
        let arg = parts.get(1).copied();

        let command = match base {
            "floorup" => EffectCommand::FloorUp(quantity(arg, "floor", ParameterKind::Quantity99)? as u8),
            "floordown" => {
                EffectCommand::FloorDown(quantity(arg, "floor", ParameterKind::Quantity99)? as u8)
            }
            "givemoney" => EffectCommand::GiveMoney(quantity(arg, "money", ParameterKind::Quantity9999)?),
            "stealmoney" => {
                EffectCommand::StealMoney(quantity(arg, "money", ParameterKind::Quantity9999)?)
            }
            "raisehealth" => EffectCommand::RaiseMaxHp(quantity(arg, "health", ParameterKind::Quantity5)?),
            "drophealth" => EffectCommand::DropMaxHp(quantity(arg, "health", ParameterKind::Quantity5)?),
            "unseen" => EffectCommand::UnseenForce,
            "immunity" => EffectCommand::Immunity,
            "levelup" => EffectCommand::LevelUp,
            "leader" => EffectCommand::SwapLeader(
                arg.ok_or(EffectError::MissingParameter { effect: "leader" })?
                    .parse()?,
            ),
            "weather" => EffectCommand::ChangeWeather(
                arg.ok_or(EffectError::MissingParameter { effect: "weather" })?
                    .parse()?,
            ),
            _ => return Err(EffectError::UnknownCode(code.to_string())),
        };
        Ok(command)
    }

    /// Base code as it appears in the catalog.
    pub fn base_code(&self) -> &'static str {
        match self {
            EffectCommand::FloorUp(_) => "floorup",
            EffectCommand::FloorDown(_) => "floordown",
            EffectCommand::GiveMoney(_) => "givemoney",
            EffectCommand::StealMoney(_) => "stealmoney",
            EffectCommand::RaiseMaxHp(_) => "raisehealth",
            EffectCommand::DropMaxHp(_) => "drophealth",
            EffectCommand::UnseenForce => "unseen",
            EffectCommand::Immunity => "immunity",
            EffectCommand::SwapLeader(_) => "leader",
            EffectCommand::ChangeWeather(_) => "weather",
            EffectCommand::LevelUp => "levelup",
        }
    }

    /// Whether the command pins memory until a timer expires.
    pub fn is_timed(&self) -> bool {
        matches!(self, EffectCommand::Immunity)
    }
}

/// Base code of a raw host code, without parsing its parameters.
pub fn base_code(code: &str) -> &str {
    code.split(SEPARATOR).next().unwrap_or(code)
}

fn quantity(arg: Option<&str>, effect: &'static str, kind: ParameterKind) -> EffectResult<u32> {
    let (min, max) = kind.range();
    let raw = arg.ok_or(EffectError::MissingParameter { effect })?;
    match raw.parse::<u32>() {
        Ok(value) if (min..=max).contains(&value) => Ok(value),
        _ => Err(EffectError::InvalidQuantity {
            effect,
            raw: raw.to_string(),
            min,
            max,
        }),
    }
}
