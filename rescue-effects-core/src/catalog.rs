//! Effect Catalog
//!
//! The static list of effects this pack offers and the parameter sliders the
//! host renders for them. The host reads the catalog once, builds its selection
//! UI from it, and sends back codes such as `givemoney_250` or `weather_rain`.
//!
//! # Codes
//! - Plain effects use their base code (`unseen`, `immunity`).
//! - Quantity effects get the chosen amount appended (`floorup_3`).
//! - Grouped effects carry a variant key (`leader_first`, `weather_fog`) and
//!   list their parent folder or bid war as `group`.

use serde::Serialize;

use crate::effects::leader::Leader;
use crate::effects::weather::Weather;

/// Host-side slider parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterKind {
    #[serde(rename = "quantity5")]
    Quantity5,
    #[serde(rename = "quantity99")]
    Quantity99,
    #[serde(rename = "quantity9999")]
    Quantity9999,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 3] = [
        ParameterKind::Quantity5,
        ParameterKind::Quantity99,
        ParameterKind::Quantity9999,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ParameterKind::Quantity5 => "quantity5",
            ParameterKind::Quantity99 => "quantity99",
            ParameterKind::Quantity9999 => "quantity9999",
        }
    }

    /// Inclusive range of accepted quantities.
    pub fn range(self) -> (u32, u32) {
        match self {
            ParameterKind::Quantity5 => (1, 5),
            ParameterKind::Quantity99 => (1, 99),
            ParameterKind::Quantity9999 => (1, 9999),
        }
    }
}

/// How the host presents an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ItemKind {
    Effect,
    /// Exclusive choice decided by viewer bids.
    BidWar,
    /// Plain folder of sub-effects.
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectDefinition {
    pub name: String,
    pub code: String,
    pub kind: ItemKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<ParameterKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'static str>,
}

impl EffectDefinition {
    fn effect(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            kind: ItemKind::Effect,
            parameter: None,
            group: None,
        }
    }

    fn with_quantity(mut self, parameter: ParameterKind) -> Self {
        self.parameter = Some(parameter);
        self
    }

    fn parent(name: &str, code: &str, kind: ItemKind) -> Self {
        Self {
            kind,
            ..Self::effect(name, code)
        }
    }

    fn child(name: String, code: String, group: &'static str) -> Self {
        Self {
            name,
            code,
            kind: ItemKind::Effect,
            parameter: None,
            group: Some(group),
        }
    }
}

/// Slider definition exported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemType {
    pub name: &'static str,
    pub key: &'static str,
    pub subtype: &'static str,
    pub min: u32,
    pub max: u32,
}

/// Game identification reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub id: u32,
    pub name: &'static str,
    pub pack: &'static str,
    pub platform: &'static str,
    pub connector: &'static str,
}

pub const GAME: Game = Game {
    id: 11,
    name: "Red Rescue Team",
    pack: "RedRescueTeam",
    platform: "GBA",
    connector: "GBAConnector",
};

/// Group code of the leader bid war.
pub const LEADER_GROUP: &str = "lead";
/// Group code of the weather folder.
pub const WEATHER_GROUP: &str = "changeweather";

/// All effects, base entries first.
pub fn effects() -> Vec<EffectDefinition> {
    let mut effects = vec![
        EffectDefinition::effect("Floor down", "floordown").with_quantity(ParameterKind::Quantity99),
        EffectDefinition::effect("Floor up", "floorup").with_quantity(ParameterKind::Quantity99),
        EffectDefinition::effect("Money up", "givemoney").with_quantity(ParameterKind::Quantity9999),
        EffectDefinition::effect("Money down", "stealmoney").with_quantity(ParameterKind::Quantity9999),
        EffectDefinition::effect("Raise Max HP", "raisehealth").with_quantity(ParameterKind::Quantity5),
        EffectDefinition::effect("Lower Max HP", "drophealth").with_quantity(ParameterKind::Quantity5),
        EffectDefinition::effect("Unseen Force", "unseen"),
        EffectDefinition::effect("Grant Immunity", "immunity"),
        EffectDefinition::effect("Level up", "levelup"),
        EffectDefinition::parent("Swap leader", LEADER_GROUP, ItemKind::BidWar),
        EffectDefinition::parent("Swap the Weather", WEATHER_GROUP, ItemKind::Folder),
    ];

    effects.extend(Leader::ALL.into_iter().map(|leader| {
        EffectDefinition::child(
            format!("Change Starter to {} Pokemon", leader.display_name()),
            format!("leader_{}", leader.key()),
            LEADER_GROUP,
        )
    }));
    effects.extend(Weather::ALL.into_iter().map(|weather| {
        EffectDefinition::child(
            format!("Change weather to {} (Current floor only)", weather.display_name()),
            format!("weather_{}", weather.key()),
            WEATHER_GROUP,
        )
    }));

    effects
}

/// Quantity sliders referenced by [`effects`].
pub fn item_types() -> Vec<ItemType> {
    ParameterKind::ALL
        .into_iter()
        .map(|kind| {
            let (min, max) = kind.range();
            ItemType {
                name: "Quantity",
                key: kind.key(),
                subtype: "Slider",
                min,
                max,
            }
        })
        .collect()
}

/// Everything the host needs to render the pack.
#[derive(Debug, Clone, Serialize)]
pub struct PackManifest {
    pub game: Game,
    pub effects: Vec<EffectDefinition>,
    pub item_types: Vec<ItemType>,
}

impl PackManifest {
    pub fn new() -> Self {
        Self {
            game: GAME,
            effects: effects(),
            item_types: item_types(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl Default for PackManifest {
    fn default() -> Self {
        Self::new()
    }
}
