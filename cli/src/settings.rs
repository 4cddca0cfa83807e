use anyhow::Context;
use serde::Deserialize;
use slidemash_core::{BoardConfig, Coord, DEFAULT_BOARD_SIZE, Direction};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// What a key press does.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub(crate) enum Action {
    Move(Direction),
    Restart,
    Quit,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quit" => Ok(Self::Quit),
            "restart" => Ok(Self::Restart),
            other => other.parse().map(Self::Move).map_err(|_| {
                format!("unknown action {other:?}, expected a direction, \"restart\" or \"quit\"")
            }),
        }
    }
}

impl TryFrom<String> for Action {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Key name to action table, key names are lowercase (`"up"`, `"esc"`, `"w"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Action>")]
pub(crate) struct KeyMap(BTreeMap<String, Action>);

impl From<BTreeMap<String, Action>> for KeyMap {
    fn from(bindings: BTreeMap<String, Action>) -> Self {
        Self(
            bindings
                .into_iter()
                .map(|(key, action)| (key.to_ascii_lowercase(), action))
                .collect(),
        )
    }
}

impl KeyMap {
    pub(crate) fn action_for(&self, key: &str) -> Option<Action> {
        self.0.get(&key.to_ascii_lowercase()).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        use Action::*;
        use Direction::*;

        let bindings = [
            ("up", Move(North)),
            ("w", Move(North)),
            ("k", Move(North)),
            ("down", Move(South)),
            ("s", Move(South)),
            ("j", Move(South)),
            ("left", Move(West)),
            ("a", Move(West)),
            ("h", Move(West)),
            ("right", Move(East)),
            ("d", Move(East)),
            ("l", Move(East)),
            ("r", Restart),
            ("q", Quit),
            ("esc", Quit),
        ];
        Self(
            bindings
                .into_iter()
                .map(|(key, action)| (key.to_string(), action))
                .collect(),
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct BoardSection {
    pub(crate) size: Option<Coord>,
    pub(crate) seed: Option<u64>,
}

/// Contents of the TOML config file. A `[keys]` table replaces the default bindings as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    pub(crate) board: BoardSection,
    pub(crate) keys: KeyMap,
}

impl Settings {
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let settings = Self::parse(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    pub(crate) fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Board parameters, values given on the command line win over the file.
    pub(crate) fn board_config(&self, size: Option<Coord>, seed: Option<u64>) -> BoardConfig {
        let requested = size.or(self.board.size).unwrap_or(DEFAULT_BOARD_SIZE);
        let seed = seed.or(self.board.seed).unwrap_or_else(time_seed);

        let config = BoardConfig::new(requested, seed);
        if config.size != requested {
            log::warn!(
                "Board size {} is not supported, using {} instead",
                requested,
                config.size
            );
        }
        log::info!("Board size {}, seed {}", config.size, config.seed);
        config
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}
