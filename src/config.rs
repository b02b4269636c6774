/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.local/share/corsair`. Every key is optional; missing keys use the
/// built-in defaults, and an unreadable or malformed file means "all
/// defaults" plus a reported [`ConfigError`].

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tick_rate_ms: u64,
    pub boat: BoatStats,
    pub shop: ShopConfig,
    pub gamepad: GamepadConfig,
    /// Custom chart file; `None` = embedded chart.
    pub chart: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_filter: String,
}

/// Hull and damage tuning. Amounts are in health/shield points,
/// intervals in frames.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoatStats {
    pub max_health: f32,
    pub max_shield: f32,
    pub starting_health: f32,
    pub starting_shield: f32,
    pub passive_damage_interval: u32,
    pub passive_damage: f32,
    pub land_damage: f32,
    pub rock_damage: f32,
    pub default_speed: f32,
    pub coin_value: u32,
}

impl Default for BoatStats {
    fn default() -> Self {
        BoatStats {
            max_health: 100.0,
            max_shield: 100.0,
            starting_health: 100.0,
            starting_shield: 10.0,
            passive_damage_interval: 60,
            passive_damage: 1.0,
            land_damage: 10.0,
            rock_damage: 2.0,
            default_speed: 3.0,
            coin_value: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// How long "<item> purchased!" stays up.
    pub feedback_frames: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig { feedback_frames: 120 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub interact: Vec<String>,
    pub toggle_shop: Vec<String>,
    pub buy_health: Vec<String>,
    pub buy_shield: Vec<String>,
    pub buy_speed: Vec<String>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            interact: vec!["A".into(), "Start".into()],
            toggle_shop: vec!["Select".into()],
            buy_health: vec!["B".into()],
            buy_shield: vec!["X".into()],
            buy_speed: vec!["Y".into()],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid config: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct TomlConfig {
    timing: TomlTiming,
    boat: BoatStats,
    shop: ShopConfig,
    gamepad: GamepadConfig,
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlTiming {
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct TomlGeneral {
    chart: Option<String>,
    log_file: String,
    log_filter: String,
}

impl Default for TomlTiming {
    fn default() -> Self {
        // ~60 ticks per second: frame counts in BoatStats are "frames at 60fps"
        TomlTiming { tick_rate_ms: 16 }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            chart: None,
            log_file: "corsair.log".into(),
            log_filter: "info".into(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from the first `config.toml` found.
    /// On any problem the defaults are returned together with the error.
    pub fn load() -> (Self, Option<ConfigError>) {
        let search_dirs = candidate_dirs();
        let defaults = || GameConfig::from_toml(TomlConfig::default(), &search_dirs);
        match read_config(&search_dirs) {
            Ok(None) => (defaults(), None),
            Ok(Some((path, text))) => match GameConfig::parse(&text, &search_dirs) {
                Ok(cfg) => (cfg, None),
                Err(source) => (defaults(), Some(ConfigError::Parse { path, source })),
            },
            Err(e) => (defaults(), Some(e)),
        }
    }

    /// Parse config text. A relative chart path is looked up in `search_dirs`.
    pub fn parse(text: &str, search_dirs: &[PathBuf]) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg, search_dirs))
    }

    fn from_toml(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let chart = cfg.general.chart.as_deref().map(|c| resolve(c, search_dirs));
        GameConfig {
            tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
            boat: cfg.boat,
            shop: cfg.shop,
            gamepad: cfg.gamepad,
            chart,
            log_file: PathBuf::from(cfg.general.log_file),
            log_filter: cfg.general.log_filter,
        }
    }
}

/// Relative paths are looked up in the search dirs; first existing wins.
fn resolve(name: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| p.exists())
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];
    let mut push = |dir: PathBuf| {
        if !dirs.iter().any(|d| d == &dir) {
            dirs.push(dir);
        }
    };

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            push(parent.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        push(cwd);
    }
    if let Ok(home) = std::env::var("HOME") {
        let data = Path::new(&home).join(".local/share/corsair");
        if data.is_dir() {
            push(data);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// Path and text of the first config.toml found. No file at all is not an error.
fn read_config(search_dirs: &[PathBuf]) -> Result<Option<(PathBuf, String)>, ConfigError> {
    let Some(path) = search_dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists()) else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(&path)
        .map_err(|source| ConfigError::Read { path: path.clone(), source })?;
    Ok(Some((path, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = GameConfig::parse("", &[]).unwrap();
        assert_eq!(cfg.tick_rate_ms, 16);
        assert_eq!(cfg.boat, BoatStats::default());
        assert_eq!(cfg.shop.feedback_frames, 120);
        assert_eq!(cfg.gamepad, GamepadConfig::default());
        assert_eq!(cfg.chart, None);
        assert_eq!(cfg.log_file, PathBuf::from("corsair.log"));
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn partial_section_overrides_only_named_keys() {
        let cfg = GameConfig::parse(
            "[boat]\nstarting_shield = 40\nrock_damage = 5.5\n\n[timing]\ntick_rate_ms = 20\n",
            &[],
        )
        .unwrap();
        assert_eq!(cfg.boat.starting_shield, 40.0);
        assert_eq!(cfg.boat.rock_damage, 5.5);
        assert_eq!(cfg.boat.max_health, 100.0);
        assert_eq!(cfg.boat.passive_damage_interval, 60);
        assert_eq!(cfg.tick_rate_ms, 20);
    }

    #[test]
    fn gamepad_lists_replace_defaults() {
        let cfg = GameConfig::parse("[gamepad]\ninteract = [\"Start\"]\n", &[]).unwrap();
        assert_eq!(cfg.gamepad.interact, vec!["Start".to_string()]);
        assert_eq!(cfg.gamepad.buy_speed, vec!["Y".to_string()]);
    }

    #[test]
    fn zero_tick_rate_is_raised() {
        let cfg = GameConfig::parse("[timing]\ntick_rate_ms = 0\n", &[]).unwrap();
        assert_eq!(cfg.tick_rate_ms, 1);
    }

    #[test]
    fn type_mismatch_is_a_parse_error() {
        assert!(GameConfig::parse("[boat]\nmax_health = \"lots\"\n", &[]).is_err());
    }

    #[test]
    fn relative_chart_resolves_in_search_dirs() {
        let dir = std::env::temp_dir().join(format!("corsair-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("sea.txt"), "~B~\n").unwrap();
        let text = "[general]\nchart = \"sea.txt\"\n";

        let found = GameConfig::parse(text, &[PathBuf::from("/nonexistent"), dir.clone()]).unwrap();
        assert_eq!(found.chart, Some(dir.join("sea.txt")));
        let missing = GameConfig::parse(text, &[]).unwrap();
        assert_eq!(missing.chart, Some(PathBuf::from("sea.txt")));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn absolute_chart_path_is_kept() {
        let cfg = GameConfig::parse("[general]\nchart = \"/tmp/sea.txt\"\n", &[]).unwrap();
        assert_eq!(cfg.chart, Some(PathBuf::from("/tmp/sea.txt")));
    }
}
