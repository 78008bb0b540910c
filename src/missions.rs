//! Named missions read from `assets/missions.toml`.
//!
//! Each `[[mission]]` entry carries a display name, a one-line description and
//! a `[mission.definition]` table with any [`MatchDefinition`] keys to
//! override.

use crate::config::{read_toml_file, MatchDefinition};
use crate::error::{SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;

pub const MISSIONS_PATH: &str = "assets/missions.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mission {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub definition: MatchDefinition,
}

#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MissionCatalog {
    #[serde(default, rename = "mission")]
    pub missions: Vec<Mission>,
}

impl MissionCatalog {
    pub fn parse(source: &str) -> SimResult<Self> {
        toml::from_str(source).map_err(|err| SimError::ConfigParse {
            path: MISSIONS_PATH.to_string(),
            reason: err.to_string(),
        })
    }

    /// Load the catalog file.  A missing file is an empty catalog.
    pub fn load(path: &str) -> SimResult<Self> {
        Ok(read_toml_file::<Self>(path)?.unwrap_or_default())
    }

    pub fn get(&self, name: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn find(&self, name: &str) -> SimResult<&Mission> {
        self.get(name).ok_or_else(|| SimError::MissionNotFound {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.missions.iter().map(|m| m.name.as_str())
    }
}

/// Startup system: fill [`MissionCatalog`] from `assets/missions.toml`.
pub fn load_mission_catalog(mut catalog: ResMut<MissionCatalog>) {
    match MissionCatalog::load(MISSIONS_PATH) {
        Ok(loaded) => {
            info!("Loaded {} missions from {MISSIONS_PATH}", loaded.missions.len());
            *catalog = loaded;
        }
        Err(err) => error!("Failed to load missions: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[mission]]
name = "Dogfight"
description = "One on one."

[mission.definition]
human_allies = 1
ai_allies = 0
ai_enemies = 1

[[mission]]
name = "Fleet battle"

[mission.definition]
ai_allies = 20
ai_enemies = 20
delayed_end = 3.0
"#;

    #[test]
    fn parses_missions_with_partial_definitions() {
        let catalog = MissionCatalog::parse(CATALOG).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["Dogfight", "Fleet battle"]);

        let dogfight = catalog.find("dogfight").unwrap();
        assert_eq!(dogfight.definition.ai_enemies, 1);
        assert_eq!(dogfight.definition.seed, MatchDefinition::default().seed);

        let fleet = catalog.find("Fleet battle").unwrap();
        assert_eq!(fleet.description, "");
        assert_eq!(fleet.definition.delayed_end, 3.0);
    }

    #[test]
    fn unknown_mission_is_an_error() {
        let catalog = MissionCatalog::parse(CATALOG).unwrap();
        let err = catalog.find("Armada").unwrap_err();
        assert!(matches!(err, SimError::MissionNotFound { .. }));
        assert_eq!(err.to_string(), "no mission named 'Armada'");
    }

    #[test]
    fn malformed_catalog_reports_parse_error() {
        let err = MissionCatalog::parse("[[mission]]\nname = 3\n").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse { .. }));
    }

    #[test]
    fn shipped_catalog_parses() {
        let catalog = MissionCatalog::load(MISSIONS_PATH).unwrap();
        assert!(catalog.get("Skirmish").is_some());
    }
}
