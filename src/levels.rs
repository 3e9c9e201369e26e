// Built-in level catalogue, embedded at compile time

use uuid::Uuid;

use crate::error::LevelError;
use crate::level::Level;

const BUILTIN_LEVELS: &[(&str, &str)] = &[
    ("duel", include_str!("../levels/duel.toml")),
    ("pillars", include_str!("../levels/pillars.toml")),
    ("solo", include_str!("../levels/solo.toml")),
];

/// Names accepted by `builtin_level`
pub fn builtin_level_names() -> Vec<&'static str> {
    BUILTIN_LEVELS.iter().map(|(name, _)| *name).collect()
}

/// Loads a built-in level by its short name (case insensitive)
pub fn builtin_level(name: &str) -> Result<Level, LevelError> {
    let key = name.to_lowercase();
    let (_, contents) = BUILTIN_LEVELS
        .iter()
        .find(|(n, _)| *n == key)
        .ok_or_else(|| LevelError::UnknownLevel(name.to_string()))?;
    Level::from_toml_str(contents)
}

/// Built-in level with the given id, used to pick the level of a replay
pub fn builtin_level_by_id(id: Uuid) -> Option<Level> {
    BUILTIN_LEVELS
        .iter()
        .filter_map(|(_, contents)| Level::from_toml_str(contents).ok())
        .find(|level| level.id() == id)
}

/// Resolves a level argument: a built-in name, otherwise a path to a TOML file
pub fn resolve_level(name_or_path: &str) -> Result<Level, LevelError> {
    match builtin_level(name_or_path) {
        Err(LevelError::UnknownLevel(_)) => Level::from_file(name_or_path),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_levels_parse() {
        for name in builtin_level_names() {
            let level = builtin_level(name);
            assert!(level.is_ok(), "level {} failed: {:?}", name, level.err());
        }
    }

    #[test]
    fn test_builtin_ids_are_stable() {
        let a = builtin_level("duel").unwrap();
        let b = builtin_level("DUEL").unwrap();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_unknown_level_name() {
        assert!(matches!(
            builtin_level("nowhere"),
            Err(LevelError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_duel_has_two_spawns_facing_each_other() {
        let level = builtin_level("duel").unwrap();
        let p1 = level.player1_body().unwrap().head();
        let p2 = level.player2_body().unwrap().head();
        assert_eq!(p1.direction, crate::types::Direction::Up);
        assert_eq!(p2.direction, crate::types::Direction::Down);
    }

    #[test]
    fn test_lookup_by_id() {
        let solo = builtin_level("solo").unwrap();
        assert_eq!(builtin_level_by_id(solo.id()).unwrap().name(), solo.name());
        assert!(builtin_level_by_id(Uuid::nil()).is_none());
    }
}
