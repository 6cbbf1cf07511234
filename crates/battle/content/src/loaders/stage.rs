//! Stage loader.

use std::path::Path;

use crate::loaders::{LoadResult, read_file};
use crate::stage::StageSpec;

/// Loader for stage descriptions from RON files.
pub struct StageLoader;

impl StageLoader {
    /// Load a [`StageSpec`] from a RON file.
    ///
    /// The stage is only parsed here; [`crate::StageBuilder`] validates it
    /// against a field.
    pub fn load(path: &Path) -> LoadResult<StageSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<StageSpec> {
        let stage: StageSpec = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse stage RON: {}", e))?;
        Ok(stage)
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{Direction, HitFlags, Team, TileState};

    use super::*;
    use crate::stage::AttackKind;

    #[test]
    fn parses_a_minimal_stage() {
        let stage = StageLoader::parse(
            r#"(
                name: "tiny",
                tiles: [(x: 4, y: 1, state: Some(Ice))],
                attacks: [
                    (
                        frame: 2,
                        x: 1,
                        y: 2,
                        team: Red,
                        damage: 10,
                        flags: "IMPACT | FLINCH",
                        kind: Projectile(direction: Right, frames_per_tile: 3),
                    ),
                ],
            )"#,
        )
        .unwrap();

        assert_eq!(stage.name, "tiny");
        assert_eq!(stage.width, None);
        assert_eq!(stage.tiles[0].state, Some(TileState::Ice));
        assert_eq!(stage.tiles[0].team, None);

        let attack = &stage.attacks[0];
        assert_eq!(attack.team, Team::Red);
        assert_eq!(attack.flags, HitFlags::IMPACT | HitFlags::FLINCH);
        assert_eq!(
            attack.kind,
            AttackKind::Projectile {
                direction: Direction::Right,
                frames_per_tile: 3
            }
        );
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = StageLoader::parse("(name: ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stage RON"));
    }
}
