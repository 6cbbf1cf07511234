use std::io::Write;
use std::path::{Path, PathBuf};

use battle_content::{ConfigLoader, Scenario, StageBuilder, StageError, StageLoader};
use battle_core::{BattleConfig, Entity, Team, TileState};

fn data(path: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(path)
}

#[test]
fn bundled_config_matches_defaults_except_seed() {
    let config = ConfigLoader::load(&data("config.toml")).unwrap();
    assert_eq!(config.seed, 1);
    assert_eq!(BattleConfig { seed: 0, ..config }, BattleConfig::new());
}

#[test]
fn bundled_duel_runs_to_completion() {
    let config = ConfigLoader::load(&data("config.toml")).unwrap();
    let stage = StageLoader::load(&data("stages/duel.ron")).unwrap();
    let mut scenario = Scenario::from_stage(&stage, config).unwrap();

    let outcome = scenario.run(600);
    assert!(outcome.finished);
    assert_eq!(outcome.frames, 20);
    assert_eq!(outcome.winner, None);

    let health = |name: &str| {
        outcome
            .survivors
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.health)
    };
    assert_eq!(health("megaman"), Some(100));
    // Bubble absorbed the shot; fire on grass against wood dealt 40.
    assert_eq!(health("mettaur"), Some(20));
    assert_eq!(
        scenario.field().tile_at(5, 2).map(|t| t.state()),
        Some(TileState::Normal)
    );

    let rock = scenario.field().find_obstacles(|e| e.name() == "rock");
    assert_eq!(rock.len(), 1);
    assert_eq!(
        scenario.field().entity(rock[0]).map(Entity::team),
        Some(Team::Unknown)
    );
}

#[test]
fn same_stage_replays_to_the_same_digest() {
    let stage = StageLoader::load(&data("stages/duel.ron")).unwrap();
    let run = || {
        Scenario::from_stage(&stage, BattleConfig::new())
            .unwrap()
            .run(600)
            .digest
    };
    assert_eq!(run(), run());
}

#[test]
fn stage_from_temp_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"(
            name: "temp",
            width: 4,
            entities: [
                (name: "bass", kind: Character, team: Blue, x: 4, y: 1, health: 50,
                 defenses: [(rule: "aura", value: 20)]),
            ],
        )"#
    )
    .unwrap();

    let stage = StageLoader::load(file.path()).unwrap();
    let field = StageBuilder::build(&stage, BattleConfig::new()).unwrap();
    assert_eq!(field.width(), 4);
    assert_eq!(field.find_characters(|e| e.name() == "bass").len(), 1);
}

#[test]
fn unknown_defense_fails_the_build() {
    let stage = StageLoader::parse(
        r#"(
            entities: [
                (name: "met", kind: Character, team: Blue, x: 5, y: 2, health: 40,
                 defenses: [(rule: "mirror_shield")]),
            ],
        )"#,
    )
    .unwrap();

    let err = StageBuilder::build(&stage, BattleConfig::new()).unwrap_err();
    assert!(
        matches!(err, StageError::UnknownDefense { ref rule, .. } if rule == "mirror_shield")
    );
}

#[test]
fn missing_files_name_the_path() {
    let err = ConfigLoader::load(Path::new("/nonexistent/battle.toml")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/battle.toml"));
}
