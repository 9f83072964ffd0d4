//! Integration test: character roster
//!
//! Create, edit, page and delete stored characters, and run simulations
//! against them by id or name.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use statforge::character::{
    AttributeResolver, Attributes, CharacterField, CharacterManager, CharacterRef, GrowthTemplate,
};
use statforge::core::ForgeConfig;
use statforge::simulator::{run_stored_duel, run_stored_exchanges, run_stored_series, SimConfig};
use statforge::ForgeError;
use tempfile::TempDir;

fn setup() -> (TempDir, CharacterManager, ForgeConfig) {
    let dir = TempDir::new().unwrap();
    let config = ForgeConfig {
        data_dir: Some(dir.path().to_path_buf()),
        ..ForgeConfig::default()
    };
    let manager = CharacterManager::new(&config).unwrap();
    (dir, manager, config)
}

fn create(manager: &CharacterManager, config: &ForgeConfig, name: &str, attack: f64) -> u32 {
    let attrs: Attributes = [("attack", attack), ("health", 300.0)].into_iter().collect();
    manager
        .create(name, &GrowthTemplate::at_level(5), &attrs, &config.attributes)
        .unwrap()
        .id()
}

#[test]
fn test_create_load_round_trip() {
    let (_dir, manager, config) = setup();
    let id = create(&manager, &config, "Aria", 42.0);

    let by_id = manager.load(&CharacterRef::Id(id)).unwrap();
    let by_name = manager.load(&"aria".parse().unwrap()).unwrap();

    assert_eq!(by_id, by_name);
    assert_eq!(by_id.level(), 5);
    assert_eq!(by_id.attribute("attack"), 42.0);
    // unspecified catalog attributes take their defaults
    assert_eq!(by_id.attribute("accuracy"), 95.0);
    assert_eq!(by_id.attributes().len(), config.attributes.len());
}

#[test]
fn test_ids_follow_highest_stored() {
    let (_dir, manager, config) = setup();
    assert_eq!(create(&manager, &config, "One", 1.0), 1);
    assert_eq!(create(&manager, &config, "Two", 1.0), 2);
    assert_eq!(create(&manager, &config, "Three", 1.0), 3);

    manager.delete(2).unwrap();
    assert_eq!(manager.next_available_id().unwrap(), 4);
    manager.delete(3).unwrap();
    assert_eq!(create(&manager, &config, "Again", 1.0), 2);
}

#[test]
fn test_duplicate_names_rejected_ignoring_case() {
    let (_dir, manager, config) = setup();
    create(&manager, &config, "Bran", 10.0);

    let attrs = Attributes::new();
    let err = manager
        .create("BRAN", &GrowthTemplate::default(), &attrs, &config.attributes)
        .unwrap_err();
    assert!(matches!(err, ForgeError::DuplicateName(_)));
    assert_eq!(manager.list().unwrap().len(), 1);
}

#[test]
fn test_rename_into_taken_name_fails() {
    let (_dir, manager, config) = setup();
    create(&manager, &config, "Cato", 10.0);
    let id = create(&manager, &config, "Dara", 10.0);

    let result = manager.update(&CharacterRef::Id(id), |record| {
        record.set_field(CharacterField::Name("cato".to_string()))
    });

    assert!(matches!(result, Err(ForgeError::DuplicateName(_))));
    assert_eq!(manager.load(&CharacterRef::Id(id)).unwrap().name(), "Dara");
}

#[test]
fn test_missing_characters_are_not_found() {
    let (_dir, manager, _config) = setup();
    assert!(matches!(
        manager.load(&CharacterRef::Id(99)),
        Err(ForgeError::NotFound(_))
    ));
    assert!(matches!(
        manager.load(&CharacterRef::from("Ghost")),
        Err(ForgeError::NotFound(_))
    ));
    assert!(matches!(manager.delete(99), Err(ForgeError::NotFound(_))));
}

#[test]
fn test_level_up_and_recalculate_persists() {
    let (_dir, manager, config) = setup();
    let id = create(&manager, &config, "Eryn", 1.0);
    let resolver = AttributeResolver::new(&config.growth);

    manager
        .update(&CharacterRef::Id(id), |record| {
            record.set_field(CharacterField::Level(20))?;
            resolver.recalculate_attributes(record).map(|_| ())
        })
        .unwrap();

    let stored = manager.load(&CharacterRef::Id(id)).unwrap();
    assert_eq!(stored.level(), 20);
    assert_eq!(stored.attribute("attack"), 240.0);
    assert_eq!(stored.attribute("health"), 1000.0);
}

#[test]
fn test_paging_with_search() {
    let (_dir, manager, config) = setup();
    for i in 1..=7 {
        create(&manager, &config, &format!("Scout {i}"), 1.0);
    }
    create(&manager, &config, "Warden", 1.0);

    let page = manager.find_page(Some("scout"), 2, 3).unwrap();
    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    let names: Vec<&str> = page.items.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["Scout 4", "Scout 5", "Scout 6"]);

    let past_end = manager.find_page(None, 9, 3).unwrap();
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 8);
}

#[test]
fn test_generate_batch_is_stored() {
    let (_dir, manager, config) = setup();
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let batch = manager
        .generate_batch(3, "Mob", &GrowthTemplate::at_level(10), &config, &mut rng)
        .unwrap();

    let levels: Vec<u32> = batch.iter().map(|r| r.level()).collect();
    assert_eq!(levels, vec![10, 11, 12]);
    assert_eq!(manager.list().unwrap().len(), 3);
    assert!(manager.load(&CharacterRef::from("Mob2")).is_ok());
}

#[test]
fn test_stored_simulations_require_both_sides() {
    let (_dir, manager, config) = setup();
    let id = create(&manager, &config, "Fenn", 30.0);
    let sim = SimConfig::seeded(5, 1);
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let ghost = CharacterRef::from("Nobody");

    assert!(matches!(
        run_stored_duel(&manager, &CharacterRef::Id(id), &ghost, &sim, &mut rng),
        Err(ForgeError::NotFound(_))
    ));
    assert!(matches!(
        run_stored_exchanges(&manager, &ghost, &CharacterRef::Id(id), &sim, &mut rng),
        Err(ForgeError::NotFound(_))
    ));
    assert!(matches!(
        run_stored_series(&manager, &ghost, &ghost, &sim),
        Err(ForgeError::NotFound(_))
    ));
}

#[test]
fn test_stored_series_reproducible_and_leaves_records_alone() {
    let (_dir, manager, config) = setup();
    let a = create(&manager, &config, "Gale", 40.0);
    let b = create(&manager, &config, "Hask", 38.0);
    let before = manager.list().unwrap();
    let sim = SimConfig::seeded(10, 99);

    let first = run_stored_series(&manager, &a.into(), &b.into(), &sim).unwrap();
    let second = run_stored_series(&manager, &"Gale".into(), &"Hask".into(), &sim).unwrap();

    assert_eq!(first, second);
    assert_eq!(first.attacker, "Gale");
    assert_eq!(first.runs, 10);
    assert_eq!(manager.list().unwrap(), before);
}
