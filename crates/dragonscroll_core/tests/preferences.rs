use dragonscroll_core::prefs::keys::{
    PROFILE_FAVORITE_BOOK, PROFILE_NAME, SETTINGS_TEXT_SIZE_MULTIPLIER, SETTINGS_THEME,
};
use dragonscroll_core::{
    DarkMode, ErrorKind, PrefError, PreferenceStore, Profile, Settings, Theme,
};
use std::fs;
use std::sync::Arc;

fn open_store(dir: &tempfile::TempDir) -> Arc<PreferenceStore> {
    Arc::new(PreferenceStore::open(dir.path().join("preferences.json")).unwrap())
}

#[test]
fn reads_return_defaults_when_absent() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);

    assert_eq!(prefs.get_string("missing", "fallback"), "fallback");
    assert_eq!(prefs.get_int("missing", 7), 7);
    assert_eq!(prefs.get_float("missing", 1.5), 1.5);
    assert_eq!(prefs.get_opt_string("missing"), None);
}

#[test]
fn typed_reads_return_default_on_type_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);

    prefs.set_int("count", 3).unwrap();
    prefs.set_string("name", "Ada").unwrap();

    assert_eq!(prefs.get_string("count", "none"), "none");
    assert_eq!(prefs.get_float("count", 0.25), 0.25);
    assert_eq!(prefs.get_int("name", -1), -1);
    assert_eq!(prefs.get_int("count", -1), 3);
}

#[test]
fn values_are_durable_when_set_returns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    {
        let prefs = PreferenceStore::open(&path).unwrap();
        prefs.set_string(PROFILE_NAME, "Ada").unwrap();
        prefs.set_int("launches", 4).unwrap();
        prefs.set_float(SETTINGS_TEXT_SIZE_MULTIPLIER, 1.25).unwrap();
    }

    let reopened = PreferenceStore::open(&path).unwrap();
    assert_eq!(reopened.get_string(PROFILE_NAME, "Reader"), "Ada");
    assert_eq!(reopened.get_int("launches", 0), 4);
    assert_eq!(reopened.get_float(SETTINGS_TEXT_SIZE_MULTIPLIER, 1.0), 1.25);
}

#[test]
fn clear_all_returns_defaults_in_memory_and_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let prefs = PreferenceStore::open(&path).unwrap();
    prefs.set_string(SETTINGS_THEME, "dragon").unwrap();
    prefs.set_int("launches", 4).unwrap();

    prefs.clear_all().unwrap();

    assert!(prefs.is_empty());
    assert_eq!(prefs.get_string(SETTINGS_THEME, "default"), "default");
    assert_eq!(prefs.get_int("launches", 0), 0);

    let reopened = PreferenceStore::open(&path).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn remove_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);
    prefs.set_string(PROFILE_FAVORITE_BOOK, "Dune").unwrap();

    assert!(prefs.remove(PROFILE_FAVORITE_BOOK).unwrap());
    assert!(!prefs.remove(PROFILE_FAVORITE_BOOK).unwrap());
    assert_eq!(prefs.get_opt_string(PROFILE_FAVORITE_BOOK), None);
}

#[test]
fn invalid_writes_are_rejected_without_change() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);

    let err = prefs.set_string("  ", "x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = prefs.set_float("ratio", f64::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(prefs.is_empty());
}

#[test]
fn corrupt_file_is_reported_as_storage_fault() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    fs::write(&path, "{ not json").unwrap();

    let err = PreferenceStore::open(&path).err().unwrap();

    assert!(matches!(err, PrefError::Corrupt { .. }));
    assert_eq!(err.kind(), ErrorKind::StorageFault);
}

#[test]
fn failed_write_leaves_previous_value_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    let prefs = PreferenceStore::open(&path).unwrap();
    prefs.set_int("launches", 1).unwrap();

    // A directory squatting on the temp path makes the atomic write fail.
    fs::create_dir(path.with_extension("json.tmp")).unwrap();
    let err = prefs.set_int("launches", 2).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StorageFault);
    assert_eq!(prefs.get_int("launches", 0), 1);
}

#[test]
fn text_size_multiplier_defaults_then_stores_scaled_value() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);
    let settings = Settings::new(Arc::clone(&prefs));

    assert_eq!(prefs.get_float(SETTINGS_TEXT_SIZE_MULTIPLIER, 1.0), 1.0);

    assert_eq!(settings.set_text_size_percent(50).unwrap(), 0.5);
    assert_eq!(prefs.get_float(SETTINGS_TEXT_SIZE_MULTIPLIER, 1.0), 0.5);
    assert_eq!(settings.text_size_multiplier(), 0.5);

    assert!(settings.set_text_size_percent(250).is_err());
    assert_eq!(settings.text_size_multiplier(), 0.5);
}

#[test]
fn theme_and_dark_mode_round_trip_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);
    let settings = Settings::new(Arc::clone(&prefs));

    assert_eq!(settings.theme(), Theme::Default);
    assert_eq!(settings.dark_mode(), DarkMode::System);

    settings.set_theme(Theme::Ocean).unwrap();
    settings.set_dark_mode(DarkMode::On).unwrap();
    assert_eq!(settings.theme(), Theme::Ocean);
    assert_eq!(settings.dark_mode(), DarkMode::On);

    settings.reset().unwrap();
    assert_eq!(settings.theme(), Theme::Default);
    assert_eq!(settings.dark_mode(), DarkMode::System);
    assert_eq!(settings.text_size_multiplier(), 1.0);
}

#[test]
fn unknown_stored_theme_reads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = open_store(&dir);
    prefs.set_string(SETTINGS_THEME, "neon").unwrap();

    assert_eq!(Settings::new(prefs).theme(), Theme::Default);
}

#[test]
fn profile_fields_use_placeholders_until_set() {
    let dir = tempfile::tempdir().unwrap();
    let profile = Profile::new(open_store(&dir));

    assert_eq!(profile.name(), "Reader");
    assert_eq!(profile.image_uri(), None);
    assert_eq!(profile.favorite_book(), None);

    profile.set_name(" Ada ").unwrap();
    profile
        .set_image_uri("content://media/picker/0/42")
        .unwrap();
    profile.set_favorite_book("Dune").unwrap();

    assert_eq!(profile.name(), "Ada");
    assert_eq!(
        profile.image_uri().as_deref(),
        Some("content://media/picker/0/42")
    );
    assert_eq!(profile.favorite_book().as_deref(), Some("Dune"));

    profile.clear_image_uri().unwrap();
    assert_eq!(profile.image_uri(), None);
}

#[test]
fn arbitrary_floats_survive_reopen_bit_for_bit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    let mut written = Vec::new();
    {
        let prefs = PreferenceStore::open(&path).unwrap();
        while written.len() < 200 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let value = f64::from_bits(state);
            if !value.is_finite() {
                continue;
            }
            let key = format!("float.{}", written.len());
            prefs.set_float(&key, value).unwrap();
            written.push((key, value));
        }
    }

    let reopened = PreferenceStore::open(&path).unwrap();
    for (key, value) in written {
        let read = reopened.get_float(&key, f64::NAN);
        assert_eq!(read.to_bits(), value.to_bits(), "{key}: {value:e} != {read:e}");
    }
}
