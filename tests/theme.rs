use aiva::storage::{KeyValueStore, MemoryStore};
use aiva::theme::{ColorScheme, StatusBarStyle, ThemePreference, ThemeStore, DARK, LIGHT, THEME_KEY};
use std::sync::Arc;

async fn load(storage: &Arc<MemoryStore>, system: ColorScheme) -> ThemeStore {
    ThemeStore::load(Arc::clone(storage) as Arc<dyn KeyValueStore>, system).await
}

#[tokio::test]
async fn test_defaults_to_system() {
    let storage = Arc::new(MemoryStore::new());

    let theme = load(&storage, ColorScheme::Dark).await;

    assert_eq!(theme.preference(), ThemePreference::System);
    assert!(theme.is_dark());
    assert_eq!(theme.current(), &DARK);
}

#[tokio::test]
async fn test_stored_preference_overrides_system() {
    let storage = Arc::new(MemoryStore::with_entries([(THEME_KEY, "light")]));

    let theme = load(&storage, ColorScheme::Dark).await;

    assert_eq!(theme.preference(), ThemePreference::Light);
    assert_eq!(theme.current().status_bar, StatusBarStyle::DarkContent);
}

#[tokio::test]
async fn test_unknown_or_unreadable_value_follows_system() {
    let storage = Arc::new(MemoryStore::with_entries([(THEME_KEY, "sepia")]));
    let theme = load(&storage, ColorScheme::Light).await;
    assert_eq!(theme.preference(), ThemePreference::System);

    let storage = Arc::new(MemoryStore::with_entries([(THEME_KEY, "dark")]));
    storage.fail_reads(true);
    let theme = load(&storage, ColorScheme::Light).await;
    assert_eq!(theme.preference(), ThemePreference::System);
    assert_eq!(theme.current(), &LIGHT);
}

#[tokio::test]
async fn test_toggle_persists() {
    let storage = Arc::new(MemoryStore::new());
    let theme = load(&storage, ColorScheme::Light).await;

    assert_eq!(theme.toggle().await.unwrap(), ThemePreference::Dark);
    assert_eq!(storage.peek(THEME_KEY).as_deref(), Some("dark"));

    let reloaded = load(&storage, ColorScheme::Light).await;
    assert!(reloaded.is_dark());

    assert_eq!(reloaded.toggle().await.unwrap(), ThemePreference::Light);
    assert_eq!(storage.peek(THEME_KEY).as_deref(), Some("light"));
}

#[tokio::test]
async fn test_failed_write_keeps_preference() {
    let storage = Arc::new(MemoryStore::new());
    let theme = load(&storage, ColorScheme::Light).await;
    storage.fail_writes(true);

    assert!(theme.toggle().await.is_err());

    assert_eq!(theme.preference(), ThemePreference::System);
    assert!(!theme.is_dark());
}

#[tokio::test]
async fn test_system_scheme_change() {
    let storage = Arc::new(MemoryStore::new());
    let theme = load(&storage, ColorScheme::Light).await;

    theme.set_system_scheme(ColorScheme::Dark);

    assert!(theme.is_dark());
    assert_eq!(theme.current().colors.background, "#121212");
}
