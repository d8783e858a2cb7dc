//! Integration tests for the menu browser
//!
//! These tests drive the public API the way the binaries do: load a catalog
//! from a file or a mocked API, narrow it with filter actions, and render
//! the result.

use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use menu_browser::catalog::{self, CatalogSource};
use menu_browser::config::Config;
use menu_browser::filter::{FilterAction, FilterState, Pipeline, SpiceFilterMode};
use menu_browser::i18n::Language;
use menu_browser::menu::{DietaryTag, ALL_CATEGORY};
use menu_browser::orders::{OrderClient, OrderRequest};
use menu_browser::preferences::{recommend, BehaviorEvent, Preferences};
use menu_browser::render::render;
use menu_browser::specials;
use menu_browser::voice::{self, VoiceEffect};

// ==================== Test Helpers ====================

fn dish(id: &str, name: &str, price: &str, flags: &[&str]) -> Value {
    json!({
        "id": id,
        "image": format!("img/{}.jpg", id),
        "dietaryFlags": flags,
        "translations": {
            "en": { "name": name, "desc": format!("House {}", name), "price": price }
        }
    })
}

/// Starters (A: VEG ₹100, B: NON_VEG ₹300), a daily special, and mains (C: VEG ₹400).
fn catalog_document() -> Value {
    json!({
        "starters": {
            "label": { "en": "Starters", "fr": "Entrées" },
            "items": [
                dish("a", "Aloo Tikki", "₹100", &["VEG"]),
                dish("b", "Chicken Wings", "₹300", &["NON_VEG"])
            ]
        },
        "today_special": {
            "label": { "en": "Today's Special" },
            "items": [dish("s", "Saffron Biryani", "₹450", &["NON_VEG"])]
        },
        "mains": {
            "label": { "en": "Mains" },
            "items": [dish("c", "Chana Masala", "₹400", &["VEG", "GLUTEN_FREE"])]
        }
    })
}

/// Create a test config pointing at a temp catalog file and an optional API
fn create_test_config(api_base: Option<String>, temp_dir: &TempDir) -> Config {
    let menu_path = temp_dir.path().join("menu_data.json");
    std::fs::write(&menu_path, catalog_document().to_string()).expect("Failed to write catalog");

    Config {
        api_base,
        restaurant_number: "12345".to_string(),
        table_number: Some("7".to_string()),
        menu_data_path: menu_path,
        language: Language::canonical(),
        spice_filter_mode: SpiceFilterMode::Enforce,
        preferences_path: temp_dir.path().join("preferences.json"),
        search_debounce: Duration::from_millis(300),
        scroll_throttle: Duration::from_millis(100),
        http_timeout: Duration::from_secs(5),
    }
}

fn item_ids(outcome: &menu_browser::FilterOutcome) -> Vec<String> {
    outcome
        .catalog()
        .map(|catalog| {
            catalog
                .iter()
                .flat_map(|c| c.items.iter().map(|i| i.id.clone()))
                .collect()
        })
        .unwrap_or_default()
}

// ==================== Load → Filter → Render ====================

#[tokio::test]
async fn test_local_catalog_end_to_end() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);

    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let keys: Vec<&str> = catalog.keys().collect();
    assert_eq!(keys, vec![ALL_CATEGORY, "starters", "mains"]);

    let state = FilterState::new()
        .apply(FilterAction::ToggleDietary(DietaryTag::Veg))
        .apply(FilterAction::SetMaxPrice(200))
        .apply(FilterAction::SelectCategory(Some("starters".to_string())));
    let outcome = Pipeline::new(config.language, config.spice_filter_mode).run(&catalog, &state);

    assert_eq!(item_ids(&outcome), vec!["a"]);

    let view = render(&outcome, config.language, None);
    let text = view.to_string();
    assert!(text.contains("== Starters =="));
    assert!(text.contains("Aloo Tikki  ₹100  [Veg]"));
    assert!(!text.contains("Chicken Wings"));
}

#[tokio::test]
async fn test_empty_state_rendered() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);
    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let state = FilterState::new()
        .apply(FilterAction::ToggleDietary(DietaryTag::Veg))
        .apply(FilterAction::SetMaxPrice(50));
    let outcome = menu_browser::filter(&catalog, &state);

    assert!(outcome.is_empty());
    assert_eq!(outcome.visible_count(), 0);

    let view = render(&outcome, Language::from_code("fr").unwrap(), None);
    assert!(view.is_empty());
    assert_eq!(
        view.empty_message.as_deref(),
        Some("Aucun plat ne correspond à vos filtres.")
    );
}

#[tokio::test]
async fn test_localized_labels() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);
    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let french = Language::from_code("fr").unwrap();
    let outcome = Pipeline::new(french, SpiceFilterMode::Enforce).run(&catalog, &FilterState::new());
    let view = render(&outcome, french, None);

    assert_eq!(view.sections[0].label, "Tout");
    // items without a French translation fall back to English text
    assert_eq!(view.sections[0].cards[0].name, "Aloo Tikki");
}

// ==================== Remote Source ====================

#[tokio::test]
async fn test_remote_rows_override_local_file() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(Some(mock_server.uri()), &temp_dir);

    Mock::given(method("GET"))
        .and(path("/api/menu/12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "r1",
                "name": "Remote Dosa",
                "price": 150,
                "category": "breakfast",
                "translations": "{\"en\":{\"name\":\"Masala Dosa\",\"desc\":\"Crisp\",\"price\":\"₹150\"}}",
                "dietaryFlags": ["VEG"]
            },
            {
                "id": "r2",
                "name": "Filter Coffee",
                "price": "₹60",
                "category": "drinks"
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let keys: Vec<&str> = catalog.keys().collect();
    assert_eq!(keys, vec![ALL_CATEGORY, "breakfast", "drinks"]);

    let outcome = menu_browser::filter(&catalog, &FilterState::new().with_search("masala"));
    assert_eq!(item_ids(&outcome), vec!["r1"]);
}

#[tokio::test]
async fn test_remote_outage_falls_back_to_local() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(Some(mock_server.uri()), &temp_dir);

    Mock::given(method("GET"))
        .and(path("/api/menu/12345"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");
    assert!(catalog.contains("starters"));
    assert_eq!(catalog.get(ALL_CATEGORY).unwrap().items.len(), 3);
}

// ==================== Specials ====================

#[tokio::test]
async fn test_specials_are_only_on_the_specials_view() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);
    let source = CatalogSource::from_config(&config);

    let catalog = catalog::load(&source).await.expect("load");
    assert!(catalog.find_item_by_id("s").is_none());

    let specials = specials::load_specials(&source).await.expect("specials");
    let view = specials::render_specials(&specials, Language::canonical(), None);
    assert!(view.to_string().contains("Saffron Biryani"));
}

// ==================== Voice and Preferences ====================

#[tokio::test]
async fn test_voice_session_with_tracking() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);
    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let mut state = FilterState::new();
    let mut prefs = Preferences::load(&config.preferences_path).expect("prefs");

    for transcript in ["Filter vegetarian", "show me mains"] {
        if let VoiceEffect::Filter(action) = voice::interpret(transcript, &catalog).effect {
            if let FilterAction::ToggleDietary(tag) = &action {
                prefs.behavior.record(BehaviorEvent::FilterApplied(tag.clone()));
            }
            state = state.apply(action);
        }
    }
    assert_eq!(item_ids(&menu_browser::filter(&catalog, &state)), vec!["c"]);

    prefs.behavior.record(BehaviorEvent::ItemView("c".to_string()));
    prefs.behavior.record(BehaviorEvent::ItemView("a".to_string()));
    prefs.save(&config.preferences_path).expect("save");

    let restored = Preferences::load(&config.preferences_path).expect("reload");
    assert_eq!(restored.behavior.filter_usage.get("VEG"), Some(&1));

    let interest = restored.behavior.analyze(&catalog);
    assert_eq!(interest.veg_interest, 1.0);
    assert_eq!(recommend(&interest).id, "rec-dietary");
}

// ==================== Orders ====================

#[tokio::test]
async fn test_order_from_filtered_catalog_without_api() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(None, &temp_dir);
    let catalog = catalog::load(&CatalogSource::from_config(&config))
        .await
        .expect("load");

    let request = OrderRequest::from_selection(
        &catalog,
        &[("a", 2), ("c", 1)],
        config.language,
        &config.restaurant_number,
        config.table_number.as_deref(),
    )
    .expect("request");
    assert_eq!(request.total, 600);

    let placed = OrderClient::from_config(&config)
        .expect("client")
        .place_order(&request)
        .await
        .expect("place");
    assert!(placed.local);
}
