//! Session preferences and behavior tracking, persisted as one JSON file.
//!
//! Filter state is never persisted; only these toggles and the tracking log
//! survive a restart.

use crate::i18n::Language;
use crate::menu::{Catalog, DietaryTag};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub language: String,
    pub voice_enabled: bool,
    pub ambient_sound: bool,
    pub gestures_enabled: bool,
    pub behavior: BehaviorLog,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: Language::canonical().code().to_string(),
            voice_enabled: false,
            ambient_sound: false,
            gestures_enabled: true,
            behavior: BehaviorLog::default(),
        }
    }
}

impl Preferences {
    /// Load preferences, starting fresh when the file does not exist yet.
    ///
    /// A file that exists but cannot be parsed is logged and replaced by
    /// defaults rather than failing the session.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preferences at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        match serde_json::from_str(&content) {
            Ok(prefs) => Ok(prefs),
            Err(e) => {
                warn!("Ignoring unreadable preferences at {}: {}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Write preferences atomically (temp file in the same directory, then rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create {}", parent_dir.display()))?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        temp_file
            .persist(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Active language, falling back to canonical for unknown codes.
    pub fn language(&self) -> Language {
        Language::from_code(&self.language).unwrap_or_else(|_| Language::canonical())
    }

    pub fn set_language(&mut self, lang: Language) {
        self.language = lang.code().to_string();
    }
}

// ==================== Behavior Tracking ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorLog {
    /// Item ids, first view order, no repeats
    pub viewed_items: Vec<String>,
    pub search_history: Vec<SearchRecord>,
    pub filter_usage: BTreeMap<String, u32>,
    pub session_start: DateTime<Utc>,
    pub page_views: u32,
}

impl Default for BehaviorLog {
    fn default() -> Self {
        Self {
            viewed_items: Vec::new(),
            search_history: Vec::new(),
            filter_usage: BTreeMap::new(),
            session_start: Utc::now(),
            page_views: 0,
        }
    }
}

/// Something the user did that is worth remembering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BehaviorEvent {
    PageView,
    ItemView(String),
    Search { query: String, results: usize },
    FilterApplied(DietaryTag),
}

impl BehaviorLog {
    pub fn record(&mut self, event: BehaviorEvent) {
        debug!("Tracking {:?}", event);
        match event {
            BehaviorEvent::PageView => self.page_views += 1,
            BehaviorEvent::ItemView(id) => {
                if !self.viewed_items.contains(&id) {
                    self.viewed_items.push(id);
                }
            }
            BehaviorEvent::Search { query, results } => {
                self.search_history.push(SearchRecord {
                    query,
                    timestamp: Utc::now(),
                    results,
                });
            }
            BehaviorEvent::FilterApplied(tag) => {
                *self.filter_usage.entry(tag.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Share of viewed items that are vegetarian or seafood.
    pub fn analyze(&self, catalog: &Catalog) -> Interest {
        let viewed: Vec<_> = self
            .viewed_items
            .iter()
            .filter_map(|id| catalog.find_item_by_id(id))
            .collect();

        let veg = viewed.iter().filter(|item| item.has_tag(&DietaryTag::Veg)).count();
        let seafood = viewed
            .iter()
            .filter(|item| {
                item.translation(Language::canonical())
                    .map(|t| t.name.to_lowercase().contains("seafood"))
                    .unwrap_or(false)
            })
            .count();

        let total = self.viewed_items.len();
        let denominator = total.max(1) as f64;
        Interest {
            veg_interest: veg as f64 / denominator,
            seafood_interest: seafood as f64 / denominator,
            total_interactions: total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interest {
    pub veg_interest: f64,
    pub seafood_interest: f64,
    pub total_interactions: usize,
}

// ==================== Recommendations ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationAction {
    Navigate(String),
    Filter(DietaryTag),
    Item(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub id: &'static str,
    pub message: &'static str,
    pub action: RecommendationAction,
}

fn popular() -> Recommendation {
    Recommendation {
        id: "rec-popular",
        message: "Based on popular choices, you might enjoy our Chef Special Seafood",
        action: RecommendationAction::Navigate("specials".to_string()),
    }
}

fn dietary() -> Recommendation {
    Recommendation {
        id: "rec-dietary",
        message: "Since you viewed vegetarian items, try our Spicy Paneer Kebab",
        action: RecommendationAction::Filter(DietaryTag::Veg),
    }
}

/// Pick a suggestion from viewing behavior.
pub fn recommend(interest: &Interest) -> Recommendation {
    if interest.veg_interest > 0.7 {
        dietary()
    } else {
        // seafood interest and the default both point at the specials page
        popular()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::menu::Category;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_catalog() -> Catalog {
        let dish = |id: &str, name: &str, flags: &[&str]| {
            serde_json::from_value(json!({
                "id": id,
                "dietaryFlags": flags,
                "translations": { "en": { "name": name, "desc": "", "price": "₹100" } }
            }))
            .unwrap()
        };
        build_catalog(vec![Category::new(
            "mains",
            vec![
                dish("paneer", "Paneer Butter Masala", &["VEG"]),
                dish("dal", "Dal Tadka", &["VEG"]),
                dish("prawns", "Seafood Platter", &["NON_VEG"]),
            ],
        )])
        .unwrap()
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load(&dir.path().join("preferences.json")).unwrap();

        assert_eq!(prefs.theme, Theme::Light);
        assert_eq!(prefs.language, "en");
        assert!(prefs.gestures_enabled);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut prefs = Preferences {
            theme: Theme::Dark,
            voice_enabled: true,
            ..Preferences::default()
        };
        prefs.set_language(Language::from_code("it").unwrap());
        prefs.behavior.record(BehaviorEvent::ItemView("dal".to_string()));
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.language().code(), "it");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, r#"{ "theme": "dark" }"#).unwrap();

        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs.theme, Theme::Dark);
        assert!(prefs.gestures_enabled);
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "not json").unwrap();

        assert_eq!(Preferences::load(&path).unwrap().theme, Theme::Light);
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let prefs = Preferences {
            language: "tlh".to_string(),
            ..Preferences::default()
        };
        assert_eq!(prefs.language(), Language::ENGLISH);
    }

    // ==================== Tracking Tests ====================

    #[test]
    fn test_viewed_items_deduplicated() {
        let mut log = BehaviorLog::default();
        log.record(BehaviorEvent::ItemView("dal".to_string()));
        log.record(BehaviorEvent::ItemView("paneer".to_string()));
        log.record(BehaviorEvent::ItemView("dal".to_string()));

        assert_eq!(log.viewed_items, vec!["dal", "paneer"]);
    }

    #[test]
    fn test_filter_usage_counted() {
        let mut log = BehaviorLog::default();
        log.record(BehaviorEvent::FilterApplied(DietaryTag::Veg));
        log.record(BehaviorEvent::FilterApplied(DietaryTag::Veg));
        log.record(BehaviorEvent::FilterApplied(DietaryTag::GlutenFree));
        log.record(BehaviorEvent::PageView);

        assert_eq!(log.filter_usage["VEG"], 2);
        assert_eq!(log.filter_usage["GLUTEN_FREE"], 1);
        assert_eq!(log.page_views, 1);
    }

    #[test]
    fn test_search_history_keeps_result_count() {
        let mut log = BehaviorLog::default();
        log.record(BehaviorEvent::Search {
            query: "paneer".to_string(),
            results: 3,
        });

        assert_eq!(log.search_history[0].query, "paneer");
        assert_eq!(log.search_history[0].results, 3);
    }

    // ==================== Recommendation Tests ====================

    #[test]
    fn test_veg_interest_drives_dietary_recommendation() {
        let catalog = sample_catalog();
        let mut log = BehaviorLog::default();
        log.record(BehaviorEvent::ItemView("paneer".to_string()));
        log.record(BehaviorEvent::ItemView("dal".to_string()));

        let interest = log.analyze(&catalog);
        assert_eq!(interest.veg_interest, 1.0);
        assert_eq!(
            recommend(&interest).action,
            RecommendationAction::Filter(DietaryTag::Veg)
        );
    }

    #[test]
    fn test_mixed_interest_recommends_popular() {
        let catalog = sample_catalog();
        let mut log = BehaviorLog::default();
        log.record(BehaviorEvent::ItemView("paneer".to_string()));
        log.record(BehaviorEvent::ItemView("prawns".to_string()));

        let interest = log.analyze(&catalog);
        assert_eq!(interest.seafood_interest, 0.5);
        assert_eq!(recommend(&interest).id, "rec-popular");
    }

    #[test]
    fn test_no_history_has_zero_interest() {
        let interest = BehaviorLog::default().analyze(&sample_catalog());
        assert_eq!(interest.total_interactions, 0);
        assert_eq!(interest.veg_interest, 0.0);
    }
}
