//! Catalog loading: fetch the raw category map, normalize it, and build the
//! browsing catalog with its synthesized "all" category.

use crate::config::Config;
use crate::error::LoadError;
use crate::i18n::LanguageRegistry;
use crate::i18n::LanguageStrings;
use crate::menu::{
    null_as_default, Catalog, Category, DietaryTag, MenuItem, Translation, ALL_CATEGORY,
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Category keys containing any of these (case-insensitive) are specials.
pub const SPECIAL_TOKENS: [&str; 6] = [
    "today_special",
    "todayspecial",
    "specials_today",
    "daily-special",
    "daily_special",
    "special",
];

/// Whether a category is served by the specials view instead of the catalog.
pub fn is_special_category(key: &str) -> bool {
    let key = key.to_lowercase();
    SPECIAL_TOKENS.iter().any(|token| key.contains(token))
}

/// Where a catalog comes from.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    /// Remote API base URL; `None` means local file only
    pub api_base: Option<String>,
    pub restaurant: String,
    pub local_path: PathBuf,
    pub timeout: Duration,
}

impl CatalogSource {
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_base: config.api_base.clone(),
            restaurant: config.restaurant_number.clone(),
            local_path: config.menu_data_path.clone(),
            timeout: config.http_timeout,
        }
    }

    /// Local file only, no remote API.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            api_base: None,
            restaurant: String::new(),
            local_path: path.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Build `{base}/{segments...}` with each segment percent-encoded.
pub(crate) fn api_url(base: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid API base '{}': {}", base, e))?;
    url.path_segments_mut()
        .map_err(|_| format!("API base '{}' cannot take a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ==================== Loading ====================

/// Load the browsing catalog: "all" first, then every non-special category.
pub async fn load(source: &CatalogSource) -> Result<Catalog, LoadError> {
    let raw = load_raw(source).await?;
    build_catalog(raw)
}

/// Fetch and normalize the raw category list, specials included.
///
/// The remote API is tried first when configured; any remote failure falls
/// back to the local file, and a local failure is returned as-is.
pub async fn load_raw(source: &CatalogSource) -> Result<Vec<Category>, LoadError> {
    if let Some(base) = source.api_base.as_deref() {
        match fetch_remote(base, &source.restaurant, source.timeout).await {
            Ok(categories) => {
                info!(
                    "Loaded {} categories from remote API for restaurant {}",
                    categories.len(),
                    source.restaurant
                );
                return Ok(categories);
            }
            Err(e) => {
                warn!(
                    "Remote menu unavailable ({}), falling back to {}",
                    e,
                    source.local_path.display()
                );
            }
        }
    }

    let categories = read_local(&source.local_path).await?;
    info!(
        "Loaded {} categories from {}",
        categories.len(),
        source.local_path.display()
    );
    Ok(categories)
}

async fn fetch_remote(
    base: &str,
    restaurant: &str,
    timeout: Duration,
) -> Result<Vec<Category>, LoadError> {
    let url = api_url(base, &["api", "menu", restaurant]).map_err(LoadError::Shape)?;
    let url_str = url.to_string();
    debug!("Fetching menu from {}", url_str);

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| LoadError::Http {
            url: url_str.clone(),
            source,
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| LoadError::Http {
            url: url_str.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LoadError::Status {
            url: url_str,
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(|source| LoadError::Http {
        url: url_str,
        source,
    })?;
    let payload: Value = serde_json::from_str(&body)?;
    normalize_payload(payload)
}

async fn read_local(path: &std::path::Path) -> Result<Vec<Category>, LoadError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let payload: Value = serde_json::from_str(&content)?;
    normalize_payload(payload)
}

// ==================== Normalization ====================

/// Turn any accepted payload shape into an ordered category list.
///
/// Accepted: a category map, `{menu: ...}`, `{data: ...}`, or a flat array
/// of rows.
pub fn normalize_payload(payload: Value) -> Result<Vec<Category>, LoadError> {
    match payload {
        Value::Object(mut map) => {
            for wrapper in ["menu", "data"] {
                if matches!(map.get(wrapper), Some(Value::Object(_) | Value::Array(_))) {
                    if let Some(inner) = map.remove(wrapper) {
                        return normalize_payload(inner);
                    }
                }
            }
            categories_from_map(map)
        }
        Value::Array(rows) => categories_from_rows(rows),
        other => Err(LoadError::Shape(format!(
            "expected an object or array, got {}",
            json_kind(&other)
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(default, deserialize_with = "null_as_default")]
    label: BTreeMap<String, String>,
    items: Vec<MenuItem>,
}

fn categories_from_map(map: Map<String, Value>) -> Result<Vec<Category>, LoadError> {
    let mut categories = Vec::new();

    for (key, value) in map {
        if !value.is_object() {
            debug!("Skipping top-level key '{}' ({})", key, json_kind(&value));
            continue;
        }
        if value.get("items").map(Value::is_array) != Some(true) {
            warn!("Category '{}' has no item list, skipping", key);
            continue;
        }

        let raw: RawCategory = serde_json::from_value(value)
            .map_err(|e| LoadError::Shape(format!("category '{}': {}", key, e)))?;
        categories.push(Category {
            key,
            label: raw.label,
            items: raw.items,
        });
    }

    if categories.is_empty() {
        return Err(LoadError::Shape("no categories found".to_string()));
    }
    Ok(categories)
}

/// Backend row as stored in a flat table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuRow {
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "description")]
    desc: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    category: Option<String>,
    /// Either an object or a JSON-encoded string of one
    #[serde(default)]
    translations: Option<Value>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    video: Option<String>,
    #[serde(default, alias = "dietary_flags")]
    dietary_flags: Option<Value>,
    #[serde(default, alias = "spice_level")]
    spice_level: Option<Value>,
}

const UNCATEGORIZED: &str = "uncategorized";

fn categories_from_rows(rows: Vec<Value>) -> Result<Vec<Category>, LoadError> {
    let mut categories: Vec<Category> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for value in rows {
        let row: MenuRow = serde_json::from_value(value)
            .map_err(|e| LoadError::Shape(format!("menu row: {}", e)))?;
        let category_key = row
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let item = row_to_item(row)?;

        let slot = *index.entry(category_key.clone()).or_insert_with(|| {
            categories.push(Category::new(category_key.clone(), Vec::new()).with_label(
                LanguageRegistry::get().canonical().code,
                category_key.clone(),
            ));
            categories.len() - 1
        });
        categories[slot].items.push(item);
    }

    if categories.is_empty() {
        return Err(LoadError::Shape("menu row list is empty".to_string()));
    }
    Ok(categories)
}

fn row_to_item(row: MenuRow) -> Result<MenuItem, LoadError> {
    let id = match row.id {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => {
            return Err(LoadError::Shape(format!(
                "row id must be a string or number, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut translations: BTreeMap<String, Translation> = match row.translations {
        Some(Value::String(encoded)) if !encoded.trim().is_empty() => {
            serde_json::from_str(&encoded)?
        }
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map_err(|e| LoadError::Shape(format!("translations of row '{}': {}", id, e)))?,
        _ => BTreeMap::new(),
    };

    let canonical = LanguageRegistry::get().canonical().code;
    if !translations.contains_key(canonical) {
        let price = match row.price {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => format!("₹{}", n),
            _ => String::new(),
        };
        translations.insert(
            canonical.to_string(),
            Translation {
                name: row.name.clone().unwrap_or_else(|| id.clone()),
                desc: row.desc.clone().unwrap_or_default(),
                price,
                ingredients: None,
            },
        );
    }

    let dietary_flags: BTreeSet<DietaryTag> = match row.dietary_flags {
        Some(Value::String(encoded)) if encoded.trim_start().starts_with('[') => {
            serde_json::from_str(&encoded)?
        }
        Some(Value::String(single)) if !single.trim().is_empty() => {
            std::iter::once(DietaryTag::from(single)).collect()
        }
        Some(value @ Value::Array(_)) => serde_json::from_value(value)
            .map_err(|e| LoadError::Shape(format!("dietary flags of row '{}': {}", id, e)))?,
        _ => Default::default(),
    };

    let spice_level = match row.spice_level {
        Some(Value::Null) | None => None,
        Some(value) => Some(
            serde_json::from_value(value)
                .map_err(|e| LoadError::Shape(format!("spice level of row '{}': {}", id, e)))?,
        ),
    };

    Ok(MenuItem {
        id,
        image: row.image.unwrap_or_default(),
        model: row.model,
        video: row.video,
        dietary_flags,
        dietary_color: None,
        spice_level,
        translations,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ==================== Catalog Build ====================

/// Build the browsing catalog from raw categories.
///
/// Specials are dropped. A source category named "all" is dropped too, since
/// that key belongs to the synthesized aggregate. Every kept item must carry
/// an English translation, and item ids must be unique across the kept
/// categories.
pub fn build_catalog(raw: Vec<Category>) -> Result<Catalog, LoadError> {
    let canonical = LanguageRegistry::get().canonical().code;
    let mut kept: Vec<Category> = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for category in raw {
        if is_special_category(&category.key) {
            debug!("Category '{}' is a special, leaving it out", category.key);
            continue;
        }
        if category.key == ALL_CATEGORY {
            warn!("Source defines a reserved '{}' category, ignoring it", ALL_CATEGORY);
            continue;
        }

        for item in &category.items {
            if !item.translations.contains_key(canonical) {
                return Err(LoadError::Shape(format!(
                    "item '{}' in '{}' has no '{}' translation",
                    item.id, category.key, canonical
                )));
            }
            if let Some(first) = seen.insert(item.id.clone(), category.key.clone()) {
                return Err(LoadError::DuplicateItemId {
                    id: item.id.clone(),
                    first,
                    second: category.key.clone(),
                });
            }
        }
        kept.push(category);
    }

    let all_items: Vec<MenuItem> = kept
        .iter()
        .flat_map(|c| c.items.iter().cloned())
        .collect();

    let mut catalog = Catalog::new();
    catalog.insert(all_category(all_items));
    for category in kept {
        catalog.insert(category);
    }

    info!(
        "Catalog built: {} categories, {} items",
        catalog.len() - 1,
        catalog.get(ALL_CATEGORY).map(|c| c.items.len()).unwrap_or(0)
    );
    Ok(catalog)
}

fn all_category(items: Vec<MenuItem>) -> Category {
    let label = LanguageRegistry::get()
        .list_enabled()
        .into_iter()
        .map(|lang| {
            (
                lang.code.to_string(),
                LanguageStrings::for_code(lang.code).all_label.to_string(),
            )
        })
        .collect();

    Category {
        key: ALL_CATEGORY.to_string(),
        label,
        items,
    }
}
