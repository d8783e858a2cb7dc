//! Menu data model: items, categories, and the catalog that holds them.

use crate::i18n::Language;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Key of the synthesized aggregate category.
pub const ALL_CATEGORY: &str = "all";

// ==================== Dietary Tags ====================

/// Classification label on an item.
///
/// The well-known tags get their own variants; anything else a catalog uses
/// is kept verbatim so it can still be filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DietaryTag {
    Veg,
    NonVeg,
    GlutenFree,
    Other(String),
}

impl DietaryTag {
    pub fn as_str(&self) -> &str {
        match self {
            DietaryTag::Veg => "VEG",
            DietaryTag::NonVeg => "NON_VEG",
            DietaryTag::GlutenFree => "GLUTEN_FREE",
            DietaryTag::Other(tag) => tag,
        }
    }

    /// VEG and NON_VEG cannot be selected together.
    pub fn is_exclusive(&self) -> bool {
        matches!(self, DietaryTag::Veg | DietaryTag::NonVeg)
    }
}

impl From<String> for DietaryTag {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "VEG" => DietaryTag::Veg,
            "NON_VEG" => DietaryTag::NonVeg,
            "GLUTEN_FREE" => DietaryTag::GlutenFree,
            _ => DietaryTag::Other(value),
        }
    }
}

impl From<&str> for DietaryTag {
    fn from(value: &str) -> Self {
        DietaryTag::from(value.to_string())
    }
}

impl From<DietaryTag> for String {
    fn from(tag: DietaryTag) -> Self {
        tag.as_str().to_string()
    }
}

impl fmt::Display for DietaryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Spice Level ====================

/// Heat rating, 0 (mild) to 3 (hottest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SpiceLevel(u8);

impl SpiceLevel {
    pub const MAX: u8 = 3;

    pub fn new(level: u8) -> Option<Self> {
        (level <= Self::MAX).then_some(SpiceLevel(level))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SpiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SpiceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(SpiceLevel::new)
            .ok_or_else(|| format!("Invalid spice level '{}' (expected 0-{})", s, Self::MAX))
    }
}

// Catalogs write the level either as a number or as a string ("2").
impl<'de> Deserialize<'de> for SpiceLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => u8::try_from(n)
                .ok()
                .and_then(SpiceLevel::new)
                .ok_or_else(|| serde::de::Error::custom(format!("spice level {} out of range", n))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// ==================== Menu Item ====================

/// Per-language text of an item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Translation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, alias = "description", deserialize_with = "null_as_default")]
    pub desc: String,

    /// Display price, e.g. "₹250"
    #[serde(default, deserialize_with = "string_or_number")]
    pub price: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
}

impl Translation {
    /// Price as an integer: every non-digit character is dropped, and a price
    /// with no digits at all counts as 0.
    pub fn parsed_price(&self) -> u64 {
        self.price
            .chars()
            .filter_map(|c| c.to_digit(10))
            .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(d as u64))
    }

    /// Lowercased "name desc ingredients", the text search matches against.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.name,
            self.desc,
            self.ingredients.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected price string or number, got {}",
            other
        ))),
    }
}

/// A single dish.
///
/// Media fields are optional: an absent `model` means no 3D preview is
/// offered, an absent `video` means no video. Neither is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub dietary_flags: BTreeSet<DietaryTag>,

    /// Legacy marker: "green" implies VEG, "red" implies NON_VEG
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<SpiceLevel>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub translations: BTreeMap<String, Translation>,
}

impl MenuItem {
    /// Translation for `lang`, falling back to English.
    pub fn translation(&self, lang: Language) -> Option<&Translation> {
        self.translations
            .get(lang.code())
            .or_else(|| self.translations.get(Language::canonical().code()))
    }

    /// Explicit dietary flags plus whatever `dietary_color` implies.
    pub fn tags(&self) -> BTreeSet<DietaryTag> {
        let mut tags = self.dietary_flags.clone();
        match self.dietary_color.as_deref() {
            Some("green") => {
                tags.insert(DietaryTag::Veg);
            }
            Some("red") => {
                tags.insert(DietaryTag::NonVeg);
            }
            _ => {}
        }
        tags
    }

    pub fn has_tag(&self, tag: &DietaryTag) -> bool {
        self.dietary_flags.contains(tag)
            || match tag {
                DietaryTag::Veg => self.dietary_color.as_deref() == Some("green"),
                DietaryTag::NonVeg => self.dietary_color.as_deref() == Some("red"),
                _ => false,
            }
    }

    /// Display name in `lang`, or the id when the item has no usable translation.
    pub fn display_name(&self, lang: Language) -> &str {
        self.translation(lang)
            .map(|t| t.name.as_str())
            .unwrap_or(&self.id)
    }
}

// ==================== Category ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,

    /// Language code -> display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: BTreeMap<String, String>,

    /// Display order
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MenuItem>,
}

impl Category {
    pub fn new(key: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            key: key.into(),
            label: BTreeMap::new(),
            items,
        }
    }

    pub fn with_label(mut self, lang: &str, label: impl Into<String>) -> Self {
        self.label.insert(lang.to_string(), label.into());
        self
    }

    /// Label in `lang`, or the category key when that language has none.
    pub fn label_for(&self, lang: Language) -> &str {
        self.label
            .get(lang.code())
            .map(String::as_str)
            .unwrap_or(&self.key)
    }

    /// Same category with a different item list.
    pub fn with_items(&self, items: Vec<MenuItem>) -> Self {
        Self {
            key: self.key.clone(),
            label: self.label.clone(),
            items,
        }
    }
}

// ==================== Catalog ====================

/// Ordered mapping from category key to category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category, replacing any existing one with the same key in place.
    pub fn insert(&mut self, category: Category) {
        match self.categories.iter_mut().find(|c| c.key == category.key) {
            Some(existing) => *existing = category,
            None => self.categories.push(category),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of item entries across categories (duplicates counted).
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// First item with this id, scanning categories in order.
    pub fn find_item_by_id(&self, id: &str) -> Option<&MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| item.id == id)
    }

    /// Key of the category an item belongs to.
    ///
    /// The synthesized "all" category is skipped so the answer names the
    /// item's real category.
    pub fn find_item_category(&self, id: &str) -> Option<&str> {
        self.categories
            .iter()
            .filter(|c| c.key != ALL_CATEGORY)
            .find(|c| c.items.iter().any(|item| item.id == id))
            .map(|c| c.key.as_str())
    }
}

impl FromIterator<Category> for Catalog {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for category in iter {
            catalog.insert(category);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}
