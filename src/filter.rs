//! Menu filtering: the browsing state and the fixed-order pipeline that turns
//! a catalog plus that state into the visible subset.
//!
//! Stages run in a fixed order (search, dietary, spice, price, category) and
//! each one only sees the survivors of the previous one. A category left with
//! no items is dropped; once no item is left the result is
//! [`FilterOutcome::Empty`] and later stages do not run.
//!
//! State changes go through [`FilterState::apply`], which consumes the old
//! state and returns the new one.

use crate::i18n::Language;
use crate::menu::{Catalog, DietaryTag, MenuItem, SpiceLevel, ALL_CATEGORY};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Price ceiling of a fresh session. The price stage is skipped at this value.
pub const DEFAULT_MAX_PRICE: u32 = 2000;

// ==================== State ====================

/// Everything the user has narrowed the menu by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search_query: String,
    dietary: BTreeSet<DietaryTag>,
    spice: BTreeSet<SpiceLevel>,
    max_price: u32,
    selected_category: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            dietary: BTreeSet::new(),
            spice: BTreeSet::new(),
            max_price: DEFAULT_MAX_PRICE,
            selected_category: Some(ALL_CATEGORY.to_string()),
        }
    }
}

/// A single user-driven change to the filter state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SetSearch(String),
    /// Toggle a dietary tag; selecting VEG or NON_VEG clears the other
    ToggleDietary(DietaryTag),
    ToggleSpice(SpiceLevel),
    SetMaxPrice(u32),
    SelectCategory(Option<String>),
    /// Reset search, dietary, spice, and price; the category is kept
    ClearFilters,
    /// Back to the "all" category with every filter cleared
    ShowAll,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercased, trimmed search text (empty means no search).
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn dietary_filters(&self) -> &BTreeSet<DietaryTag> {
        &self.dietary
    }

    pub fn spice_filters(&self) -> &BTreeSet<SpiceLevel> {
        &self.spice
    }

    pub fn max_price(&self) -> u32 {
        self.max_price
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Whether any filter besides the category is active.
    pub fn has_active_filters(&self) -> bool {
        !self.search_query.is_empty()
            || !self.dietary.is_empty()
            || !self.spice.is_empty()
            || self.max_price < DEFAULT_MAX_PRICE
    }

    /// Produce the next state.
    pub fn apply(mut self, action: FilterAction) -> Self {
        match action {
            FilterAction::SetSearch(query) => {
                self.search_query = normalize_query(&query);
            }
            FilterAction::ToggleDietary(tag) => {
                if !self.dietary.remove(&tag) {
                    if tag.is_exclusive() {
                        self.dietary.retain(|t| !t.is_exclusive());
                    }
                    self.dietary.insert(tag);
                }
            }
            FilterAction::ToggleSpice(level) => {
                if !self.spice.remove(&level) {
                    self.spice.insert(level);
                }
            }
            FilterAction::SetMaxPrice(price) => {
                self.max_price = price.min(DEFAULT_MAX_PRICE);
            }
            FilterAction::SelectCategory(category) => {
                self.selected_category = category;
            }
            FilterAction::ClearFilters => {
                self = Self {
                    selected_category: self.selected_category,
                    ..Self::default()
                };
            }
            FilterAction::ShowAll => {
                self = Self::default();
            }
        }
        self
    }

    pub fn with_search(self, query: &str) -> Self {
        self.apply(FilterAction::SetSearch(query.to_string()))
    }

    pub fn with_dietary(self, tag: DietaryTag) -> Self {
        self.apply(FilterAction::ToggleDietary(tag))
    }

    pub fn with_spice(self, level: SpiceLevel) -> Self {
        self.apply(FilterAction::ToggleSpice(level))
    }

    pub fn with_max_price(self, price: u32) -> Self {
        self.apply(FilterAction::SetMaxPrice(price))
    }

    pub fn with_category(self, category: Option<&str>) -> Self {
        self.apply(FilterAction::SelectCategory(category.map(str::to_string)))
    }
}

fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

// ==================== Pipeline ====================

/// Whether spice selections take part in filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpiceFilterMode {
    /// Keep items whose level is one of the selected levels
    #[default]
    Enforce,
    /// Track selections without filtering on them
    Ignore,
}

impl FromStr for SpiceFilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enforce" => Ok(SpiceFilterMode::Enforce),
            "ignore" => Ok(SpiceFilterMode::Ignore),
            other => Err(format!(
                "unknown spice filter mode '{}' (expected 'enforce' or 'ignore')",
                other
            )),
        }
    }
}

/// One step of the composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Dietary,
    Spice,
    Price,
    Category,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Search => "search",
            Stage::Dietary => "dietary",
            Stage::Spice => "spice",
            Stage::Price => "price",
            Stage::Category => "category",
        };
        f.write_str(name)
    }
}

/// Result of a filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Matches(Catalog),
    /// Nothing survived; render the empty state
    Empty,
}

impl FilterOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::Empty)
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            FilterOutcome::Matches(catalog) => Some(catalog),
            FilterOutcome::Empty => None,
        }
    }

    /// Number of item entries shown.
    pub fn visible_count(&self) -> usize {
        self.catalog().map(Catalog::item_count).unwrap_or(0)
    }
}

/// Filter settings that come from the session rather than the user's
/// narrowing choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pipeline {
    pub language: Language,
    pub spice_mode: SpiceFilterMode,
}

impl Pipeline {
    pub fn new(language: Language, spice_mode: SpiceFilterMode) -> Self {
        Self {
            language,
            spice_mode,
        }
    }

    /// Stages that will run for `state`, in order.
    pub fn active_stages(&self, state: &FilterState) -> Vec<Stage> {
        let mut stages = Vec::new();
        if !state.search_query.is_empty() {
            stages.push(Stage::Search);
        }
        if !state.dietary.is_empty() {
            stages.push(Stage::Dietary);
        }
        if !state.spice.is_empty() && self.spice_mode == SpiceFilterMode::Enforce {
            stages.push(Stage::Spice);
        }
        if state.max_price < DEFAULT_MAX_PRICE {
            stages.push(Stage::Price);
        }
        if state.selected_category.is_some() {
            stages.push(Stage::Category);
        }
        stages
    }

    /// Run every active stage over `catalog`.
    pub fn run(&self, catalog: &Catalog, state: &FilterState) -> FilterOutcome {
        let mut current = catalog.clone();
        if current.item_count() == 0 {
            return FilterOutcome::Empty;
        }

        for stage in self.active_stages(state) {
            current = match self.run_stage(stage, current, state) {
                Some(next) if next.item_count() > 0 => next,
                _ => return FilterOutcome::Empty,
            };
        }

        FilterOutcome::Matches(current)
    }

    fn run_stage(&self, stage: Stage, catalog: Catalog, state: &FilterState) -> Option<Catalog> {
        let lang = self.language;
        match stage {
            Stage::Search => Some(retain_items(&catalog, |item| {
                matches_search(item, lang, &state.search_query)
            })),
            Stage::Dietary => Some(retain_items(&catalog, |item| {
                state.dietary.iter().all(|tag| item.has_tag(tag))
            })),
            Stage::Spice => Some(retain_items(&catalog, |item| {
                item.spice_level
                    .map(|level| state.spice.contains(&level))
                    .unwrap_or(false)
            })),
            Stage::Price => Some(retain_items(&catalog, |item| {
                price_of(item, lang) <= u64::from(state.max_price)
            })),
            Stage::Category => {
                let key = state.selected_category.as_deref()?;
                let category = catalog.get(key)?.clone();
                Some(std::iter::once(category).collect())
            }
        }
    }
}

/// Filter with English text and enforced spice selections.
pub fn filter(catalog: &Catalog, state: &FilterState) -> FilterOutcome {
    Pipeline::default().run(catalog, state)
}

/// Whether `query` (already lowercased) occurs in the item's searchable text.
pub fn matches_search(item: &MenuItem, lang: Language, query: &str) -> bool {
    item.translation(lang)
        .map(|t| t.search_text().contains(query))
        .unwrap_or(false)
}

fn price_of(item: &MenuItem, lang: Language) -> u64 {
    item.translation(lang)
        .map(|t| t.parsed_price())
        .unwrap_or(0)
}

fn retain_items<F>(catalog: &Catalog, keep: F) -> Catalog
where
    F: Fn(&MenuItem) -> bool,
{
    catalog
        .iter()
        .filter_map(|category| {
            let items: Vec<MenuItem> = category.items.iter().filter(|i| keep(i)).cloned().collect();
            (!items.is_empty()).then(|| category.with_items(items))
        })
        .collect()
}
