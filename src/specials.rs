//! Specials view: the categories the browsing catalog leaves out.

use crate::catalog::{self, is_special_category, CatalogSource};
use crate::error::LoadError;
use crate::i18n::Language;
use crate::menu::{Category, MenuItem};
use crate::render::{CardView, MenuView, SectionView, SocialProofBoard};
use tracing::info;

/// Items of every special category, in category order then item order.
pub fn special_items(raw: &[Category]) -> Vec<MenuItem> {
    raw.iter()
        .filter(|category| is_special_category(&category.key))
        .flat_map(|category| category.items.iter().cloned())
        .collect()
}

/// Load today's specials from the same sources as the catalog.
pub async fn load_specials(source: &CatalogSource) -> Result<Vec<MenuItem>, LoadError> {
    let raw = catalog::load_raw(source).await?;
    let items = special_items(&raw);
    info!("Loaded {} specials", items.len());
    Ok(items)
}

/// A single-section view of the specials.
pub fn render_specials(
    items: &[MenuItem],
    lang: Language,
    social: Option<&SocialProofBoard>,
) -> MenuView {
    if items.is_empty() {
        return MenuView {
            language: lang.code().to_string(),
            sections: Vec::new(),
            empty_message: Some(lang.strings().specials_empty.to_string()),
        };
    }

    MenuView {
        language: lang.code().to_string(),
        sections: vec![SectionView {
            key: "specials".to_string(),
            label: lang.strings().specials_title.to_string(),
            cards: items
                .iter()
                .map(|item| CardView::new(item, lang, social))
                .collect(),
        }],
        empty_message: None,
    }
}
