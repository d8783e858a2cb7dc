//! Render contract: turns a filter outcome into a view model, and the view
//! model into plain text.

use crate::error::FeatureUnavailable;
use crate::filter::FilterOutcome;
use crate::i18n::Language;
use crate::menu::{Catalog, DietaryTag, MenuItem};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    Veg,
    NonVeg,
    GlutenFree,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Veg => "Veg",
            Badge::NonVeg => "Non-Veg",
            Badge::GlutenFree => "GF",
        }
    }

    /// Badges in display order: Veg, Non-Veg, GF.
    pub fn for_item(item: &MenuItem) -> Vec<Badge> {
        [
            (DietaryTag::Veg, Badge::Veg),
            (DietaryTag::NonVeg, Badge::NonVeg),
            (DietaryTag::GlutenFree, Badge::GlutenFree),
        ]
        .into_iter()
        .filter(|(tag, _)| item.has_tag(tag))
        .map(|(_, badge)| badge)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CardAction {
    View,
    Ar,
    Video,
}

impl CardAction {
    /// View always; 3D only with a model; Video only with a video.
    pub fn for_item(item: &MenuItem) -> Vec<CardAction> {
        let mut actions = vec![CardAction::View];
        if item.model.is_some() {
            actions.push(CardAction::Ar);
        }
        if item.video.is_some() {
            actions.push(CardAction::Video);
        }
        actions
    }

    pub fn label(&self, lang: Language) -> &'static str {
        let strings = lang.strings();
        match self {
            CardAction::View => strings.action_view,
            CardAction::Ar => strings.action_ar,
            CardAction::Video => strings.action_video,
        }
    }

    /// Localized action labels joined into one caption line.
    pub fn caption(actions: &[CardAction], lang: Language) -> String {
        actions
            .iter()
            .map(|action| action.label(lang))
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

// ==================== Social Proof ====================

/// Popularity signals shown over a card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProof {
    pub orders_last_hour: u32,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub chef_pick: bool,
}

/// Social proof keyed by item id.
pub type SocialProofBoard = HashMap<String, SocialProof>;

// ==================== View Model ====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub desc: String,
    pub ingredients: Option<String>,
    pub image: String,
    pub badges: Vec<Badge>,
    pub actions: Vec<CardAction>,
    pub social_proof: Option<SocialProof>,
}

impl CardView {
    pub fn new(item: &MenuItem, lang: Language, social: Option<&SocialProofBoard>) -> Self {
        let translation = item.translation(lang).cloned().unwrap_or_default();
        Self {
            id: item.id.clone(),
            name: if translation.name.is_empty() {
                item.id.clone()
            } else {
                translation.name
            },
            price: translation.price,
            desc: translation.desc,
            ingredients: translation.ingredients.filter(|i| !i.trim().is_empty()),
            image: item.image.clone(),
            badges: Badge::for_item(item),
            actions: CardAction::for_item(item),
            social_proof: social.and_then(|board| board.get(&item.id)).cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    pub key: String,
    pub label: String,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub language: String,
    pub sections: Vec<SectionView>,
    /// Set when there is nothing to show
    pub empty_message: Option<String>,
}

impl MenuView {
    pub fn is_empty(&self) -> bool {
        self.empty_message.is_some()
    }

    pub fn card_count(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }
}

/// Build the view for a filter outcome.
pub fn render(
    outcome: &FilterOutcome,
    lang: Language,
    social: Option<&SocialProofBoard>,
) -> MenuView {
    let sections: Vec<SectionView> = outcome
        .catalog()
        .map(|catalog| {
            catalog
                .iter()
                .filter(|category| !category.items.is_empty())
                .map(|category| SectionView {
                    key: category.key.clone(),
                    label: category.label_for(lang).to_string(),
                    cards: category
                        .items
                        .iter()
                        .map(|item| CardView::new(item, lang, social))
                        .collect(),
                })
                .collect()
        })
        .unwrap_or_default();

    let empty_message = sections
        .is_empty()
        .then(|| lang.strings().empty_state.to_string());

    MenuView {
        language: lang.code().to_string(),
        sections,
        empty_message,
    }
}

// ==================== Category Navigation ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub key: String,
    pub label: String,
    pub active: bool,
}

/// One entry per catalog category, marking the selected one.
pub fn category_nav(catalog: &Catalog, lang: Language, selected: Option<&str>) -> Vec<NavEntry> {
    catalog
        .iter()
        .map(|category| NavEntry {
            key: category.key.clone(),
            label: category.label_for(lang).to_string(),
            active: selected == Some(category.key.as_str()),
        })
        .collect()
}

// ==================== Item Detail ====================

/// Everything the detail view shows for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub card: CardView,
    pub category: Option<String>,
    model: Option<String>,
    video: Option<String>,
}

impl ItemDetail {
    pub fn new(catalog: &Catalog, item: &MenuItem, lang: Language) -> Self {
        Self {
            card: CardView::new(item, lang, None),
            category: catalog.find_item_category(&item.id).map(str::to_string),
            model: item.model.clone(),
            video: item.video.clone(),
        }
    }

    /// 3D model to open in the AR viewer.
    pub fn ar_model(&self) -> Result<&str, FeatureUnavailable> {
        self.model.as_deref().ok_or(FeatureUnavailable::ArViewer)
    }

    pub fn video_url(&self) -> Result<&str, FeatureUnavailable> {
        self.video.as_deref().ok_or(FeatureUnavailable::VideoPlayer)
    }
}

// ==================== Text Output ====================

impl fmt::Display for CardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}  {}", self.name, self.price)?;
        for badge in &self.badges {
            write!(f, "  [{}]", badge.label())?;
        }
        writeln!(f)?;
        if !self.desc.is_empty() {
            writeln!(f, "    {}", self.desc)?;
        }
        if let Some(ingredients) = &self.ingredients {
            writeln!(f, "    {}", ingredients)?;
        }
        if let Some(proof) = &self.social_proof {
            write!(f, "    ")?;
            if proof.popular {
                write!(f, "Popular · ")?;
            }
            if proof.chef_pick {
                write!(f, "Chef Pick · ")?;
            }
            writeln!(
                f,
                "{} ordered · ★ {:.1} ({})",
                proof.orders_last_hour, proof.rating, proof.reviews
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for MenuView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.empty_message {
            return writeln!(f, "{}", message);
        }
        for section in &self.sections {
            write!(f, "{}", section)?;
        }
        Ok(())
    }
}

impl fmt::Display for SectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.label)?;
        for card in &self.cards {
            write!(f, "{}", card)?;
        }
        writeln!(f)
    }
}
