//! Voice commands: turn a recognized transcript into a browsing effect.
//!
//! Speech recognition happens elsewhere; this module only sees the text.

use crate::filter::FilterAction;
use crate::i18n::Language;
use crate::menu::{Catalog, DietaryTag, SpiceLevel};
use crate::preferences::Theme;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// Parsed form of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    ShowCategory(String),
    Search(String),
    Filter(String),
    ClearFilters,
    ShowAll,
    WhatIs(String),
    Open(String),
    DarkMode,
    LightMode,
}

#[derive(Debug, Clone, Copy)]
enum Pattern {
    ShowCategory,
    Search,
    Filter,
    ClearFilters,
    ShowAll,
    WhatIs,
    Open,
    DarkMode,
    LightMode,
}

/// Patterns are tried in this order; the first match wins.
static PATTERNS: OnceLock<Vec<(Regex, Pattern)>> = OnceLock::new();

fn patterns() -> &'static [(Regex, Pattern)] {
    PATTERNS.get_or_init(|| {
        [
            ("show me (.*)", Pattern::ShowCategory),
            ("search for (.*)", Pattern::Search),
            ("filter (.*)", Pattern::Filter),
            ("clear filters", Pattern::ClearFilters),
            ("show all", Pattern::ShowAll),
            ("what is (.*)", Pattern::WhatIs),
            ("open (.*)", Pattern::Open),
            ("dark mode", Pattern::DarkMode),
            ("light mode", Pattern::LightMode),
        ]
        .into_iter()
        .map(|(source, pattern)| {
            let regex = RegexBuilder::new(source)
                .case_insensitive(true)
                .build()
                .expect("voice command patterns are valid");
            (regex, pattern)
        })
        .collect()
    })
}

impl VoiceCommand {
    /// Match a transcript against the known commands.
    pub fn parse(transcript: &str) -> Option<VoiceCommand> {
        patterns().iter().find_map(|(regex, pattern)| {
            let captures = regex.captures(transcript)?;
            let arg = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();

            Some(match pattern {
                Pattern::ShowCategory => VoiceCommand::ShowCategory(arg),
                Pattern::Search => VoiceCommand::Search(arg),
                Pattern::Filter => VoiceCommand::Filter(arg),
                Pattern::ClearFilters => VoiceCommand::ClearFilters,
                Pattern::ShowAll => VoiceCommand::ShowAll,
                Pattern::WhatIs => VoiceCommand::WhatIs(arg),
                Pattern::Open => VoiceCommand::Open(arg),
                Pattern::DarkMode => VoiceCommand::DarkMode,
                Pattern::LightMode => VoiceCommand::LightMode,
            })
        })
    }
}

/// Pages a voice command can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Menu,
    Specials,
    Ambience,
    Story,
}

impl Section {
    pub fn from_spoken(name: &str) -> Option<Section> {
        match name.trim().to_lowercase().as_str() {
            "menu" | "home" => Some(Section::Menu),
            "specials" => Some(Section::Specials),
            "ambience" => Some(Section::Ambience),
            "story" => Some(Section::Story),
            _ => None,
        }
    }
}

/// What the controller should do in response to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEffect {
    Filter(FilterAction),
    OpenItem(String),
    Navigate(Section),
    SetTheme(Theme),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResponse {
    pub effect: VoiceEffect,
    pub feedback: String,
}

impl VoiceResponse {
    fn new(effect: VoiceEffect, feedback: impl Into<String>) -> Self {
        Self {
            effect,
            feedback: feedback.into(),
        }
    }

    fn feedback_only(feedback: impl Into<String>) -> Self {
        Self::new(VoiceEffect::Nothing, feedback)
    }
}

/// Spoken filter names.
fn spoken_filter(name: &str) -> Option<FilterAction> {
    let spice = |level| SpiceLevel::new(level).map(FilterAction::ToggleSpice);
    match name.trim().to_lowercase().as_str() {
        "vegetarian" | "veg" => Some(FilterAction::ToggleDietary(DietaryTag::Veg)),
        "non veg" | "non-vegetarian" => Some(FilterAction::ToggleDietary(DietaryTag::NonVeg)),
        "gluten free" => Some(FilterAction::ToggleDietary(DietaryTag::GlutenFree)),
        "spicy" => spice(2),
        "mild" => spice(0),
        _ => None,
    }
}

/// Parse `transcript` and resolve it against `catalog`.
pub fn interpret(transcript: &str, catalog: &Catalog) -> VoiceResponse {
    match VoiceCommand::parse(transcript) {
        Some(command) => resolve(command, catalog),
        None => VoiceResponse::feedback_only(
            "Command not recognized. Try \"show me starters\" or \"search for chicken\"",
        ),
    }
}

pub fn resolve(command: VoiceCommand, catalog: &Catalog) -> VoiceResponse {
    match command {
        VoiceCommand::ShowCategory(name) => {
            let needle = name.to_lowercase();
            match catalog.keys().find(|key| key.to_lowercase().contains(&needle)) {
                Some(key) => VoiceResponse::new(
                    VoiceEffect::Filter(FilterAction::SelectCategory(Some(key.to_string()))),
                    format!("Showing {}", key),
                ),
                None => VoiceResponse::feedback_only(format!("Category \"{}\" not found", name)),
            }
        }
        VoiceCommand::Search(query) => VoiceResponse::new(
            VoiceEffect::Filter(FilterAction::SetSearch(query.clone())),
            format!("Searching for \"{}\"", query),
        ),
        VoiceCommand::Filter(name) => match spoken_filter(&name) {
            Some(action) => VoiceResponse::new(
                VoiceEffect::Filter(action),
                format!("Applied {} filter", name),
            ),
            None => VoiceResponse::feedback_only(format!("Filter \"{}\" not recognized", name)),
        },
        VoiceCommand::ClearFilters => VoiceResponse::new(
            VoiceEffect::Filter(FilterAction::ClearFilters),
            "Filters cleared",
        ),
        VoiceCommand::ShowAll => VoiceResponse::new(
            VoiceEffect::Filter(FilterAction::ShowAll),
            "Showing all items",
        ),
        VoiceCommand::WhatIs(name) => {
            let needle = name.to_lowercase();
            let found = catalog.iter().flat_map(|c| c.items.iter()).find(|item| {
                item.translation(Language::canonical())
                    .map(|t| t.name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            });
            match found {
                Some(item) => VoiceResponse::new(
                    VoiceEffect::OpenItem(item.id.clone()),
                    format!("Showing {}", item.display_name(Language::canonical())),
                ),
                None => VoiceResponse::feedback_only(format!("Item \"{}\" not found", name)),
            }
        }
        VoiceCommand::Open(name) => match Section::from_spoken(&name) {
            Some(section) => VoiceResponse::new(
                VoiceEffect::Navigate(section),
                format!("Opening {}", name),
            ),
            None => VoiceResponse::feedback_only(format!("Section \"{}\" not found", name)),
        },
        VoiceCommand::DarkMode => {
            VoiceResponse::new(VoiceEffect::SetTheme(Theme::Dark), "Dark mode on")
        }
        VoiceCommand::LightMode => {
            VoiceResponse::new(VoiceEffect::SetTheme(Theme::Light), "Light mode on")
        }
    }
}
