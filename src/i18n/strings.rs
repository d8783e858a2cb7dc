/// Localized interface strings for a language.
///
/// Dish names and descriptions come from the catalog itself; these are the
/// few strings the browser adds around them.
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Catalog ====================
    /// Label of the synthesized "all" category
    pub all_label: &'static str,

    // ==================== States ====================
    /// Shown when the filter pipeline leaves nothing to display
    pub empty_state: &'static str,

    /// Shown when every catalog source failed
    pub load_failed: &'static str,

    // ==================== Specials ====================
    /// Section heading of the specials view
    pub specials_title: &'static str,

    /// Shown on the specials view when no special category has items
    pub specials_empty: &'static str,

    /// Price ceiling caption
    /// Placeholders: {price}
    pub price_ceiling: &'static str,

    // ==================== Card Actions ====================
    pub action_view: &'static str,
    pub action_ar: &'static str,
    pub action_video: &'static str,
}

impl LanguageStrings {
    /// String table for a language code, falling back to English.
    pub fn for_code(code: &str) -> &'static LanguageStrings {
        match code {
            "fr" => &FRENCH_STRINGS,
            "es" => &SPANISH_STRINGS,
            "it" => &ITALIAN_STRINGS,
            "jp" => &JAPANESE_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }

    /// Price ceiling caption with the amount filled in.
    pub fn format_price_ceiling(&self, price: u32) -> String {
        self.price_ceiling.replace("{price}", &price.to_string())
    }
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    all_label: "All",
    empty_state: "No dishes match your filters.",
    load_failed: "Failed to load menu. Please refresh the page.",
    specials_title: "Today's Specials",
    specials_empty: "No specials today. Check back soon!",
    price_ceiling: "Up to ₹{price}",
    action_view: "View",
    action_ar: "3D",
    action_video: "Video",
};

// ==================== French Strings ====================

pub const FRENCH_STRINGS: LanguageStrings = LanguageStrings {
    all_label: "Tout",
    empty_state: "Aucun plat ne correspond à vos filtres.",
    load_failed: "Échec du chargement du menu. Veuillez actualiser la page.",
    specials_title: "Spécialités du jour",
    specials_empty: "Pas de spécialités aujourd'hui.",
    price_ceiling: "Jusqu'à ₹{price}",
    action_view: "Voir",
    action_ar: "3D",
    action_video: "Vidéo",
};

// ==================== Spanish Strings ====================

pub const SPANISH_STRINGS: LanguageStrings = LanguageStrings {
    all_label: "Todo",
    empty_state: "Ningún plato coincide con tus filtros.",
    load_failed: "No se pudo cargar el menú. Actualiza la página.",
    specials_title: "Especialidades del día",
    specials_empty: "Hoy no hay especialidades.",
    price_ceiling: "Hasta ₹{price}",
    action_view: "Ver",
    action_ar: "3D",
    action_video: "Vídeo",
};

// ==================== Italian Strings ====================

pub const ITALIAN_STRINGS: LanguageStrings = LanguageStrings {
    all_label: "Tutti",
    empty_state: "Nessun piatto corrisponde ai filtri.",
    load_failed: "Impossibile caricare il menu. Aggiorna la pagina.",
    specials_title: "Specialità del giorno",
    specials_empty: "Nessuna specialità oggi.",
    price_ceiling: "Fino a ₹{price}",
    action_view: "Vedi",
    action_ar: "3D",
    action_video: "Video",
};

// ==================== Japanese Strings ====================

pub const JAPANESE_STRINGS: LanguageStrings = LanguageStrings {
    all_label: "すべて",
    empty_state: "条件に合う料理がありません。",
    load_failed: "メニューを読み込めませんでした。ページを更新してください。",
    specials_title: "本日のおすすめ",
    specials_empty: "本日のおすすめはありません。",
    price_ceiling: "₹{price}まで",
    action_view: "見る",
    action_ar: "3D",
    action_video: "動画",
};
