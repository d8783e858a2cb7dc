//! Terminal menu browser.
//!
//! Usage:
//!   cargo run -- [--search TEXT] [--veg | --non-veg | --gluten-free | --diet TAG]
//!                [--spice 0-3] [--max-price N] [--category KEY] [--lang CODE]
//!                [--voice "show me starters"] [--item ID] [--social FILE]
//!   cargo run -- --specials          # Today's specials instead of the catalog
//!   cargo run -- --interactive       # Read commands and searches from stdin
//!
//! Configuration comes from the environment (see `Config::from_env`).

use anyhow::{bail, Context, Result};
use menu_browser::catalog::{self, CatalogSource};
use menu_browser::config::Config;
use menu_browser::filter::{FilterAction, FilterOutcome, FilterState, Pipeline};
use menu_browser::i18n::Language;
use menu_browser::input::{Debouncer, Throttle};
use menu_browser::menu::{Catalog, DietaryTag, SpiceLevel};
use menu_browser::preferences::{recommend, BehaviorEvent, Preferences};
use menu_browser::render::{
    self, category_nav, CardAction, ItemDetail, SectionView, SocialProofBoard,
};
use menu_browser::specials;
use menu_browser::voice::{self, Section, VoiceEffect};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct CliArgs {
    actions: Vec<FilterAction>,
    lang: Option<String>,
    voice: Vec<String>,
    item: Option<String>,
    social: Option<PathBuf>,
    specials: bool,
    interactive: bool,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("{} expects a value", name))
        };
        match arg.as_str() {
            "--search" => parsed.actions.push(FilterAction::SetSearch(value("--search")?)),
            "--veg" => parsed.actions.push(FilterAction::ToggleDietary(DietaryTag::Veg)),
            "--non-veg" => parsed.actions.push(FilterAction::ToggleDietary(DietaryTag::NonVeg)),
            "--gluten-free" => parsed
                .actions
                .push(FilterAction::ToggleDietary(DietaryTag::GlutenFree)),
            "--diet" => parsed
                .actions
                .push(FilterAction::ToggleDietary(DietaryTag::from(value("--diet")?))),
            "--spice" => {
                let level: SpiceLevel = value("--spice")?.parse().map_err(anyhow::Error::msg)?;
                parsed.actions.push(FilterAction::ToggleSpice(level));
            }
            "--max-price" => {
                let price = value("--max-price")?
                    .parse()
                    .context("--max-price expects a whole number")?;
                parsed.actions.push(FilterAction::SetMaxPrice(price));
            }
            "--category" => parsed
                .actions
                .push(FilterAction::SelectCategory(Some(value("--category")?))),
            "--lang" => parsed.lang = Some(value("--lang")?),
            "--voice" => parsed.voice.push(value("--voice")?),
            "--item" => parsed.item = Some(value("--item")?),
            "--social" => parsed.social = Some(value("--social")?.into()),
            "--specials" => parsed.specials = true,
            "--interactive" | "-i" => parsed.interactive = true,
            other => bail!("Unknown argument '{}'", other),
        }
    }

    Ok(parsed)
}

/// Only searches longer than two characters count as behavior.
fn tracks_search(query: &str) -> bool {
    query.trim().chars().count() > 2
}

fn load_social_proof(path: &Path) -> Result<SocialProofBoard> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse social proof in {}", path.display()))
}

/// Browsing session: the loaded catalog plus everything the user changes.
struct Session {
    catalog: Catalog,
    pipeline: Pipeline,
    state: FilterState,
    prefs: Preferences,
    social: Option<SocialProofBoard>,
    /// Next section shown when scrolling; reset whenever the filters change.
    scroll: usize,
}

impl Session {
    fn new(
        catalog: Catalog,
        pipeline: Pipeline,
        prefs: Preferences,
        social: Option<SocialProofBoard>,
    ) -> Self {
        Self {
            catalog,
            pipeline,
            state: FilterState::new(),
            prefs,
            social,
            scroll: 0,
        }
    }

    fn lang(&self) -> Language {
        self.pipeline.language
    }

    fn apply(&mut self, action: FilterAction) {
        if let FilterAction::ToggleDietary(tag) = &action {
            self.prefs
                .behavior
                .record(BehaviorEvent::FilterApplied(tag.clone()));
        }
        let searched = match &action {
            FilterAction::SetSearch(query) if tracks_search(query) => Some(query.clone()),
            _ => None,
        };

        self.state = std::mem::take(&mut self.state).apply(action);
        self.scroll = 0;

        if let Some(query) = searched {
            let results = self.outcome().visible_count();
            self.prefs
                .behavior
                .record(BehaviorEvent::Search { query, results });
        }
    }

    fn outcome(&self) -> FilterOutcome {
        self.pipeline.run(&self.catalog, &self.state)
    }

    fn show_menu(&self) {
        let outcome = self.outcome();
        let lang = self.lang();

        let nav: Vec<String> = category_nav(&self.catalog, lang, self.state.selected_category())
            .into_iter()
            .map(|entry| {
                if entry.active {
                    format!("[{}]", entry.label)
                } else {
                    entry.label
                }
            })
            .collect();
        println!("{}", nav.join(" | "));

        let mut caption = format!(
            "{} dishes · {}",
            outcome.visible_count(),
            lang.strings().format_price_ceiling(self.state.max_price())
        );
        if self.state.has_active_filters() {
            caption.push_str(" · filters active");
        }
        println!("{}\n", caption);
        print!("{}", render::render(&outcome, lang, self.social.as_ref()));
    }

    /// The section after the last one scrolled to, wrapping at the end.
    fn next_section(&mut self) -> Option<SectionView> {
        let view = render::render(&self.outcome(), self.lang(), self.social.as_ref());
        if view.sections.is_empty() {
            return None;
        }
        let index = self.scroll % view.sections.len();
        self.scroll = index + 1;
        view.sections.into_iter().nth(index)
    }

    fn scroll_down(&mut self) {
        match self.next_section() {
            Some(section) => print!("{}", section),
            None => println!("{}", self.lang().strings().empty_state),
        }
    }

    fn show_item(&mut self, id: &str) {
        let Some(item) = self.catalog.find_item_by_id(id) else {
            println!("No dish with id '{}'", id);
            return;
        };
        let detail = ItemDetail::new(&self.catalog, item, self.lang());

        print!("{}", detail.card);
        if let Some(category) = &detail.category {
            println!("    Category: {}", category);
        }
        println!("    {}", CardAction::caption(&detail.card.actions, self.lang()));
        match detail.ar_model() {
            Ok(model) => println!("    3D model: {}", model),
            Err(unavailable) => println!("    {}", unavailable),
        }
        if let Ok(video) = detail.video_url() {
            println!("    Video: {}", video);
        }

        self.prefs
            .behavior
            .record(BehaviorEvent::ItemView(id.to_string()));
    }

    /// Run a spoken or typed command. Returns false when it was not a command.
    async fn handle_voice(&mut self, transcript: &str, source: &CatalogSource) -> Result<bool> {
        if voice::VoiceCommand::parse(transcript).is_none() {
            return Ok(false);
        }
        let response = voice::interpret(transcript, &self.catalog);
        println!("> {}", response.feedback);

        match response.effect {
            VoiceEffect::Filter(action) => {
                self.apply(action);
                self.show_menu();
            }
            VoiceEffect::OpenItem(id) => self.show_item(&id),
            VoiceEffect::Navigate(Section::Specials) => {
                show_specials(source, self.lang(), self.social.as_ref()).await?
            }
            VoiceEffect::Navigate(Section::Menu) => self.show_menu(),
            VoiceEffect::Navigate(section) => info!("No terminal page for {:?}", section),
            VoiceEffect::SetTheme(theme) => self.prefs.theme = theme,
            VoiceEffect::Nothing => {}
        }
        Ok(true)
    }

    /// Read stdin line by line. Commands run at once; anything else is search
    /// text, applied once typing has paused for the debounce delay.
    async fn interactive(&mut self, config: &Config, source: &CatalogSource) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut search = Debouncer::new(config.search_debounce);
        let mut scrolling = Throttle::new(config.scroll_throttle);

        println!(
            "Type a search, a command (\"show me starters\"), \"view <id>\", or \"quit\". \
             Press Enter to scroll."
        );
        loop {
            let deadline = search
                .deadline()
                .map(tokio::time::Instant::from_std)
                .unwrap_or_else(tokio::time::Instant::now);

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read stdin")? else { break };
                    let line = line.trim();
                    if line.eq_ignore_ascii_case("quit") {
                        break;
                    }
                    if line.is_empty() {
                        if scrolling.ready(std::time::Instant::now()) {
                            self.scroll_down();
                        }
                        continue;
                    }
                    if let Some(id) = line.strip_prefix("view ") {
                        self.show_item(id.trim());
                        continue;
                    }
                    if !self.handle_voice(line, source).await? {
                        search.submit(line.to_string(), std::time::Instant::now());
                    }
                }
                _ = tokio::time::sleep_until(deadline), if search.is_pending() => {
                    if let Some(query) = search.poll(std::time::Instant::now()) {
                        self.apply(FilterAction::SetSearch(query));
                        self.show_menu();
                    }
                }
            }
        }

        // Flush a search typed right before EOF
        if let Some(query) = search.poll(std::time::Instant::now() + config.search_debounce) {
            self.apply(FilterAction::SetSearch(query));
            self.show_menu();
        }
        Ok(())
    }
}

async fn show_specials(
    source: &CatalogSource,
    lang: Language,
    social: Option<&SocialProofBoard>,
) -> Result<()> {
    let items = specials::load_specials(source).await?;
    print!("{}", specials::render_specials(&items, lang, social));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("menu_browser=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;

    let mut prefs = Preferences::load(&config.preferences_path)?;
    let lang = match &args.lang {
        Some(code) => Language::from_code(code)?,
        None => config.language,
    };
    prefs.set_language(lang);

    let social = args.social.as_deref().map(load_social_proof).transpose()?;
    let source = CatalogSource::from_config(&config);

    if args.specials {
        return show_specials(&source, lang, social.as_ref()).await;
    }

    // Step 1: Load the catalog
    let catalog = match catalog::load(&source).await {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Catalog load failed: {}", e);
            println!("{}", lang.strings().load_failed);
            return Err(e.into());
        }
    };

    let mut session = Session::new(
        catalog,
        Pipeline::new(lang, config.spice_filter_mode),
        prefs,
        social,
    );
    session.prefs.behavior.record(BehaviorEvent::PageView);

    // Step 2: Apply flags, then voice commands
    for action in args.actions {
        session.apply(action);
    }
    for transcript in &args.voice {
        if !session.handle_voice(transcript, &source).await? {
            let response = voice::interpret(transcript, &session.catalog);
            println!("> {}", response.feedback);
        }
    }

    // Step 3: Show the result
    if let Some(id) = &args.item {
        session.show_item(id);
    } else if args.voice.is_empty() {
        session.show_menu();
    }

    if args.interactive {
        session.interactive(&config, &source).await?;
    }

    let interest = session.prefs.behavior.analyze(&session.catalog);
    if interest.total_interactions > 0 {
        println!("\nTip: {}", recommend(&interest).message);
    }

    if let Err(e) = session.prefs.save(&config.preferences_path) {
        warn!("Could not save preferences: {:#}", e);
    }
    Ok(())
}
