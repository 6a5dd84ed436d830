#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod roster;
pub mod store;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig};
pub use ir::{Gender, MemberForm, Person, PersonAttributes, PersonId, RelationKind, Role};
pub use layout::{Layout, LayoutError, compute_layout};
pub use roster::{BuiltRoster, Roster, RosterError, parse_roster};
pub use store::{FamilyStore, StoreError};
pub use theme::Theme;

/// Theme and layout settings for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn midnight() -> Self {
        Self {
            theme: Theme::midnight(),
            layout: LayoutConfig::default(),
        }
    }
}

/// Lays out and draws a store with the given options.
pub fn render_store_svg(store: &FamilyStore, options: &RenderOptions) -> Result<String, LayoutError> {
    let layout = compute_layout(store, &options.theme, &options.layout)?;
    Ok(render::render_svg(&layout, store, &options.theme, &options.layout))
}

/// Parses a JSON5 roster, replays it, and renders the resulting tree.
pub fn render_roster_svg(source: &str, options: &RenderOptions) -> anyhow::Result<String> {
    let built = parse_roster(source)?.build()?;
    Ok(render_store_svg(&built.store, options)?)
}
