#![forbid(unsafe_code)]

//! Wayfinder public facade crate.
//!
//! Re-exports the tour engine from the internal crates, adds file-backed
//! configuration, and wires a catalog, completion store and guide together
//! from a [`WayfinderConfig`].
//!
//! ```rust,ignore
//! use wayfinder::prelude::*;
//!
//! let config = WayfinderConfig::load("wayfinder.toml")?;
//! let mut guide = wayfinder::open_guide(&config, layout, surface)?;
//! guide.start("initial-setup");
//! ```

use std::fmt;
use std::sync::Arc;

pub mod config;

pub use config::{ConfigError, LogFormat, WayfinderConfig};

// --- Core re-exports -------------------------------------------------------

pub use wayfinder_core::{
    Anchor, AnchorResolver, ElementId, LayoutEntry, Point, Rect, Size, StaticLayout,
};

// --- Runtime re-exports ----------------------------------------------------

pub use wayfinder_runtime::{
    CallToAction, CatalogError, CategoryGroup, CompletionRecord, CompletionStore, EndReason,
    FileStore, MemoryStore, PersistentProgress, Placement, ProgressSink, StepAction,
    StepChangeReason, StoreError, Tour, TourCatalog, TourCategory, TourEvent, TourRuntime,
    TourStatus, TourStep,
};

// --- Overlay re-exports ----------------------------------------------------

pub use wayfinder_overlay::{
    Arrow, HighlightSurface, HighlightTreatment, Highlighter, PlacementConfig, PopupPlacement,
    ScrollOptions, StepView, TourGuide, place_popup,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Wayfinder hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    Config(ConfigError),
    /// Tour catalog could not be loaded.
    Catalog(CatalogError),
    /// Completion state could not be loaded.
    Store(StoreError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Catalog(err) => write!(f, "catalog: {err}"),
            Self::Store(err) => write!(f, "completion store: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Catalog(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Standard result type for Wayfinder APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Wiring ---------------------------------------------------------------

/// The configured catalog file, or the bundled tours when none is set.
pub fn load_catalog(config: &WayfinderConfig) -> Result<TourCatalog> {
    match &config.catalog.path {
        Some(path) => {
            let catalog = TourCatalog::from_path(path)?;
            tracing::info!(
                target: "wayfinder.runtime",
                path = %path.display(),
                tours = catalog.len(),
                "tour catalog loaded"
            );
            Ok(catalog)
        }
        None => Ok(TourCatalog::builtin()),
    }
}

/// A runtime over the configured catalog.
///
/// The config is validated first. With `storage.path` set, completion state
/// is restored from that file and every later transition is written back
/// to it.
pub fn open_runtime(config: &WayfinderConfig) -> Result<TourRuntime> {
    config.check()?;
    let catalog = load_catalog(config)?;
    let mut runtime = TourRuntime::new(Arc::new(catalog));
    if let Some(path) = &config.storage.path {
        let sink = PersistentProgress::open(FileStore::new(path))?;
        runtime.restore(sink.record());
        runtime.subscribe(Box::new(sink));
    }
    Ok(runtime)
}

/// A guide with configured placement and highlighting. Fails on an invalid
/// config, as [`open_runtime`] does.
pub fn open_guide<R, S>(
    config: &WayfinderConfig,
    resolver: R,
    surface: S,
) -> Result<TourGuide<R, S>>
where
    R: AnchorResolver,
    S: HighlightSurface,
{
    let runtime = open_runtime(config)?;
    Ok(TourGuide::new(runtime, resolver, surface)
        .with_placement(config.to_placement_config())
        .with_highlight(config.to_highlighter()))
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        AnchorResolver, Error, HighlightSurface, Placement, Rect, Result, Size, StaticLayout,
        StepView, TourCatalog, TourEvent, TourGuide, TourRuntime, TourStatus, WayfinderConfig,
    };

    pub use crate::{core, overlay, runtime};
}

pub use wayfinder_core as core;
pub use wayfinder_overlay as overlay;
pub use wayfinder_runtime as runtime;
