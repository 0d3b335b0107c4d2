#![forbid(unsafe_code)]

//! Tour definitions and the catalog that holds them.
//!
//! # Invariants
//!
//! 1. Every [`Tour`] has at least one step.
//! 2. Step ids are unique within a tour (not across tours).
//! 3. Tour ids are unique within a [`TourCatalog`].
//! 4. Tours are immutable once constructed and shared as `Arc<Tour>`.
//!
//! # File format
//!
//! Catalogs can be loaded from TOML or JSON. Both use a top-level `tours`
//! list:
//!
//! ```toml
//! [[tours]]
//! id = "initial-setup"
//! name = "Initial Setup Guide"
//! description = "Get started with platform configuration"
//! category = "setup"
//!
//! [[tours.steps]]
//! id = "welcome"
//! title = "Welcome!"
//! content = "Let's start with the basics."
//! target = "body"
//! position = "center"
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Grouping used by the tour selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourCategory {
    Setup,
    Features,
    Advanced,
}

impl TourCategory {
    pub const ALL: [TourCategory; 3] = [Self::Setup, Self::Features, Self::Advanced];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Features => "features",
            Self::Advanced => "advanced",
        }
    }

    /// Heading shown above the category's tours.
    #[must_use]
    pub const fn heading(self) -> &'static str {
        match self {
            Self::Setup => "Setup Tours",
            Self::Features => "Features Tours",
            Self::Advanced => "Advanced Tours",
        }
    }
}

impl fmt::Display for TourCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TourCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown tour category: {s}"))
    }
}

/// Side of the anchor the popup attaches to.
///
/// `Center` ignores the anchor and centers the popup in the viewport; it is
/// used for introductory steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Center,
}

impl Placement {
    pub const ALL: [Placement; 5] = [
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
        Self::Center,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown placement: {s}"))
    }
}

/// Interaction a step expects from the user. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Click,
    Input,
    Navigate,
    Wait,
}

// ---------------------------------------------------------------------------
// TourStep
// ---------------------------------------------------------------------------

/// One instruction screen bound to a UI location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStep {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Selector for the element to anchor to.
    pub target: String,
    #[serde(default)]
    pub position: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<StepAction>,
    #[serde(
        default,
        rename = "actionText",
        alias = "action_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_text: Option<String>,
}

impl TourStep {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        target: impl Into<String>,
        position: Placement,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            target: target.into(),
            position,
            action: None,
            action_text: None,
        }
    }

    #[must_use]
    pub fn action(mut self, action: StepAction) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn action_text(mut self, text: impl Into<String>) -> Self {
        self.action_text = Some(text.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Tour
// ---------------------------------------------------------------------------

/// A named, ordered, non-empty sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tour {
    id: String,
    name: String,
    description: String,
    category: TourCategory,
    steps: Vec<TourStep>,
}

impl Tour {
    /// Build a tour, rejecting empty step lists and duplicate step ids.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: TourCategory,
        steps: Vec<TourStep>,
    ) -> Result<Self, CatalogError> {
        let tour = Self::assemble(id, name, description, category, steps);
        tour.validate()?;
        Ok(tour)
    }

    /// Construct without validation. Callers guarantee the invariants.
    pub(crate) fn assemble(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: TourCategory,
        steps: Vec<TourStep>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            steps,
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.steps.is_empty() {
            return Err(CatalogError::EmptyTour {
                tour_id: self.id.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(CatalogError::DuplicateStep {
                    tour_id: self.id.clone(),
                    step_id: step.id.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> TourCategory {
        self.category
    }

    #[must_use]
    pub fn steps(&self) -> &[TourStep] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, index: usize) -> Option<&TourStep> {
        self.steps.get(index)
    }

    /// Number of steps. Always at least one.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

/// Serialized shape of a tour; converted through [`Tour::new`].
#[derive(Debug, Deserialize)]
struct TourDef {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    category: TourCategory,
    #[serde(default)]
    steps: Vec<TourStep>,
}

impl TryFrom<TourDef> for Tour {
    type Error = CatalogError;

    fn try_from(def: TourDef) -> Result<Self, Self::Error> {
        Tour::new(def.id, def.name, def.description, def.category, def.steps)
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tours: Vec<TourDef>,
}

// ---------------------------------------------------------------------------
// TourCatalog
// ---------------------------------------------------------------------------

/// Tours of one category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: TourCategory,
    pub tours: Vec<Arc<Tour>>,
}

/// Static registry of available tours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TourCatalog {
    tours: Vec<Arc<Tour>>,
}

impl TourCatalog {
    /// Build a catalog, rejecting duplicate tour ids.
    pub fn new(tours: impl IntoIterator<Item = Tour>) -> Result<Self, CatalogError> {
        let tours: Vec<Arc<Tour>> = tours.into_iter().map(Arc::new).collect();
        let mut seen = HashSet::with_capacity(tours.len());
        for tour in &tours {
            if !seen.insert(tour.id()) {
                return Err(CatalogError::DuplicateTour {
                    tour_id: tour.id().to_string(),
                });
            }
        }
        Ok(Self { tours })
    }

    /// The tours bundled with the dashboard.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            tours: crate::builtin::builtin_tours()
                .into_iter()
                .map(Arc::new)
                .collect(),
        }
    }

    /// Parse a catalog from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s).map_err(CatalogError::Toml)?;
        Self::from_file(file)
    }

    /// Parse a catalog from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(s).map_err(CatalogError::Json)?;
        Self::from_file(file)
    }

    /// Load a catalog file; `.toml` and `.json` extensions pick the format.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(CatalogError::Io)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&contents),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&contents),
            _ => Err(CatalogError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        let tours = file
            .tours
            .into_iter()
            .map(Tour::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let catalog = Self::new(tours)?;
        tracing::debug!(
            target: "wayfinder.runtime",
            tours = catalog.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// All tours in catalog order.
    #[must_use]
    pub fn list(&self) -> &[Arc<Tour>] {
        &self.tours
    }

    /// Tours grouped by category.
    ///
    /// Categories appear in the order their first tour appears in the
    /// catalog; tours keep catalog order inside each group.
    #[must_use]
    pub fn grouped(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for tour in &self.tours {
            match groups.iter_mut().find(|g| g.category == tour.category()) {
                Some(group) => group.tours.push(Arc::clone(tour)),
                None => groups.push(CategoryGroup {
                    category: tour.category(),
                    tours: vec![Arc::clone(tour)],
                }),
            }
        }
        groups
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<Tour>> {
        self.tours.iter().find(|t| t.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tours.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tours.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from building or loading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// I/O error reading a catalog file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// File extension is neither `.toml` nor `.json`.
    UnsupportedFormat(PathBuf),
    /// A tour has no steps.
    EmptyTour { tour_id: String },
    /// Two steps of one tour share an id.
    DuplicateStep { tour_id: String, step_id: String },
    /// Two tours share an id.
    DuplicateTour { tour_id: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported catalog format: {}", path.display())
            }
            Self::EmptyTour { tour_id } => write!(f, "tour {tour_id:?} has no steps"),
            Self::DuplicateStep { tour_id, step_id } => {
                write!(f, "tour {tour_id:?} has duplicate step id {step_id:?}")
            }
            Self::DuplicateTour { tour_id } => write!(f, "duplicate tour id {tour_id:?}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}
