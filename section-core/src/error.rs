use std::fmt;

use thiserror::Error;

/// Result type for section processing.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that stop a stage from producing output.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load dataset: {0}")]
    Load(String),

    #[error("dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("section not found: {0}")]
    SectionNotFound(String),

    #[error("section {0} has no coordinates to compute an extent from")]
    EmptyExtent(String),

    #[error("need at least 3 vertices to triangulate, got {0}")]
    InsufficientVertices(usize),

    #[error("triangulation failed: {0}")]
    Triangulation(String),
}

impl Error {
    /// The skip-and-continue condition behind this error, for callers that
    /// collect diagnostics alongside results.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::EmptyExtent(section) => Some(Diagnostic::EmptyExtent {
                section: section.clone(),
                space: Space::Plan,
            }),
            _ => None,
        }
    }
}

/// Which coordinate space a polygon was being prepared in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Space {
    Plan,
    Scene,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Plan => f.write_str("2D"),
            Space::Scene => f.write_str("3D"),
        }
    }
}

/// Recoverable conditions. Processing skips the offending item and continues.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A vertex record had missing, null or too few coordinates.
    InvalidVertex {
        section: String,
        polygon: usize,
        vertex: usize,
        space: Space,
    },
    /// A borehole lacked a usable horizontal position or elevation.
    InvalidBorehole { section: String, borehole: usize },
    /// A polygon had fewer than three usable vertices in the rendered space.
    InsufficientVertices {
        section: String,
        polygon: usize,
        count: usize,
        space: Space,
    },
    /// A later section reused an earlier section's name and was dropped.
    DuplicateSection(String),
    /// Nothing in the section carries coordinates; rendering was aborted.
    EmptyExtent { section: String, space: Space },
    /// The 3D grid had no polygon bounds and fell back to the default square.
    DefaultGridBounds(String),
    /// Ear clipping rejected the ring; the fan was used instead.
    TriangulationFallback { section: String, polygon: usize },
}

impl Diagnostic {
    /// Forward the diagnostic to the `log` facade at warning level.
    pub fn emit(&self) {
        log::warn!("{self}");
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidVertex {
                section,
                polygon,
                vertex,
                space,
            } => write!(
                f,
                "section {section}: polygon {polygon} has an invalid {space} vertex at {vertex}, dropped"
            ),
            Diagnostic::InvalidBorehole { section, borehole } => write!(
                f,
                "section {section}: borehole {borehole} has no usable position, skipped"
            ),
            Diagnostic::InsufficientVertices {
                section,
                polygon,
                count,
                space,
            } => write!(
                f,
                "section {section}: polygon {polygon} has {count} {space} vertices, skipped"
            ),
            Diagnostic::DuplicateSection(name) => {
                write!(f, "duplicate section name {name}, later copy ignored")
            }
            Diagnostic::EmptyExtent { section, space } => {
                write!(f, "section {section}: no {space} data to render")
            }
            Diagnostic::DefaultGridBounds(section) => write!(
                f,
                "section {section}: no valid polygon data for bounding grid, using defaults"
            ),
            Diagnostic::TriangulationFallback { section, polygon } => write!(
                f,
                "section {section}: ear clipping failed for polygon {polygon}, using fan"
            ),
        }
    }
}
