//! Evaluation context handed to every renderer.
//!
//! Different drivers spell positional parameters differently. The context
//! carries that choice plus the number of parameters already bound, so a
//! renderer can emit the right marker without seeing the builder.

/// Positional parameter marker style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `?` (SQLite, DuckDB, MySQL).
    #[default]
    Question,
    /// `$1`, `$2`, ... numbered by parameter position (PostgreSQL).
    Dollar,
}

/// Default limit for group nesting in textual filters.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration and per-render state for condition building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    placeholder: Placeholder,
    max_depth: usize,
    bound: usize,
}

impl Context {
    /// Creates a context with `?` placeholders.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            placeholder: Placeholder::Question,
            max_depth: DEFAULT_MAX_DEPTH,
            bound: 0,
        }
    }

    /// Sets the placeholder style.
    #[must_use]
    pub const fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Sets how deeply textual filters may nest groups.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the placeholder style.
    #[must_use]
    pub const fn placeholder_style(&self) -> Placeholder {
        self.placeholder
    }

    /// Returns the group nesting limit for textual filters.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns how many parameters were bound before the current render.
    #[must_use]
    pub const fn bound(&self) -> usize {
        self.bound
    }

    pub(crate) fn set_bound(&mut self, bound: usize) {
        self.bound = bound;
    }

    /// Returns the marker for the next parameter.
    #[must_use]
    pub fn placeholder(&self) -> String {
        self.marker(self.bound + 1)
    }

    /// Returns `count` comma-separated markers for consecutive parameters.
    #[must_use]
    pub fn placeholders(&self, count: usize) -> String {
        let markers: Vec<String> = (1..=count).map(|i| self.marker(self.bound + i)).collect();
        markers.join(", ")
    }

    fn marker(&self, position: usize) -> String {
        match self.placeholder {
            Placeholder::Question => String::from("?"),
            Placeholder::Dollar => format!("${position}"),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
