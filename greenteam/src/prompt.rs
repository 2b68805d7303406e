//! Routing and prompt assembly.
//!
//! The final prompt is `prompt + context block + SUFFIX`. The context block
//! carries the optional city, lookback window and stored CSV location, and is
//! `"\n"` when none of them apply, so the result always ends with [`SUFFIX`].

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};
use crate::registry::Specialist;
use crate::upload::Upload;

/// Fixed instruction suffix of every assembled prompt.
pub const SUFFIX: &str =
    "Instructions: Prefer official sources; keep bullets concise; include links/dates where applicable.";

/// Routing-mode label for the coordinator.
pub const MODE_COORDINATOR: &str = "Team Coordinator";

/// Routing-mode label for a single specialist.
pub const MODE_SPECIALIST: &str = "Single Specialist";

/// Default lookback window offered by the form.
pub const DEFAULT_MONTHS: u8 = 12;

/// Which agent handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// The coordinator, which may delegate to any specialist.
    #[default]
    Coordinator,
    /// One specialist, directly.
    Specialist(Specialist),
}

impl Route {
    /// Parse a routing mode and specialist selection.
    ///
    /// In single-specialist mode the selection is required and must be one
    /// of the four display names. The selection is ignored in coordinator
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an unknown mode, a missing selection
    /// or an unknown specialist.
    pub fn parse(mode: &str, specialist: Option<&str>) -> Result<Self> {
        match mode.trim() {
            MODE_COORDINATOR => Ok(Self::Coordinator),
            MODE_SPECIALIST => {
                let name = specialist
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| Error::validation("a specialist must be selected"))?;
                Ok(Self::Specialist(name.parse()?))
            }
            other => Err(Error::validation(format!("unknown routing mode '{other}'"))),
        }
    }

    /// The routing-mode label of this route.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Coordinator => MODE_COORDINATOR,
            Self::Specialist(_) => MODE_SPECIALIST,
        }
    }

    /// The selected specialist, if any.
    #[must_use]
    pub const fn specialist(&self) -> Option<Specialist> {
        match self {
            Self::Coordinator => None,
            Self::Specialist(sp) => Some(*sp),
        }
    }

    /// Display name of the target agent.
    #[must_use]
    pub const fn target_name(&self) -> &'static str {
        match self {
            Self::Coordinator => crate::registry::COORDINATOR_NAME,
            Self::Specialist(sp) => sp.display_name(),
        }
    }

    /// The sentence pointing the target at a stored CSV, if it gets one.
    #[must_use]
    pub fn csv_hint(&self, path: &Path) -> Option<String> {
        let path = path.display();
        match self {
            Self::Specialist(Specialist::DataAnalysis) => {
                Some(format!("CSV_PATH: {path} (read this file if needed)."))
            }
            Self::Coordinator => Some(format!(
                "If data analysis is needed, ask the Data Analysis Agent to read: {path}."
            )),
            Self::Specialist(_) => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_name())
    }
}

/// Pre-filled prompt for a route.
#[must_use]
pub const fn default_prompt(route: &Route) -> &'static str {
    match route {
        Route::Coordinator => {
            "Compare recent city-level green initiatives and summarize policy implications and data-driven impacts."
        }
        Route::Specialist(Specialist::DataAnalysis) => {
            "Analyze the uploaded CSV (if provided). Summarize PM2.5/PM10/NO2 trends with 2–3 bullets."
        }
        Route::Specialist(Specialist::News) => {
            "Find recent city-level green project announcements and summarize with sources."
        }
        Route::Specialist(Specialist::Policy) => {
            "Summarize a recent city policy update with effective dates and who is affected."
        }
        Route::Specialist(Specialist::HackerNewsScout) => {
            "Summarize the top 2 Hacker News stories on urban sustainability tech and the leading commenters."
        }
    }
}

/// One form submission.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    /// Target agent.
    pub route: Route,
    /// Free-text city, may be empty.
    pub city: String,
    /// Lookback window in months.
    pub months: Option<u8>,
    /// The user's prompt.
    pub prompt: String,
    /// Optional CSV upload.
    pub upload: Option<Upload>,
}

impl RequestForm {
    /// Create a form for the given route and prompt.
    #[must_use]
    pub fn new(route: Route, prompt: impl Into<String>) -> Self {
        Self {
            route,
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Set the city.
    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Set the lookback window.
    #[must_use]
    pub const fn months(mut self, months: u8) -> Self {
        self.months = Some(months);
        self
    }

    /// Attach an upload.
    #[must_use]
    pub fn upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    /// Reject a form that cannot be dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the prompt is blank.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(Error::validation("Please enter a prompt."));
        }
        Ok(())
    }

    /// Context lines derived from the optional fields.
    #[must_use]
    pub fn context_block(&self, csv_path: Option<&Path>) -> String {
        let mut lines = Vec::with_capacity(3);

        let city = self.city.trim();
        if !city.is_empty() {
            lines.push(format!("City: {city}"));
        }
        if let Some(months) = self.months.filter(|m| *m > 0) {
            lines.push(format!("Time window: last {months} months"));
        }
        if let Some(hint) = csv_path.and_then(|p| self.route.csv_hint(p)) {
            lines.push(hint);
        }

        if lines.is_empty() {
            "\n".to_owned()
        } else {
            format!("\n{}\n", lines.join("\n"))
        }
    }

    /// Build the request context for a stored CSV location.
    #[must_use]
    pub fn context(&self, csv_path: Option<&Path>) -> RequestContext {
        RequestContext {
            text: self.context_block(csv_path),
            csv_path: csv_path.map(|p| p.display().to_string()),
        }
    }
}

/// Derived per-request context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The context block inserted between prompt and suffix.
    pub text: String,
    /// Where the uploaded CSV was stored, if anything was uploaded.
    pub csv_path: Option<String>,
}

/// Concatenate prompt, context block and [`SUFFIX`].
#[must_use]
pub fn assemble(prompt: &str, context: &RequestContext) -> String {
    format!("{prompt}{}{SUFFIX}", context.text)
}
