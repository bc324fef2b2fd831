//! Snapshot types published to observers.
//!
//! Every transition builds a fresh value and replaces the previous one
//! wholesale; observers only ever see complete snapshots.

use std::sync::Arc;

use dermascan_core::ProviderRecord;
use image::DynamicImage;

pub const ANALYSIS_FALLBACK_MESSAGE: &str = "Unable to analyze image. Please try again.";
pub const LOOKUP_FALLBACK_MESSAGE: &str = "Unable to fetch nearby doctors.";
pub const NO_RESULTS_MESSAGE: &str = "No dermatologists found nearby.";
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Location permission denied. Can't show nearby doctors.";

/// Outcome of the most recent classification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult {
    /// Summary line from the classifier (or its raw body when unparseable).
    Label(String),
    /// Transport failure, phrased for display.
    Failed(String),
}

impl AnalysisResult {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            AnalysisResult::Label(text) | AnalysisResult::Failed(text) => text,
        }
    }
}

/// Classification workflow state.
#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    pub image: Option<Arc<DynamicImage>>,
    pub is_analyzing: bool,
    pub result: Option<AnalysisResult>,
}

impl AnalysisState {
    /// What the UI should print under the image: the label or the failure
    /// message, whichever the last run produced.
    #[must_use]
    pub fn result_label(&self) -> Option<&str> {
        self.result.as_ref().map(AnalysisResult::text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LookupPhase {
    #[default]
    Idle,
    Loading,
    Populated,
    /// The query succeeded but returned no usable providers.
    NoResults,
    Failed(String),
    PermissionDenied,
}

/// Doctor-lookup workflow state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorLookupState {
    pub phase: LookupPhase,
    pub providers: Vec<ProviderRecord>,
}

impl DoctorLookupState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == LookupPhase::Loading
    }

    /// Informational or error text to show instead of (or above) the list.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            LookupPhase::Idle | LookupPhase::Loading | LookupPhase::Populated => None,
            LookupPhase::NoResults => Some(NO_RESULTS_MESSAGE),
            LookupPhase::Failed(message) => Some(message),
            LookupPhase::PermissionDenied => Some(PERMISSION_DENIED_MESSAGE),
        }
    }
}
