//! UI-facing state machines for skin analysis and nearby-doctor lookup.

pub mod session;
pub mod state;

pub use session::Session;
pub use state::{
    AnalysisResult, AnalysisState, DoctorLookupState, LookupPhase, NO_RESULTS_MESSAGE,
    PERMISSION_DENIED_MESSAGE,
};
