//! Onboarding system — the wizard's record, step catalog, derived
//! progress, and the manager that owns them.
//!
//! The record is loaded once at startup, held in memory, and written
//! through to the settings store on every mutation. The manager is the
//! only writer; everything else reads snapshots.

pub mod manager;
pub mod model;
pub mod progress;
pub mod routes;
pub mod steps;

pub use manager::{OnboardingManager, OnboardingStatus};
pub use model::{
    BusinessProfile, BusinessProfilePatch, ConnectionState, OnboardingRecord, TeamInvite,
};
pub use progress::{SetupTask, progress_percent};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use steps::{STEPS, StepDef, TOTAL_STEPS};
