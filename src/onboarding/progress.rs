//! Derived setup progress — a pure function over the record.
//!
//! Recomputed on every read. The record is small and reads are infrequent,
//! so nothing is cached.

use serde::Serialize;

use super::model::{ConnectionState, OnboardingRecord};

/// The setup tasks the dashboard counts toward completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupTask {
    /// Business profile has at least three non-empty fields.
    BusinessProfile,
    /// At least one tool connection is `Connected`.
    ToolConnection,
    /// At least one team invite exists.
    TeamInvite,
    /// At least one module is selected.
    ModuleSelection,
}

pub const SETUP_TASKS: &[SetupTask] = &[
    SetupTask::BusinessProfile,
    SetupTask::ToolConnection,
    SetupTask::TeamInvite,
    SetupTask::ModuleSelection,
];

/// Whether a single setup task is satisfied by the record.
pub fn task_done(record: &OnboardingRecord, task: SetupTask) -> bool {
    match task {
        SetupTask::BusinessProfile => record.business_profile.filled_field_count() >= 3,
        SetupTask::ToolConnection => record
            .tool_connections
            .values()
            .any(|state| *state == ConnectionState::Connected),
        SetupTask::TeamInvite => !record.team_invites.is_empty(),
        SetupTask::ModuleSelection => !record.selected_modules.is_empty(),
    }
}

/// Percentage of setup tasks done, rounded to the nearest integer.
pub fn progress_percent(record: &OnboardingRecord) -> u8 {
    let done = SETUP_TASKS
        .iter()
        .filter(|task| task_done(record, **task))
        .count();
    ((done * 100) as f32 / SETUP_TASKS.len() as f32).round() as u8
}

/// Per-task breakdown for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub task: SetupTask,
    pub done: bool,
}

pub fn task_breakdown(record: &OnboardingRecord) -> Vec<TaskStatus> {
    SETUP_TASKS
        .iter()
        .map(|task| TaskStatus {
            task: *task,
            done: task_done(record, *task),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::model::TeamInvite;
    use chrono::Utc;

    #[test]
    fn empty_record_is_zero_percent() {
        let record = OnboardingRecord::default();
        assert_eq!(progress_percent(&record), 0);
        assert!(task_breakdown(&record).iter().all(|t| !t.done));
    }

    #[test]
    fn each_task_is_worth_a_quarter() {
        let mut record = OnboardingRecord::default();

        record.selected_modules.insert("crm".to_string());
        assert_eq!(progress_percent(&record), 25);

        record.team_invites.push(TeamInvite {
            email: "a@x.com".to_string(),
            role: "admin".to_string(),
            invited_at: Utc::now(),
        });
        assert_eq!(progress_percent(&record), 50);

        record
            .tool_connections
            .insert("klaviyo".to_string(), ConnectionState::Connected);
        assert_eq!(progress_percent(&record), 75);

        record.business_profile.name = Some("Acme".to_string());
        record.business_profile.industry = Some("retail".to_string());
        record.business_profile.size = Some("small".to_string());
        assert_eq!(progress_percent(&record), 100);
    }

    #[test]
    fn profile_task_needs_three_fields() {
        let mut record = OnboardingRecord::default();
        record.business_profile.name = Some("Acme".to_string());
        record.business_profile.industry = Some("retail".to_string());
        assert!(!task_done(&record, SetupTask::BusinessProfile));

        record.business_profile.size = Some("small".to_string());
        assert!(task_done(&record, SetupTask::BusinessProfile));
    }

    #[test]
    fn only_connected_counts() {
        let mut record = OnboardingRecord::default();
        record
            .tool_connections
            .insert("gohighlevel".to_string(), ConnectionState::InProgress);
        record
            .tool_connections
            .insert("klaviyo".to_string(), ConnectionState::Skipped);
        assert!(!task_done(&record, SetupTask::ToolConnection));

        record
            .tool_connections
            .insert("gohighlevel".to_string(), ConnectionState::Connected);
        assert!(task_done(&record, SetupTask::ToolConnection));
    }
}
