//! OnboardingManager — owns the persisted record and is its only writer.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::anchor::AnchorResolver;
use crate::config::OnboardingConfig;
use crate::store::SettingsStore;

use super::model::{
    BusinessProfilePatch, ConnectionState, OnboardingRecord, TeamInvite, is_known_module,
    is_known_tool, settings_keys,
};
use super::progress;
use super::steps;

/// Coordinates the onboarding flow: the in-memory record, step navigation
/// with anchor-aware skipping, write-through persistence, and the debounced
/// auto-open timer.
///
/// Every public operation is total. Storage failures and unknown
/// identifiers degrade to logged no-ops; the in-memory record stays
/// authoritative for the session.
pub struct OnboardingManager {
    store: Arc<dyn SettingsStore>,
    anchors: Arc<dyn AnchorResolver>,
    config: OnboardingConfig,
    record: RwLock<OnboardingRecord>,
    /// Pending auto-open timer. At most one may exist; arming a new one
    /// cancels the old.
    auto_open: Mutex<Option<JoinHandle<()>>>,
}

impl OnboardingManager {
    /// Load the record from the store, falling back to defaults when the
    /// stored value is absent or unusable. Corrupt local state must never
    /// block the host application from starting.
    pub async fn with_store(
        store: Arc<dyn SettingsStore>,
        anchors: Arc<dyn AnchorResolver>,
        config: OnboardingConfig,
    ) -> Self {
        let record = Self::load_record(store.as_ref()).await;
        Self {
            store,
            anchors,
            config,
            record: RwLock::new(record),
            auto_open: Mutex::new(None),
        }
    }

    async fn load_record(store: &dyn SettingsStore) -> OnboardingRecord {
        let value = match store
            .get_setting(settings_keys::DEFAULT_USER, settings_keys::ONBOARDING_RECORD)
            .await
        {
            Ok(Some(value)) => value,
            Ok(None) => return OnboardingRecord::default(),
            Err(e) => {
                tracing::warn!("Failed to read onboarding record, using defaults: {e}");
                return OnboardingRecord::default();
            }
        };

        match serde_json::from_value::<OnboardingRecord>(value) {
            Ok(record) => record.sanitized().unwrap_or_else(|| {
                tracing::warn!("Stored onboarding record failed validation, using defaults");
                OnboardingRecord::default()
            }),
            Err(e) => {
                tracing::warn!("Malformed onboarding record in store, using defaults: {e}");
                OnboardingRecord::default()
            }
        }
    }

    /// Snapshot of the current record.
    pub async fn record(&self) -> OnboardingRecord {
        self.record.read().await.clone()
    }

    /// Summary for the status endpoint.
    pub async fn status(&self) -> OnboardingStatus {
        let record = self.record.read().await;
        OnboardingStatus {
            completed: record.completed,
            is_open: record.is_open,
            current_step: record.current_step,
            total_steps: steps::TOTAL_STEPS,
            step_id: steps::step(record.current_step).map(|s| s.id),
            progress_percent: progress::progress_percent(&record),
            tasks: progress::task_breakdown(&record),
            last_interacted_feature: record.last_interacted_feature.clone(),
        }
    }

    /// Progress percentage over the setup tasks.
    pub async fn progress_percent(&self) -> u8 {
        progress::progress_percent(&*self.record.read().await)
    }

    /// Present the wizard. Cancels any pending auto-open timer.
    pub async fn open(&self) {
        self.cancel_auto_open().await;
        {
            let mut record = self.record.write().await;
            record.is_open = true;
        }
        self.persist().await;
    }

    /// Dismiss the wizard without completing it.
    pub async fn close(&self, persist: bool) {
        self.cancel_auto_open().await;
        {
            let mut record = self.record.write().await;
            record.is_open = false;
        }
        if persist {
            self.persist().await;
        }
    }

    /// Move to the next step whose anchor resolves, completing the flow
    /// when no steps remain.
    ///
    /// A step whose required anchor is not mounted on the host page is
    /// skipped, so the wizard never highlights UI that is not rendered.
    /// `current_step` is untouched when the flow completes, so progress
    /// can still be inspected afterwards.
    pub async fn advance_step(&self) {
        let completed_now = {
            let mut record = self.record.write().await;
            if record.completed {
                return;
            }

            let mut next = record.current_step + 1;
            while let Some(step) = steps::step(next) {
                match step.anchor {
                    Some(anchor) if anchor.required && !self.anchors.resolves(anchor.selector) => {
                        tracing::debug!(
                            step = step.id,
                            selector = anchor.selector,
                            "Anchor not mounted, skipping step"
                        );
                        next += 1;
                    }
                    _ => break,
                }
            }

            if next < steps::TOTAL_STEPS {
                record.current_step = next;
                false
            } else {
                record.completed = true;
                record.completed_at = Some(Utc::now());
                record.is_open = false;
                true
            }
        };

        if completed_now {
            self.cancel_auto_open().await;
        }
        self.persist().await;
    }

    /// Step back exactly once. No skip logic on retreat.
    pub async fn retreat_step(&self) {
        {
            let mut record = self.record.write().await;
            if record.completed || record.current_step == 0 {
                return;
            }
            record.current_step -= 1;
        }
        self.persist().await;
    }

    /// Mark the flow complete without touching `current_step`.
    pub async fn complete_onboarding(&self) {
        {
            let mut record = self.record.write().await;
            record.completed = true;
            if record.completed_at.is_none() {
                record.completed_at = Some(Utc::now());
            }
        }
        self.cancel_auto_open().await;
        self.persist().await;
    }

    /// Reset tutorial progress. Business profile, tool connections, team
    /// invites, and selected modules are real user data, not tutorial
    /// state, and survive the reset untouched.
    pub async fn reset_onboarding(&self) {
        {
            let mut record = self.record.write().await;
            record.current_step = 0;
            record.completed = false;
            record.completed_at = None;
            record.last_interacted_feature = None;
        }
        self.persist().await;
    }

    /// Merge a partial profile update, field by field.
    pub async fn update_business_profile(&self, patch: BusinessProfilePatch) {
        {
            let mut record = self.record.write().await;
            record.business_profile.apply(patch);
        }
        self.persist().await;
    }

    /// Overwrite the connection state for a catalog tool. Unknown tools
    /// are a caller bug, ignored but logged.
    pub async fn set_tool_connection(&self, tool_id: &str, state: ConnectionState) {
        if !is_known_tool(tool_id) {
            tracing::warn!(tool_id, "Ignoring connection update for unknown tool");
            return;
        }
        {
            let mut record = self.record.write().await;
            record.tool_connections.insert(tool_id.to_string(), state);
        }
        self.persist().await;
    }

    /// Add an invite, or replace the role when the email is already
    /// invited. First-appearance order is preserved.
    pub async fn add_team_invite(&self, email: &str, role: &str) {
        let email = email.trim();
        if email.is_empty() {
            tracing::warn!("Ignoring team invite with blank email");
            return;
        }
        {
            let mut record = self.record.write().await;
            match record.team_invites.iter_mut().find(|i| i.email == email) {
                Some(existing) => existing.role = role.to_string(),
                None => record.team_invites.push(TeamInvite {
                    email: email.to_string(),
                    role: role.to_string(),
                    invited_at: Utc::now(),
                }),
            }
        }
        self.persist().await;
    }

    /// Remove an invite by exact email match. No-op when absent.
    pub async fn remove_team_invite(&self, email: &str) {
        {
            let mut record = self.record.write().await;
            record.team_invites.retain(|i| i.email != email);
        }
        self.persist().await;
    }

    /// Toggle a module selection: insert when absent, remove when present.
    pub async fn toggle_module(&self, module_id: &str) {
        if !is_known_module(module_id) {
            tracing::warn!(module_id, "Ignoring toggle for unknown module");
            return;
        }
        {
            let mut record = self.record.write().await;
            if !record.selected_modules.remove(module_id) {
                record.selected_modules.insert(module_id.to_string());
            }
        }
        self.persist().await;
    }

    /// Record the feature whose tip the user last dismissed.
    pub async fn update_last_interaction(&self, feature: &str) {
        {
            let mut record = self.record.write().await;
            record.last_interacted_feature = Some(feature.to_string());
        }
        self.persist().await;
    }

    /// Schedule the wizard to auto-present after the configured delay.
    ///
    /// A single debounced timer: arming again replaces the pending timer,
    /// and `open`, `close`, and completion all cancel it. Does nothing for
    /// a completed or already-open record.
    pub async fn arm_auto_open(self: &Arc<Self>) {
        {
            let record = self.record.read().await;
            if record.completed || record.is_open {
                return;
            }
        }

        let manager = Arc::clone(self);
        let delay = self.config.auto_open_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Disarm before opening so open()'s own cancel does not abort
            // this task mid-write.
            manager.auto_open.lock().await.take();
            let should_open = {
                let record = manager.record.read().await;
                !record.completed && !record.is_open
            };
            if should_open {
                tracing::debug!("Auto-presenting onboarding wizard");
                manager.open().await;
            }
        });

        if let Some(previous) = self.auto_open.lock().await.replace(handle) {
            previous.abort();
        }
    }

    async fn cancel_auto_open(&self) {
        if let Some(handle) = self.auto_open.lock().await.take() {
            handle.abort();
        }
    }

    /// Persist the current record to the settings store.
    ///
    /// Failures are logged and swallowed: the in-memory record remains
    /// authoritative for the session.
    async fn persist(&self) {
        let value = {
            let record = self.record.read().await;
            match serde_json::to_value(&*record) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!("Failed to serialize onboarding record: {e}");
                    return;
                }
            }
        };
        if let Err(e) = self
            .store
            .set_setting(
                settings_keys::DEFAULT_USER,
                settings_keys::ONBOARDING_RECORD,
                &value,
            )
            .await
        {
            tracing::warn!("Failed to persist onboarding record: {e}");
        }
    }
}

/// Onboarding status returned by the REST endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OnboardingStatus {
    pub completed: bool,
    pub is_open: bool,
    pub current_step: usize,
    pub total_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_id: Option<&'static str>,
    pub progress_percent: u8,
    pub tasks: Vec<progress::TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_interacted_feature: Option<String>,
}
