//! Onboarding record — the single persisted entity behind the wizard.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::steps;

/// Status of a third-party tool hookup, from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    NotStarted,
    InProgress,
    Connected,
    Skipped,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Connected => "connected",
            Self::Skipped => "skipped",
        };
        write!(f, "{s}")
    }
}

/// Third-party tools the dashboard can connect.
pub const TOOL_CATALOG: &[&str] = &["gohighlevel", "klaviyo", "quickbooks", "slack"];

/// Dashboard modules the user can enable during onboarding.
pub const MODULE_CATALOG: &[&str] = &["crm", "email_marketing", "compliance", "inventory", "sales"];

/// Whether `tool_id` names a tool from the static catalog.
pub fn is_known_tool(tool_id: &str) -> bool {
    TOOL_CATALOG.contains(&tool_id)
}

/// Whether `module_id` names a module from the static catalog.
pub fn is_known_module(module_id: &str) -> bool {
    MODULE_CATALOG.contains(&module_id)
}

/// Business profile collected by the wizard.
///
/// Named fields cover what the dashboard actually renders; anything else
/// the host wants to stash rides in `custom`. Content is never validated
/// here — that is a presentation concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_ref: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom: BTreeMap<String, String>,
}

impl BusinessProfile {
    /// Count of non-empty fields, named and custom alike.
    pub fn filled_field_count(&self) -> usize {
        let named = [
            &self.name,
            &self.legal_type,
            &self.size,
            &self.industry,
            &self.logo_ref,
        ];
        let named_filled = named
            .iter()
            .filter(|f| f.as_deref().is_some_and(|v| !v.trim().is_empty()))
            .count();
        let custom_filled = self.custom.values().filter(|v| !v.trim().is_empty()).count();
        named_filled + custom_filled
    }

    /// Shallow field-by-field merge; the latest patch wins per field.
    pub fn apply(&mut self, patch: BusinessProfilePatch) {
        if let Some(name) = patch.name {
            self.name = Some(name);
        }
        if let Some(legal_type) = patch.legal_type {
            self.legal_type = Some(legal_type);
        }
        if let Some(size) = patch.size {
            self.size = Some(size);
        }
        if let Some(industry) = patch.industry {
            self.industry = Some(industry);
        }
        if let Some(logo_ref) = patch.logo_ref {
            self.logo_ref = Some(logo_ref);
        }
        for (key, value) in patch.custom {
            self.custom.insert(key, value);
        }
    }
}

/// Partial profile update. Fields left `None` are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BusinessProfilePatch {
    pub name: Option<String>,
    pub legal_type: Option<String>,
    pub size: Option<String>,
    pub industry: Option<String>,
    pub logo_ref: Option<String>,
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

/// A pending team invite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInvite {
    pub email: String,
    pub role: String,
    pub invited_at: DateTime<Utc>,
}

/// The persisted onboarding record.
///
/// Stored in the `settings` table as JSON under key `"onboarding_record"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardingRecord {
    /// Whether the wizard UI is currently presented.
    pub is_open: bool,
    /// Whether the user has finished or dismissed the flow.
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// 0-based index into the step catalog. Always < `TOTAL_STEPS`.
    pub current_step: usize,
    /// Feature whose tip the user last dismissed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interacted_feature: Option<String>,
    #[serde(default)]
    pub business_profile: BusinessProfile,
    /// Connection status per catalog tool.
    #[serde(default)]
    pub tool_connections: BTreeMap<String, ConnectionState>,
    /// Pending invites, unique by email, first-appearance order.
    #[serde(default)]
    pub team_invites: Vec<TeamInvite>,
    #[serde(default)]
    pub selected_modules: BTreeSet<String>,
}

impl Default for OnboardingRecord {
    fn default() -> Self {
        Self {
            is_open: false,
            completed: false,
            completed_at: None,
            current_step: 0,
            last_interacted_feature: None,
            business_profile: BusinessProfile::default(),
            tool_connections: BTreeMap::new(),
            team_invites: Vec::new(),
            selected_modules: BTreeSet::new(),
        }
    }
}

impl OnboardingRecord {
    /// Validate and clean a record loaded from the store.
    ///
    /// `None` means the record is unusable and the caller should fall back
    /// to defaults. Unknown tool connections and duplicate invite emails
    /// are repairable and cleaned in place instead.
    pub fn sanitized(mut self) -> Option<Self> {
        if self.current_step >= steps::TOTAL_STEPS {
            return None;
        }

        let before = self.tool_connections.len();
        self.tool_connections
            .retain(|tool_id, _| is_known_tool(tool_id));
        if self.tool_connections.len() < before {
            tracing::warn!("Dropped unknown tool connections from stored record");
        }

        let mut seen = BTreeSet::new();
        self.team_invites
            .retain(|invite| seen.insert(invite.email.clone()));

        Some(self)
    }
}

/// Settings keys used for onboarding persistence.
pub mod settings_keys {
    /// Key for the OnboardingRecord JSON blob in the settings table.
    pub const ONBOARDING_RECORD: &str = "onboarding_record";
    /// Default user ID (single-tenant dashboard).
    pub const DEFAULT_USER: &str = "default";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record() {
        let record = OnboardingRecord::default();
        assert!(!record.is_open);
        assert!(!record.completed);
        assert!(record.completed_at.is_none());
        assert_eq!(record.current_step, 0);
        assert!(record.last_interacted_feature.is_none());
        assert_eq!(record.business_profile, BusinessProfile::default());
        assert!(record.tool_connections.is_empty());
        assert!(record.team_invites.is_empty());
        assert!(record.selected_modules.is_empty());
    }

    #[test]
    fn record_serde_roundtrip() {
        let mut record = OnboardingRecord::default();
        record.current_step = 3;
        record.business_profile.name = Some("Acme".to_string());
        record
            .tool_connections
            .insert("klaviyo".to_string(), ConnectionState::Connected);
        record.team_invites.push(TeamInvite {
            email: "a@x.com".to_string(),
            role: "admin".to_string(),
            invited_at: Utc::now(),
        });
        record.selected_modules.insert("crm".to_string());

        let json = serde_json::to_string(&record).unwrap();
        let parsed: OnboardingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn sanitize_rejects_out_of_range_step() {
        let record = OnboardingRecord {
            current_step: 999,
            ..Default::default()
        };
        assert!(record.sanitized().is_none());

        let record = OnboardingRecord {
            current_step: steps::TOTAL_STEPS,
            ..Default::default()
        };
        assert!(record.sanitized().is_none());

        let record = OnboardingRecord {
            current_step: steps::TOTAL_STEPS - 1,
            ..Default::default()
        };
        assert!(record.sanitized().is_some());
    }

    #[test]
    fn sanitize_drops_unknown_tools() {
        let mut record = OnboardingRecord::default();
        record
            .tool_connections
            .insert("gohighlevel".to_string(), ConnectionState::Connected);
        record
            .tool_connections
            .insert("bogus_tool".to_string(), ConnectionState::InProgress);

        let cleaned = record.sanitized().unwrap();
        assert_eq!(cleaned.tool_connections.len(), 1);
        assert!(cleaned.tool_connections.contains_key("gohighlevel"));
    }

    #[test]
    fn sanitize_dedupes_invites_keeping_first() {
        let mut record = OnboardingRecord::default();
        let t = Utc::now();
        record.team_invites = vec![
            TeamInvite {
                email: "a@x.com".to_string(),
                role: "admin".to_string(),
                invited_at: t,
            },
            TeamInvite {
                email: "b@x.com".to_string(),
                role: "viewer".to_string(),
                invited_at: t,
            },
            TeamInvite {
                email: "a@x.com".to_string(),
                role: "viewer".to_string(),
                invited_at: t,
            },
        ];

        let cleaned = record.sanitized().unwrap();
        assert_eq!(cleaned.team_invites.len(), 2);
        assert_eq!(cleaned.team_invites[0].email, "a@x.com");
        assert_eq!(cleaned.team_invites[0].role, "admin");
        assert_eq!(cleaned.team_invites[1].email, "b@x.com");
    }

    #[test]
    fn profile_patch_merges_field_by_field() {
        let mut profile = BusinessProfile::default();
        profile.apply(BusinessProfilePatch {
            name: Some("Acme".to_string()),
            industry: Some("retail".to_string()),
            ..Default::default()
        });
        profile.apply(BusinessProfilePatch {
            size: Some("small".to_string()),
            ..Default::default()
        });

        assert_eq!(profile.name.as_deref(), Some("Acme"));
        assert_eq!(profile.industry.as_deref(), Some("retail"));
        assert_eq!(profile.size.as_deref(), Some("small"));
        assert!(profile.legal_type.is_none());
    }

    #[test]
    fn profile_patch_last_write_wins() {
        let mut profile = BusinessProfile::default();
        profile.apply(BusinessProfilePatch {
            name: Some("Acme".to_string()),
            ..Default::default()
        });
        profile.apply(BusinessProfilePatch {
            name: Some("Acme Corp".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn profile_custom_entries_merge_per_key() {
        let mut profile = BusinessProfile::default();
        profile.apply(BusinessProfilePatch {
            custom: BTreeMap::from([("vat_id".to_string(), "DE123".to_string())]),
            ..Default::default()
        });
        profile.apply(BusinessProfilePatch {
            custom: BTreeMap::from([("founded".to_string(), "2019".to_string())]),
            ..Default::default()
        });
        assert_eq!(profile.custom.len(), 2);
        assert_eq!(profile.custom["vat_id"], "DE123");
    }

    #[test]
    fn filled_field_count_ignores_blank_values() {
        let mut profile = BusinessProfile::default();
        assert_eq!(profile.filled_field_count(), 0);

        profile.name = Some("Acme".to_string());
        profile.industry = Some("   ".to_string());
        profile
            .custom
            .insert("vat_id".to_string(), "DE123".to_string());
        profile.custom.insert("empty".to_string(), String::new());
        assert_eq!(profile.filled_field_count(), 2);
    }

    #[test]
    fn connection_state_display_matches_serde() {
        let states = [
            ConnectionState::NotStarted,
            ConnectionState::InProgress,
            ConnectionState::Connected,
            ConnectionState::Skipped,
        ];
        for state in states {
            let display = format!("{state}");
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }

    #[test]
    fn catalogs_recognize_their_entries() {
        assert!(is_known_tool("klaviyo"));
        assert!(!is_known_tool("mystery_saas"));
        assert!(is_known_module("sales"));
        assert!(!is_known_module("time_travel"));
    }
}
