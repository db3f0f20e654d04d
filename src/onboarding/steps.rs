//! Fixed catalog of wizard steps.

/// Anchor a highlight step targets on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepAnchor {
    /// CSS selector of the highlighted region.
    pub selector: &'static str,
    /// When true, the step is skipped if the selector does not resolve.
    pub required: bool,
}

/// One page of the onboarding wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDef {
    pub id: &'static str,
    pub title: &'static str,
    pub anchor: Option<StepAnchor>,
}

/// The ordered wizard flow. Step indices are persisted, so reordering or
/// removing entries is a breaking change for stored records.
pub const STEPS: &[StepDef] = &[
    StepDef {
        id: "welcome",
        title: "Welcome to BizDash",
        anchor: None,
    },
    StepDef {
        id: "business_profile",
        title: "Tell us about your business",
        anchor: None,
    },
    StepDef {
        id: "connect_tools",
        title: "Connect your tools",
        anchor: None,
    },
    StepDef {
        id: "invite_team",
        title: "Invite your team",
        anchor: None,
    },
    StepDef {
        id: "choose_modules",
        title: "Choose your modules",
        anchor: None,
    },
    StepDef {
        id: "crm_tour",
        title: "Your CRM at a glance",
        anchor: Some(StepAnchor {
            selector: "#crm-panel",
            required: true,
        }),
    },
    StepDef {
        id: "campaign_tour",
        title: "Email campaigns",
        anchor: Some(StepAnchor {
            selector: "#campaigns-panel",
            required: true,
        }),
    },
    StepDef {
        id: "finish",
        title: "You're all set",
        anchor: None,
    },
];

/// Number of steps in the flow.
pub const TOTAL_STEPS: usize = STEPS.len();

/// Look up a step by index.
pub fn step(index: usize) -> Option<&'static StepDef> {
    STEPS.get(index)
}
