//! Static module definitions.
//!
//! The module/tag mapping is a hand-curated partition of the API by topic,
//! sized so each module document fits comfortably in a token-budgeted prompt.
//! Membership is non-exclusive: an endpoint belongs to every module whose tag
//! set intersects its own, and to none if nothing matches (such endpoints are
//! still listed in the Markdown index for auditing).

/// One named, tag-defined partition of the API.
#[derive(Debug, Clone, Copy)]
pub struct ModuleDef {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Spec tags whose endpoints belong to this module.
    pub tags: &'static [&'static str],
    /// Rough prompt-cost budget, for display only. The authoritative count is
    /// computed per generated document.
    pub estimated_tokens: u32,
}

/// The partition. Keep in sync with the tags used by the upstream API spec.
pub const MODULE_DEFINITIONS: &[ModuleDef] = &[
    ModuleDef {
        id: "ai-assistants",
        label: "AI & Assistants",
        description: "AI assistants, options, products, and prompt generation",
        tags: &[
            "Assistants",
            "AssistantOptions",
            "AssistantProducts",
            "GeneralAi",
        ],
        estimated_tokens: 3500,
    },
    ModuleDef {
        id: "auditing",
        label: "Auditing",
        description: "Agent auditing, transcriptions, and reports",
        tags: &["Auditor", "AgentAuditor"],
        estimated_tokens: 5500,
    },
    ModuleDef {
        id: "queues",
        label: "Queues",
        description: "Dynamic queues, rules, shifts, and priorities",
        tags: &["DynamicQueues", "DynamicQueuesChangelog"],
        estimated_tokens: 6000,
    },
    ModuleDef {
        id: "integrations",
        label: "Integrations",
        description: "CRM integrations, scheduling, and campaigns",
        tags: &["HubSpot", "Schedules", "Campaigns"],
        estimated_tokens: 5000,
    },
    ModuleDef {
        id: "infrastructure",
        label: "Infrastructure",
        description: "PBX, media, and products",
        tags: &["Pbx", "Media", "Products"],
        estimated_tokens: 3000,
    },
    ModuleDef {
        id: "system",
        label: "System",
        description: "Health checks, help center, and monitoring",
        tags: &["ApiCheck", "HelpCenter", "Monitoring"],
        estimated_tokens: 2000,
    },
];

/// Look up a module definition by its id.
pub fn module_by_id(id: &str) -> Option<&'static ModuleDef> {
    MODULE_DEFINITIONS.iter().find(|m| m.id == id)
}

/// Find the first module whose tag set contains the given spec tag.
pub fn module_by_tag(tag: &str) -> Option<&'static ModuleDef> {
    MODULE_DEFINITIONS.iter().find(|m| m.tags.contains(&tag))
}

/// Print the module table (the `apimod modules` command).
pub fn list_modules() {
    println!(
        "{:<16} {:<18} {:>10}  {}",
        "MODULE", "LABEL", "EST.TOKENS", "DESCRIPTION"
    );
    for def in MODULE_DEFINITIONS {
        println!(
            "{:<16} {:<18} {:>10}  {}",
            def.id, def.label, def.estimated_tokens, def.description
        );
        println!(
            "{:<16} {:<18} {:>10}  tags: {}",
            "",
            "",
            "",
            def.tags.join(", ")
        );
    }
}
