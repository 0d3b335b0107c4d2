#![forbid(unsafe_code)]

//! Tours bundled with the dashboard.

use crate::catalog::{Placement, StepAction, Tour, TourCategory, TourStep};

fn data_tour(name: &str) -> String {
    format!("[data-tour=\"{name}\"]")
}

/// Append a step anchored to a `data-tour` attribute.
#[allow(clippy::too_many_arguments)]
fn push_step(
    steps: &mut Vec<TourStep>,
    id: &'static str,
    title: &'static str,
    content: &'static str,
    anchor: &'static str,
    position: Placement,
    action: Option<StepAction>,
    action_text: Option<&'static str>,
) {
    let target = if anchor == "body" {
        anchor.to_string()
    } else {
        data_tour(anchor)
    };
    steps.push(TourStep {
        id: id.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        target,
        position,
        action,
        action_text: action_text.map(str::to_string),
    });
}

pub(crate) fn builtin_tours() -> Vec<Tour> {
    vec![
        initial_setup(),
        mcp_dashboard(),
        tariff_automation(),
        ai_assistant(),
    ]
}

fn initial_setup() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "welcome",
        "Welcome to Ship_fix!",
        "This guided tour will help you set up your supply chain automation platform. \
         Let's start with the basics.",
        "body",
        Placement::Center,
        None,
        None,
    );
    push_step(
        &mut steps,
        "navigation",
        "Navigation Menu",
        "This is your main navigation. Use it to access different sections of the platform.",
        "navigation",
        Placement::Right,
        None,
        Some("Take a moment to explore the menu options"),
    );
    push_step(
        &mut steps,
        "configuration",
        "Platform Configuration",
        "Start by setting up your basic platform configuration including company details \
         and preferences.",
        "config-link",
        Placement::Bottom,
        Some(StepAction::Click),
        Some("Click on Configuration to proceed"),
    );
    push_step(
        &mut steps,
        "company-info",
        "Company Information",
        "Enter your company details here. This information will be used for shipment \
         tracking and automation.",
        "company-name",
        Placement::Right,
        Some(StepAction::Input),
        Some("Enter your company name"),
    );
    push_step(
        &mut steps,
        "save-config",
        "Save Configuration",
        "Don't forget to save your configuration changes.",
        "save-button",
        Placement::Top,
        Some(StepAction::Click),
        Some("Click Save to continue"),
    );
    Tour::assemble(
        "initial-setup",
        "Initial Setup Guide",
        "Get started with Ship_fix platform configuration",
        TourCategory::Setup,
        steps,
    )
}

fn mcp_dashboard() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "dashboard-overview",
        "MCP Dashboard Overview",
        "This is your automation control center. Monitor and manage all your supply chain \
         automation from here.",
        "mcp-dashboard",
        Placement::Center,
        None,
        None,
    );
    push_step(
        &mut steps,
        "supply-chain-tab",
        "Supply Chain Monitoring",
        "View real-time supply chain metrics including shipment status, delays, and cost \
         optimization.",
        "supply-chain-tab",
        Placement::Bottom,
        Some(StepAction::Click),
        Some("Click to view supply chain metrics"),
    );
    push_step(
        &mut steps,
        "tariff-monitor",
        "Tariff Monitoring",
        "Track tariff changes and automated cost mitigation strategies.",
        "tariff-tab",
        Placement::Bottom,
        Some(StepAction::Click),
        Some("Click to view tariff monitoring"),
    );
    push_step(
        &mut steps,
        "automation-rules",
        "Automation Rules",
        "Configure and monitor your automation rules. These automatically respond to supply \
         chain events.",
        "automation-rules",
        Placement::Right,
        None,
        Some("Review the active automation rules"),
    );
    Tour::assemble(
        "mcp-dashboard",
        "MCP Dashboard Tour",
        "Explore the MCP automation dashboard and its features",
        TourCategory::Features,
        steps,
    )
}

fn tariff_automation() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "tariff-intro",
        "Tariff Automation Introduction",
        "Ship_fix automatically monitors tariff changes and implements cost mitigation \
         strategies.",
        "tariff-monitor",
        Placement::Center,
        None,
        None,
    );
    push_step(
        &mut steps,
        "cost-tracking",
        "Cost Impact Tracking",
        "This section shows real-time cost impacts from tariff changes.",
        "cost-tracking",
        Placement::Right,
        None,
        Some("Review the cost impact analysis"),
    );
    push_step(
        &mut steps,
        "mitigation-strategies",
        "Automated Mitigation",
        "View and configure automated responses to tariff changes including route \
         optimization and supplier switching.",
        "mitigation-strategies",
        Placement::Left,
        None,
        Some("Explore available mitigation options"),
    );
    push_step(
        &mut steps,
        "alerts-setup",
        "Alert Configuration",
        "Set up alerts for tariff changes and cost thresholds to stay informed of important \
         events.",
        "alert-config",
        Placement::Bottom,
        Some(StepAction::Click),
        Some("Configure your alert preferences"),
    );
    Tour::assemble(
        "tariff-automation",
        "Tariff Automation Setup",
        "Learn how to set up automated tariff monitoring and cost mitigation",
        TourCategory::Advanced,
        steps,
    )
}

fn ai_assistant() -> Tour {
    let mut steps = Vec::new();
    push_step(
        &mut steps,
        "ai-intro",
        "AI Assistant Introduction",
        "Your AI assistant can help with supply chain questions, automation setup, and \
         optimization strategies.",
        "ai-assistant",
        Placement::Center,
        None,
        None,
    );
    push_step(
        &mut steps,
        "ask-question",
        "Ask Questions",
        "Type your supply chain questions here. The AI understands tariffs, shipping, \
         automation, and MCP protocols.",
        "ai-input",
        Placement::Top,
        Some(StepAction::Input),
        Some("Try asking: \"How can I optimize shipping costs?\""),
    );
    push_step(
        &mut steps,
        "predefined-scenarios",
        "Predefined Scenarios",
        "Use these quick-start scenarios for common supply chain challenges.",
        "ai-scenarios",
        Placement::Right,
        None,
        Some("Click on a scenario to get started"),
    );
    Tour::assemble(
        "ai-assistant",
        "AI Assistant Guide",
        "Learn how to use the AI assistant for supply chain optimization",
        TourCategory::Features,
        steps,
    )
}
