//! Built-in workflow template catalog.
//!
//! The registry is assembled once, on first access, and is read-only after
//! that, so any number of request tasks can share it without locking.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequirements {
    pub integrations: Vec<String>,
    pub min_plan: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub version: String,
    pub author: String,
    pub tags: Vec<String>,
    pub variables: Vec<TemplateVariable>,
    pub requirements: TemplateRequirements,
    pub workflow_definition: Value,
}

/// API projection of a template: everything in the catalog entry plus the
/// names of variables a caller must supply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail<'a> {
    #[serde(flatten)]
    pub template: &'a WorkflowTemplate,
    pub required_variables: Vec<&'a str>,
}

impl<'a> From<&'a WorkflowTemplate> for TemplateDetail<'a> {
    fn from(template: &'a WorkflowTemplate) -> Self {
        let required_variables = template
            .variables
            .iter()
            .filter(|v| v.required)
            .map(|v| v.name.as_str())
            .collect();
        Self {
            template,
            required_variables,
        }
    }
}

pub struct TemplateRegistry {
    templates: HashMap<String, WorkflowTemplate>,
}

impl TemplateRegistry {
    pub fn from_templates(templates: impl IntoIterator<Item = WorkflowTemplate>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&WorkflowTemplate> {
        self.templates.get(id)
    }

    /// Template ids in stable (sorted) order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

static REGISTRY: Lazy<TemplateRegistry> = Lazy::new(|| TemplateRegistry::from_templates(builtin_templates()));

/// Process-wide registry of built-in templates.
pub fn registry() -> &'static TemplateRegistry {
    &REGISTRY
}

fn variable(name: &str, kind: &str, description: &str, required: bool, default: Option<Value>) -> TemplateVariable {
    TemplateVariable {
        name: name.to_string(),
        kind: kind.to_string(),
        description: description.to_string(),
        required,
        default,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_templates() -> Vec<WorkflowTemplate> {
    vec![
        WorkflowTemplate {
            id: "lead-capture-nurture".to_string(),
            name: "Lead Capture & Nurture".to_string(),
            description: "Tag new opt-ins, send a welcome email and follow up over five days.".to_string(),
            category: "lead-generation".to_string(),
            version: "1.2.0".to_string(),
            author: "Funnel Builder Team".to_string(),
            tags: strings(&["email", "opt-in", "nurture"]),
            variables: vec![
                variable("senderEmail", "string", "From address for nurture emails", true, None),
                variable("leadTag", "string", "Tag applied to new leads", false, Some(json!("new-lead"))),
                variable("followUpDays", "number", "Days between follow-ups", false, Some(json!(2))),
            ],
            requirements: TemplateRequirements {
                integrations: strings(&["email"]),
                min_plan: "starter".to_string(),
            },
            workflow_definition: json!({
                "trigger": { "type": "form_submitted" },
                "steps": [
                    { "id": "tag", "type": "add_tag", "tag": "{{leadTag}}" },
                    { "id": "welcome", "type": "send_email", "from": "{{senderEmail}}", "template": "welcome" },
                    { "id": "wait", "type": "delay", "days": "{{followUpDays}}" },
                    { "id": "follow_up", "type": "send_email", "from": "{{senderEmail}}", "template": "follow-up" }
                ]
            }),
        },
        WorkflowTemplate {
            id: "webinar-registration".to_string(),
            name: "Webinar Registration".to_string(),
            description: "Confirm registrations and send reminders before the session starts.".to_string(),
            category: "events".to_string(),
            version: "1.0.0".to_string(),
            author: "Funnel Builder Team".to_string(),
            tags: strings(&["webinar", "reminders"]),
            variables: vec![
                variable("webinarUrl", "string", "Join link sent to registrants", true, None),
                variable("startsAt", "datetime", "Session start time (RFC 3339)", true, None),
                variable("reminderHours", "number", "Hours before start to send a reminder", false, Some(json!(24))),
            ],
            requirements: TemplateRequirements {
                integrations: strings(&["email", "calendar"]),
                min_plan: "pro".to_string(),
            },
            workflow_definition: json!({
                "trigger": { "type": "form_submitted" },
                "steps": [
                    { "id": "confirm", "type": "send_email", "template": "registration-confirmed", "link": "{{webinarUrl}}" },
                    { "id": "wait", "type": "delay_until", "at": "{{startsAt}}", "offsetHours": "-{{reminderHours}}" },
                    { "id": "remind", "type": "send_email", "template": "reminder", "link": "{{webinarUrl}}" }
                ]
            }),
        },
        WorkflowTemplate {
            id: "abandoned-cart-recovery".to_string(),
            name: "Abandoned Cart Recovery".to_string(),
            description: "Win back checkouts that were started but never completed.".to_string(),
            category: "ecommerce".to_string(),
            version: "2.0.1".to_string(),
            author: "Funnel Builder Team".to_string(),
            tags: strings(&["checkout", "recovery", "discount"]),
            variables: vec![
                variable("discountCode", "string", "Code offered in the final reminder", false, None),
                variable("waitMinutes", "number", "Minutes before the first reminder", false, Some(json!(60))),
            ],
            requirements: TemplateRequirements {
                integrations: strings(&["email", "payments"]),
                min_plan: "pro".to_string(),
            },
            workflow_definition: json!({
                "trigger": { "type": "checkout_abandoned" },
                "steps": [
                    { "id": "wait", "type": "delay", "minutes": "{{waitMinutes}}" },
                    { "id": "remind", "type": "send_email", "template": "cart-reminder" },
                    { "id": "check", "type": "condition", "if": "order_completed", "then": "end" },
                    { "id": "offer", "type": "send_email", "template": "cart-discount", "code": "{{discountCode}}" }
                ]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_is_populated() {
        let reg = registry();
        assert_eq!(reg.ids().len(), 3);
        assert_eq!(
            reg.ids(),
            vec!["abandoned-cart-recovery", "lead-capture-nurture", "webinar-registration"]
        );
        assert!(reg.get("no-such-template").is_none());
    }

    #[test]
    fn detail_lists_required_variables_and_keeps_definition() {
        let template = registry().get("webinar-registration").unwrap();
        let detail = serde_json::to_value(TemplateDetail::from(template)).unwrap();

        assert_eq!(detail["requiredVariables"], json!(["webinarUrl", "startsAt"]));
        assert_eq!(detail["workflowDefinition"]["steps"].as_array().unwrap().len(), 3);
        assert_eq!(detail["requirements"]["minPlan"], "pro");
        assert_eq!(detail["variables"][0]["type"], "string");
    }
}
