//! The built-in CRM trigger and action catalog.

use crate::{CatalogEntry, NodeKind};

const fn entry(
    id: &'static str,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    kind: NodeKind,
) -> CatalogEntry {
    CatalogEntry { id, name, category, description, kind }
}

const BUILTIN: &[CatalogEntry] = &[
    // ------ Triggers ------
    entry("new_lead", "New Lead", "Leads", "When a new lead is created", NodeKind::Trigger),
    entry(
        "deal_closed",
        "Deal Closed",
        "Deals",
        "When a deal is marked won or lost",
        NodeKind::Trigger,
    ),
    entry(
        "deal_stage_changed",
        "Deal Stage Changed",
        "Deals",
        "When a deal moves to another pipeline stage",
        NodeKind::Trigger,
    ),
    entry(
        "form_submitted",
        "Form Submitted",
        "Marketing",
        "When a web form receives a submission",
        NodeKind::Trigger,
    ),
    entry(
        "invoice_overdue",
        "Invoice Overdue",
        "Accounting",
        "When an invoice passes its due date",
        NodeKind::Trigger,
    ),

    // ------ Actions ------
    entry(
        "send_email",
        "Send Email",
        "Communication",
        "Send an email from a template",
        NodeKind::Action,
    ),
    entry(
        "send_notification",
        "Send Notification",
        "Communication",
        "Notify a team member in the app",
        NodeKind::Action,
    ),
    entry("create_task", "Create Task", "Tasks", "Create a follow-up task", NodeKind::Action),
    entry("assign_owner", "Assign Owner", "Tasks", "Assign the record to a user", NodeKind::Action),
    entry("update_field", "Update Field", "Data", "Set a field on the record", NodeKind::Action),
    entry("add_tag", "Add Tag", "Data", "Tag the record", NodeKind::Action),
    entry(
        "webhook",
        "Call Webhook",
        "Integrations",
        "POST the record to an external URL",
        NodeKind::Action,
    ),
    entry("wait", "Wait", "Flow Control", "Pause before the next step", NodeKind::Action),

    // ------ Conditions ------
    entry("if_else", "If / Else", "Flow Control", "Branch on a field value", NodeKind::Condition),
];

pub(crate) fn entries() -> Vec<CatalogEntry> {
    BUILTIN.to_vec()
}
