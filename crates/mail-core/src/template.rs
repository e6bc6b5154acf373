use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reference to a stored template, plus optional per-send `mc:edit` region
/// replacements. Region overrides only take effect on templates authored with
/// mailchimp merge tags; the builder rejects them for handlebars templates
/// instead of sending an override the provider would ignore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateReference {
    pub template_name: String,
    pub overridable_regions: BTreeMap<String, String>,
}

impl TemplateReference {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            overridable_regions: BTreeMap::new(),
        }
    }

    /// Replace the `mc:edit` region `name` with `replacement_html` for this
    /// send only; the stored template is untouched.
    pub fn with_region(
        mut self,
        name: impl Into<String>,
        replacement_html: impl Into<String>,
    ) -> Self {
        self.overridable_regions
            .insert(name.into(), replacement_html.into());
        self
    }
}

/// Input to template creation (`templates.add`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub name: String,
    /// HTML body; `mc:edit` regions defined here become overridable per send.
    pub code: String,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub from_email: Option<String>,
    pub from_name: Option<String>,
    pub labels: Vec<String>,
    /// Publish immediately, or leave as draft.
    pub publish: bool,
}

/// What the provider reports back after creating a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateInfo {
    pub name: String,
    pub slug: String,
    /// Set once published; a draft has none.
    #[serde(default)]
    pub publish_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_accumulate() {
        let tref = TemplateReference::new("template1")
            .with_region("welcome_message", "<p>Hi!</p>")
            .with_region("goodbye_message", "<p>Bye.</p>");
        assert_eq!(tref.template_name, "template1");
        assert_eq!(tref.overridable_regions.len(), 2);
        assert_eq!(tref.overridable_regions["welcome_message"], "<p>Hi!</p>");
    }

    #[test]
    fn template_info_parses_draft_response() {
        let info: TemplateInfo = serde_json::from_str(
            r#"{"name":"template1","slug":"template1","code":"<h1>x</h1>"}"#,
        )
        .unwrap();
        assert_eq!(info.slug, "template1");
        assert!(info.publish_name.is_none());
    }
}
