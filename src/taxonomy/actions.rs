//! Edit flows that ask the user for a value before patching.

use super::store::{PatchOptions, PatchOutcome, TaxonomyStore};
use crate::{
    error::ValidationError,
    models::{TaxonomyPatch, UtcStamp},
    modals::{DialogValue, InfoLine, TextPrompt},
    utils::time::format_local_datetime,
};

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Dialog dismissed or superseded.
    Cancelled,
    Unchanged,
    Rejected(ValidationError),
    Patched(PatchOutcome),
}

fn dash(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        "—".to_string()
    } else {
        value.to_string()
    }
}

impl TaxonomyStore {
    pub async fn edit_name(&self, id: i64) -> EditOutcome {
        let Some(item) = self.get(id) else {
            return EditOutcome::Cancelled;
        };
        let singular = self.config().singular();
        let current = item.name.clone();

        let prompt = TextPrompt::new(format!("Edit {singular} Name"), current.clone())
            .placeholder(format!("{singular} name"))
            .max_length(self.config().rules.name_max);
        let Some(text) = self.modals.open_text(prompt).await.and_then(DialogValue::into_text) else {
            return EditOutcome::Cancelled;
        };

        let next = match self.config().rules.check_name(singular, &text) {
            Ok(next) => next,
            Err(err) => {
                self.toasts.warning(err.to_string());
                return EditOutcome::Rejected(err);
            }
        };
        if next == current.trim() {
            return EditOutcome::Unchanged;
        }

        self.patch_with_dialog_value(id, TaxonomyPatch::name(next), true, "Name updated")
            .await
    }

    pub async fn edit_description(&self, id: i64) -> EditOutcome {
        let Some(item) = self.get(id) else {
            return EditOutcome::Cancelled;
        };
        let rules = self.config().rules;
        let current = item.description.clone().unwrap_or_default();

        let prompt = TextPrompt::new("Edit Description", current.clone())
            .placeholder(format!("{} description", self.config().singular()))
            .max_length(rules.desc_max)
            .rows(rules.desc_rows)
            .submit_on_enter(false);
        let Some(text) = self.modals.open_textarea(prompt).await.and_then(DialogValue::into_text) else {
            return EditOutcome::Cancelled;
        };

        let next = match rules.check_description(&text) {
            Ok(next) => next,
            Err(err) => {
                self.toasts.warning(err.to_string());
                return EditOutcome::Rejected(err);
            }
        };
        if next == current.trim() {
            return EditOutcome::Unchanged;
        }

        self.patch_with_dialog_value(id, TaxonomyPatch::description(next), false, "Description updated")
            .await
    }

    /// Read-only details dialog: name, created, last edit.
    pub async fn show_info(&self, id: i64) {
        let Some(item) = self.get(id) else {
            return;
        };

        let stamp = |value: &Option<UtcStamp>| {
            value
                .as_ref()
                .map(|s| format_local_datetime(&s.to_string()))
                .unwrap_or_default()
        };
        let lines = vec![
            InfoLine::new("Name", dash(&item.name)),
            InfoLine::new("Created", dash(&stamp(&item.created_at))),
            InfoLine::new("Last edit", dash(&stamp(&item.updated_at))),
        ];

        let title = format!("{} Info", self.config().singular());
        let _ = self.modals.open_info(title, lines).await;
    }

    async fn patch_with_dialog_value(
        &self,
        id: i64,
        patch: TaxonomyPatch,
        resort: bool,
        success_msg: &str,
    ) -> EditOutcome {
        let remote = self.remote_patch(id, patch.clone());
        let opts = PatchOptions {
            resort,
            success_msg: Some(success_msg.to_string()),
        };
        EditOutcome::Patched(self.optimistic_patch(id, patch, remote, opts).await)
    }
}
