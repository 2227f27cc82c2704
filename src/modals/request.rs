use serde::{Deserialize, Serialize};

use crate::models::UtcStamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    DateTime,
    DateRange,
    Text,
    Textarea,
    Info,
}

/// Options for free-text prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPrompt {
    pub title: String,
    pub current_value: String,
    pub placeholder: Option<String>,
    pub max_length: Option<usize>,
    pub rows: Option<u32>,
    pub submit_on_enter: bool,
}

impl TextPrompt {
    pub fn new(title: impl Into<String>, current_value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            current_value: current_value.into(),
            placeholder: None,
            max_length: None,
            rows: None,
            submit_on_enter: true,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn submit_on_enter(mut self, enabled: bool) -> Self {
        self.submit_on_enter = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfoLine {
    pub label: String,
    pub value: String,
}

impl InfoLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// What a dialog asks for, with its input props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DialogRequest {
    DateTime {
        title: String,
        current: Option<UtcStamp>,
    },
    DateRange {
        title: String,
        from: Option<UtcStamp>,
        to: Option<UtcStamp>,
    },
    Text(TextPrompt),
    Textarea(TextPrompt),
    Info {
        title: String,
        lines: Vec<InfoLine>,
    },
}

impl DialogRequest {
    pub fn kind(&self) -> DialogKind {
        match self {
            DialogRequest::DateTime { .. } => DialogKind::DateTime,
            DialogRequest::DateRange { .. } => DialogKind::DateRange,
            DialogRequest::Text(_) => DialogKind::Text,
            DialogRequest::Textarea(_) => DialogKind::Textarea,
            DialogRequest::Info { .. } => DialogKind::Info,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            DialogRequest::DateTime { title, .. }
            | DialogRequest::DateRange { title, .. }
            | DialogRequest::Info { title, .. } => title,
            DialogRequest::Text(prompt) | DialogRequest::Textarea(prompt) => &prompt.title,
        }
    }
}

/// What the user submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DialogValue {
    Text(String),
    Instant(UtcStamp),
    Range { from: UtcStamp, to: UtcStamp },
    Acknowledged,
}

impl DialogValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            DialogValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_instant(self) -> Option<UtcStamp> {
        match self {
            DialogValue::Instant(stamp) => Some(stamp),
            DialogValue::Text(raw) if !raw.trim().is_empty() => Some(UtcStamp::from(raw)),
            _ => None,
        }
    }

    pub fn into_range(self) -> Option<(UtcStamp, UtcStamp)> {
        match self {
            DialogValue::Range { from, to } => Some((from, to)),
            _ => None,
        }
    }
}
