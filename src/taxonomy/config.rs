use serde::{Deserialize, Serialize};

use crate::{error::ValidationError, models::{StatusFilter, TaxonomyKind}};

/// Input limits for taxonomy names and descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxonomyRules {
    pub name_max: usize,
    pub desc_max: usize,
    /// Height of the description textarea.
    pub desc_rows: u32,
}

impl Default for TaxonomyRules {
    fn default() -> Self {
        Self {
            name_max: 200,
            desc_max: 500,
            desc_rows: 4,
        }
    }
}

impl TaxonomyRules {
    /// Trimmed name, or why it is not acceptable.
    pub fn check_name(&self, entity: &'static str, raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired { entity });
        }
        if name.chars().count() > self.name_max {
            return Err(ValidationError::NameTooLong { max: self.name_max });
        }
        Ok(name.to_string())
    }

    pub fn check_description(&self, raw: &str) -> Result<String, ValidationError> {
        let description = raw.trim();
        if description.chars().count() > self.desc_max {
            return Err(ValidationError::DescriptionTooLong { max: self.desc_max });
        }
        Ok(description.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyConfig {
    pub kind: TaxonomyKind,
    pub rules: TaxonomyRules,
    /// `active` for records that predate the flag.
    pub legacy_active_default: bool,
    pub initial_filter: StatusFilter,
}

impl TaxonomyConfig {
    pub fn new(kind: TaxonomyKind) -> Self {
        Self {
            kind,
            rules: TaxonomyRules::default(),
            legacy_active_default: true,
            initial_filter: StatusFilter::Active,
        }
    }

    pub fn singular(&self) -> &'static str {
        self.kind.singular()
    }

    pub fn plural(&self) -> &'static str {
        self.kind.plural()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        let rules = TaxonomyRules {
            name_max: 5,
            ..Default::default()
        };
        assert_eq!(rules.check_name("Category", "  Admin "), Ok("Admin".to_string()));
        assert_eq!(
            rules.check_name("Category", "   "),
            Err(ValidationError::NameRequired { entity: "Category" })
        );
        assert_eq!(
            rules.check_name("Category", "Meetings"),
            Err(ValidationError::NameTooLong { max: 5 })
        );
        // Limits count characters, not bytes.
        assert!(rules.check_name("Category", "Büros").is_ok());
    }

    #[test]
    fn descriptions_may_be_empty_but_not_too_long() {
        let rules = TaxonomyRules {
            desc_max: 3,
            ..Default::default()
        };
        assert_eq!(rules.check_description("  "), Ok(String::new()));
        assert!(rules.check_description("abcd").is_err());
    }
}
