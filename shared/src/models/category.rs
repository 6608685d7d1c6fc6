//! Tour Category Model

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::locale::{self, Language};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    /// URL-safe identifier, unique
    pub slug: String,
    pub name_en: String,
    pub name_th: Option<String>,
    pub name_zh: Option<String>,
    pub sort_order: i32,
    pub created_at: i64,
}

impl Category {
    pub fn localize(&self, lang: Language) -> CategoryView {
        CategoryView {
            id: self.id,
            slug: self.slug.clone(),
            name: locale::pick(
                lang,
                &self.name_en,
                self.name_th.as_deref(),
                self.name_zh.as_deref(),
            )
            .to_string(),
        }
    }
}

/// Public, single-language category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// Slugs are lowercase ASCII letters, digits and hyphens
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let valid = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryCreate {
    #[validate(length(max = 64), custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(min = 1, max = 100))]
    pub name_en: String,
    #[validate(length(max = 100))]
    pub name_th: Option<String>,
    #[validate(length(max = 100))]
    pub name_zh: Option<String>,
    pub sort_order: Option<i32>,
}

/// Update category payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryUpdate {
    #[validate(length(max = 64), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub name_en: Option<String>,
    #[validate(length(max = 100))]
    pub name_th: Option<String>,
    #[validate(length(max = 100))]
    pub name_zh: Option<String>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(validate_slug("island-hopping").is_ok());
        assert!(validate_slug("day-trip-2").is_ok());
        assert!(validate_slug("Island").is_err());
        assert!(validate_slug("-lead").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_localize() {
        let category = Category {
            id: 1,
            slug: "islands".into(),
            name_en: "Islands".into(),
            name_th: Some("เกาะ".into()),
            name_zh: None,
            sort_order: 0,
            created_at: 0,
        };
        assert_eq!(category.localize(Language::Th).name, "เกาะ");
        assert_eq!(category.localize(Language::Zh).name, "Islands");
    }
}
