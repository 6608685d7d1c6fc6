//! Tour Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::category::{Category, CategoryView};
use crate::locale::{self, Language};

/// Currency used when a tour does not specify one
pub const DEFAULT_CURRENCY: &str = "THB";

/// Tour entity (bookable travel package)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tour {
    pub id: i64,
    pub title_en: String,
    pub title_th: Option<String>,
    pub title_zh: Option<String>,
    pub description_en: String,
    pub description_th: Option<String>,
    pub description_zh: Option<String>,
    pub location_en: String,
    pub location_th: Option<String>,
    pub location_zh: Option<String>,
    /// Adult price before discount
    pub price: f64,
    /// ISO 4217 code
    pub currency: String,
    pub is_discounted: bool,
    /// Discount percentage (10 = 10%), only applied when `is_discounted`
    pub discount_percentage: Option<f64>,
    pub image_url: Option<String>,
    pub gallery: Vec<String>,
    pub video_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Free text, e.g. "3 days 2 nights"
    pub duration: String,
    pub max_guests: Option<i32>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Tour {
    /// The discount percentage that is actually in force, if any.
    ///
    /// A discount applies only when the flag is set and the percentage lies in (0, 100].
    pub fn active_discount(&self) -> Option<f64> {
        if !self.is_discounted {
            return None;
        }
        self.discount_percentage
            .filter(|d| d.is_finite() && *d > 0.0 && *d <= 100.0)
    }

    /// Render a single-language view. `adult_price` is the discounted price
    /// computed by the pricing layer.
    pub fn localize(&self, lang: Language, adult_price: f64) -> TourView {
        TourView {
            id: self.id,
            language: lang,
            title: locale::pick(
                lang,
                &self.title_en,
                self.title_th.as_deref(),
                self.title_zh.as_deref(),
            )
            .to_string(),
            description: locale::pick(
                lang,
                &self.description_en,
                self.description_th.as_deref(),
                self.description_zh.as_deref(),
            )
            .to_string(),
            location: locale::pick(
                lang,
                &self.location_en,
                self.location_th.as_deref(),
                self.location_zh.as_deref(),
            )
            .to_string(),
            price: self.price,
            discounted_price: adult_price,
            discount_percentage: self.active_discount(),
            currency: self.currency.clone(),
            image_url: self.image_url.clone(),
            gallery: self.gallery.clone(),
            video_url: self.video_url.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            duration: self.duration.clone(),
            max_guests: self.max_guests,
            categories: self.categories.iter().map(|c| c.localize(lang)).collect(),
        }
    }
}

/// Public, single-language tour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourView {
    pub id: i64,
    pub language: Language,
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: f64,
    /// Adult price after the active discount (equals `price` without one)
    pub discounted_price: f64,
    pub discount_percentage: Option<f64>,
    pub currency: String,
    pub image_url: Option<String>,
    pub gallery: Vec<String>,
    pub video_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub duration: String,
    pub max_guests: Option<i32>,
    pub categories: Vec<CategoryView>,
}

fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency"))
    }
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

/// Create tour payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_create_dates"))]
pub struct TourCreate {
    #[validate(length(min = 1, max = 200))]
    pub title_en: String,
    #[validate(length(max = 200))]
    pub title_th: Option<String>,
    #[validate(length(max = 200))]
    pub title_zh: Option<String>,
    #[validate(length(min = 1))]
    pub description_en: String,
    pub description_th: Option<String>,
    pub description_zh: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location_en: String,
    #[validate(length(max = 200))]
    pub location_th: Option<String>,
    #[validate(length(max = 200))]
    pub location_zh: Option<String>,
    #[validate(custom(function = "validate_finite"), range(min = 0.0, max = 10_000_000.0))]
    pub price: f64,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: Option<String>,
    pub is_discounted: Option<bool>,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[validate(url)]
    pub video_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub duration: String,
    #[validate(range(min = 1))]
    pub max_guests: Option<i32>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

fn validate_create_dates(tour: &TourCreate) -> Result<(), ValidationError> {
    check_date_range(tour.start_date, tour.end_date)
}

/// Update tour payload (absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_update_dates"))]
pub struct TourUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title_en: Option<String>,
    #[validate(length(max = 200))]
    pub title_th: Option<String>,
    #[validate(length(max = 200))]
    pub title_zh: Option<String>,
    #[validate(length(min = 1))]
    pub description_en: Option<String>,
    pub description_th: Option<String>,
    pub description_zh: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub location_en: Option<String>,
    #[validate(length(max = 200))]
    pub location_th: Option<String>,
    #[validate(length(max = 200))]
    pub location_zh: Option<String>,
    #[validate(custom(function = "validate_finite"), range(min = 0.0, max = 10_000_000.0))]
    pub price: Option<f64>,
    #[validate(custom(function = "validate_currency_code"))]
    pub currency: Option<String>,
    pub is_discounted: Option<bool>,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(url)]
    pub image_url: Option<String>,
    pub gallery: Option<Vec<String>>,
    #[validate(url)]
    pub video_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub duration: Option<String>,
    #[validate(range(min = 1))]
    pub max_guests: Option<i32>,
    pub is_active: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
}

fn validate_update_dates(tour: &TourUpdate) -> Result<(), ValidationError> {
    check_date_range(tour.start_date, tour.end_date)
}

fn check_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(ValidationError::new("date_range")),
        _ => Ok(()),
    }
}

/// Public tour list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TourFilter {
    pub lang: Option<String>,
    /// Category slug
    pub category: Option<String>,
    /// Free-text search over titles and locations
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tour() -> Tour {
        Tour {
            id: 7,
            title_en: "Phi Phi Islands".into(),
            title_th: Some("หมู่เกาะพีพี".into()),
            title_zh: Some("皮皮岛".into()),
            description_en: "Full day speedboat trip".into(),
            description_th: None,
            description_zh: None,
            location_en: "Krabi".into(),
            location_th: Some("กระบี่".into()),
            location_zh: None,
            price: 2000.0,
            currency: "THB".into(),
            is_discounted: true,
            discount_percentage: Some(10.0),
            image_url: None,
            gallery: vec![],
            video_url: None,
            start_date: None,
            end_date: None,
            duration: "1 day".into(),
            max_guests: Some(20),
            is_active: true,
            created_at: 0,
            updated_at: 0,
            categories: vec![],
        }
    }

    #[test]
    fn test_active_discount_requires_flag_and_range() {
        let mut tour = sample_tour();
        assert_eq!(tour.active_discount(), Some(10.0));

        tour.is_discounted = false;
        assert_eq!(tour.active_discount(), None);

        tour.is_discounted = true;
        tour.discount_percentage = None;
        assert_eq!(tour.active_discount(), None);

        tour.discount_percentage = Some(0.0);
        assert_eq!(tour.active_discount(), None);

        tour.discount_percentage = Some(150.0);
        assert_eq!(tour.active_discount(), None);
    }

    #[test]
    fn test_localize_falls_back_per_field() {
        let view = sample_tour().localize(Language::Zh, 1800.0);
        assert_eq!(view.title, "皮皮岛");
        assert_eq!(view.description, "Full day speedboat trip");
        assert_eq!(view.location, "Krabi");
        assert_eq!(view.discounted_price, 1800.0);
        assert_eq!(view.discount_percentage, Some(10.0));
    }

    fn minimal_create() -> TourCreate {
        serde_json::from_value(serde_json::json!({
            "title_en": "Old Town Walk",
            "description_en": "Guided walk",
            "location_en": "Chiang Mai",
            "price": 900.0
        }))
        .unwrap()
    }

    #[test]
    fn test_create_validation() {
        assert!(minimal_create().validate().is_ok());

        let mut bad = minimal_create();
        bad.price = -1.0;
        assert!(bad.validate().is_err());

        let mut bad = minimal_create();
        bad.discount_percentage = Some(0.0);
        assert!(bad.validate().is_err());

        let mut bad = minimal_create();
        bad.currency = Some("thb".into());
        assert!(bad.validate().is_err());

        let mut bad = minimal_create();
        bad.start_date = NaiveDate::from_ymd_opt(2025, 5, 10);
        bad.end_date = NaiveDate::from_ymd_opt(2025, 5, 1);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_price_must_be_finite() {
        let mut bad = minimal_create();
        bad.price = f64::INFINITY;
        let errors = bad.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        let update = TourUpdate {
            price: Some(f64::NAN),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(TourUpdate {
            price: Some(1500.0),
            ..Default::default()
        }
        .validate()
        .is_ok());
    }
}
