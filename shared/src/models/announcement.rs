//! Announcement Model (site banners and popups)

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::locale::{self, Language};

/// Where the announcement is rendered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "lowercase"))]
pub enum AnnouncementType {
    #[default]
    Banner,
    Popup,
}

/// Popup flavour
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "lowercase"))]
pub enum PopupType {
    Info,
    /// Linked to a tour; keeps the tour's discount in sync
    Discount,
    Promotion,
}

/// Announcement entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Announcement {
    pub id: i64,
    pub message: String,
    pub message_th: Option<String>,
    pub message_zh: Option<String>,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    pub popup_type: Option<PopupType>,
    pub tour_id: Option<i64>,
    pub discount_percentage: Option<f64>,
    pub link_url: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Announcement {
    /// Linked tour and percentage when this announcement drives a tour discount
    pub fn discount_link(&self) -> Option<(i64, f64)> {
        if self.popup_type != Some(PopupType::Discount) {
            return None;
        }
        Some((self.tour_id?, self.discount_percentage?))
    }

    pub fn localize(&self, lang: Language) -> AnnouncementView {
        AnnouncementView {
            id: self.id,
            message: locale::pick(
                lang,
                &self.message,
                self.message_th.as_deref(),
                self.message_zh.as_deref(),
            )
            .to_string(),
            kind: self.kind,
            popup_type: self.popup_type,
            tour_id: self.tour_id,
            discount_percentage: self.discount_percentage,
            link_url: self.link_url.clone(),
        }
    }
}

/// Public, single-language announcement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementView {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: AnnouncementType,
    pub popup_type: Option<PopupType>,
    pub tour_id: Option<i64>,
    pub discount_percentage: Option<f64>,
    pub link_url: Option<String>,
}

/// Create announcement payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnnouncementCreate {
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    #[validate(length(max = 1000))]
    pub message_th: Option<String>,
    #[validate(length(max = 1000))]
    pub message_zh: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: AnnouncementType,
    pub popup_type: Option<PopupType>,
    pub tour_id: Option<i64>,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(url)]
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
}

impl AnnouncementCreate {
    pub fn check_consistency(&self) -> Result<(), ValidationError> {
        check_consistency(self.kind, self.popup_type, self.tour_id, self.discount_percentage)
    }
}

/// Update announcement payload (absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AnnouncementUpdate {
    #[validate(length(min = 1, max = 1000))]
    pub message: Option<String>,
    #[validate(length(max = 1000))]
    pub message_th: Option<String>,
    #[validate(length(max = 1000))]
    pub message_zh: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnnouncementType>,
    pub popup_type: Option<PopupType>,
    pub tour_id: Option<i64>,
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub discount_percentage: Option<f64>,
    #[validate(url)]
    pub link_url: Option<String>,
    pub is_active: Option<bool>,
}

impl AnnouncementUpdate {
    /// Merge onto the stored row; the caller re-checks consistency on the result
    pub fn apply_to(&self, current: &Announcement) -> Announcement {
        let mut merged = current.clone();
        if let Some(v) = &self.message {
            merged.message = v.clone();
        }
        if self.message_th.is_some() {
            merged.message_th = self.message_th.clone();
        }
        if self.message_zh.is_some() {
            merged.message_zh = self.message_zh.clone();
        }
        if let Some(v) = self.kind {
            merged.kind = v;
        }
        if self.popup_type.is_some() {
            merged.popup_type = self.popup_type;
        }
        if self.tour_id.is_some() {
            merged.tour_id = self.tour_id;
        }
        if self.discount_percentage.is_some() {
            merged.discount_percentage = self.discount_percentage;
        }
        if self.link_url.is_some() {
            merged.link_url = self.link_url.clone();
        }
        if let Some(v) = self.is_active {
            merged.is_active = v;
        }
        if merged.kind == AnnouncementType::Banner {
            merged.popup_type = None;
        }
        merged
    }
}

/// Popups need a popup type; discount popups need a tour and a percentage.
pub fn check_consistency(
    kind: AnnouncementType,
    popup_type: Option<PopupType>,
    tour_id: Option<i64>,
    discount_percentage: Option<f64>,
) -> Result<(), ValidationError> {
    match (kind, popup_type) {
        (AnnouncementType::Popup, None) => Err(ValidationError::new("popup_type_required")),
        (AnnouncementType::Popup, Some(PopupType::Discount))
            if tour_id.is_none() || discount_percentage.is_none() =>
        {
            Err(ValidationError::new("discount_link_required"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discount_popup() -> Announcement {
        Announcement {
            id: 1,
            message: "20% off Phi Phi this week".into(),
            message_th: None,
            message_zh: Some("皮皮岛本周八折".into()),
            kind: AnnouncementType::Popup,
            popup_type: Some(PopupType::Discount),
            tour_id: Some(7),
            discount_percentage: Some(20.0),
            link_url: None,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_discount_link() {
        let a = discount_popup();
        assert_eq!(a.discount_link(), Some((7, 20.0)));

        let mut info = a.clone();
        info.popup_type = Some(PopupType::Info);
        assert_eq!(info.discount_link(), None);
    }

    #[test]
    fn test_consistency_rules() {
        use AnnouncementType::*;
        assert!(check_consistency(Banner, None, None, None).is_ok());
        assert!(check_consistency(Popup, None, None, None).is_err());
        assert!(check_consistency(Popup, Some(PopupType::Info), None, None).is_ok());
        assert!(check_consistency(Popup, Some(PopupType::Discount), Some(1), None).is_err());
        assert!(check_consistency(Popup, Some(PopupType::Discount), Some(1), Some(15.0)).is_ok());
    }

    #[test]
    fn test_create_uses_type_key() {
        let create: AnnouncementCreate = serde_json::from_value(serde_json::json!({
            "message": "Songkran schedule",
            "type": "popup"
        }))
        .unwrap();
        assert_eq!(create.kind, AnnouncementType::Popup);
        assert!(create.validate().is_ok());
        let err = create.check_consistency().unwrap_err();
        assert_eq!(err.code, "popup_type_required");
    }

    #[test]
    fn test_update_merge_switching_to_banner_drops_popup_type() {
        let update = AnnouncementUpdate {
            kind: Some(AnnouncementType::Banner),
            is_active: Some(false),
            ..Default::default()
        };
        let merged = update.apply_to(&discount_popup());
        assert_eq!(merged.kind, AnnouncementType::Banner);
        assert_eq!(merged.popup_type, None);
        assert!(!merged.is_active);
        assert_eq!(merged.discount_link(), None);
    }

    #[test]
    fn test_localize() {
        let view = discount_popup().localize(Language::Th);
        assert_eq!(view.message, "20% off Phi Phi this week");
        let view = discount_popup().localize(Language::Zh);
        assert_eq!(view.message, "皮皮岛本周八折");
    }
}
