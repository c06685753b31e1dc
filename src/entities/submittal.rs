//! Submittal log entry (design review workflow)

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::fields::{display_or_empty, empty_as_none, loose_text};
use crate::core::entity::LineItem;
use crate::core::identity::{ItemId, ItemKind};
use crate::core::store;

fn new_submittal_id() -> ItemId {
    ItemId::new(ItemKind::Submittal)
}

fn submittal_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ItemId, D::Error> {
    ItemId::deserialize_or_new(deserializer, ItemKind::Submittal)
}

/// Review outcome / state of a submittal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmittalStatus {
    /// Exceptions as noted
    Ean,
    /// No exceptions noted
    Nen,
    /// Revise and resubmit
    ReviseResubmit,
    Closeout,
    ForRecord,
    Pending,
}

impl SubmittalStatus {
    pub fn all() -> &'static [SubmittalStatus] {
        &[
            SubmittalStatus::Ean,
            SubmittalStatus::Nen,
            SubmittalStatus::ReviseResubmit,
            SubmittalStatus::Closeout,
            SubmittalStatus::ForRecord,
            SubmittalStatus::Pending,
        ]
    }
}

impl std::fmt::Display for SubmittalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmittalStatus::Ean => write!(f, "EAN"),
            SubmittalStatus::Nen => write!(f, "NEN"),
            SubmittalStatus::ReviseResubmit => write!(f, "R&R"),
            SubmittalStatus::Closeout => write!(f, "Closeout"),
            SubmittalStatus::ForRecord => write!(f, "For Record"),
            SubmittalStatus::Pending => write!(f, "Pending"),
        }
    }
}

impl std::str::FromStr for SubmittalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").trim() {
            "ean" => Ok(SubmittalStatus::Ean),
            "nen" => Ok(SubmittalStatus::Nen),
            "r&r" | "rr" | "revise and resubmit" => Ok(SubmittalStatus::ReviseResubmit),
            "closeout" => Ok(SubmittalStatus::Closeout),
            "for record" | "forrecord" => Ok(SubmittalStatus::ForRecord),
            "pending" => Ok(SubmittalStatus::Pending),
            _ => Err(format!(
                "Invalid submittal status: {}. Use ean, nen, rr, closeout, for-record, or pending",
                s
            )),
        }
    }
}

/// Submittal log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittalItem {
    #[serde(default = "new_submittal_id", deserialize_with = "submittal_id")]
    pub id: ItemId,

    #[serde(default, deserialize_with = "loose_text")]
    pub project_name: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub specifications: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub title_product: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub material_id: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub vendor_partner: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub submittal_manager: String,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub submittal_status: Option<SubmittalStatus>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub date_received: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub date_sent_design: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub due_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub date_review_received: Option<NaiveDate>,

    /// Date the reviewed submittal went back to the subcontractor
    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub date_issued_sub: Option<NaiveDate>,

    #[serde(default, deserialize_with = "loose_text")]
    pub comments: String,
}

impl SubmittalItem {
    /// Create an empty row for a project
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            id: new_submittal_id(),
            project_name: project_name.into(),
            specifications: String::new(),
            title_product: String::new(),
            material_id: String::new(),
            vendor_partner: String::new(),
            submittal_manager: String::new(),
            submittal_status: None,
            date_received: None,
            date_sent_design: None,
            due_date: None,
            date_review_received: None,
            date_issued_sub: None,
            comments: String::new(),
        }
    }
}

impl LineItem for SubmittalItem {
    const KIND: ItemKind = ItemKind::Submittal;
    const STORE_KEY: &'static str = store::SUBMITTAL_ITEMS;

    fn id(&self) -> &ItemId {
        &self.id
    }

    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn title(&self) -> &str {
        &self.title_product
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_matches_log_labels() {
        let labels: Vec<String> = SubmittalStatus::all().iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, ["EAN", "NEN", "R&R", "Closeout", "For Record", "Pending"]);
    }

    #[test]
    fn test_status_parsing() {
        for status in SubmittalStatus::all() {
            assert_eq!(status.to_string().parse::<SubmittalStatus>().unwrap(), *status);
        }
        assert_eq!("rr".parse::<SubmittalStatus>().unwrap(), SubmittalStatus::ReviseResubmit);
        assert_eq!(
            "for-record".parse::<SubmittalStatus>().unwrap(),
            SubmittalStatus::ForRecord
        );
        assert!("approved".parse::<SubmittalStatus>().is_err());
    }

    #[test]
    fn test_record_shape() {
        let json = r#"{
            "projectName": "Harbor Tower",
            "specifications": "08410",
            "titleProduct": "Curtain wall",
            "materialId": "CW-1",
            "vendorPartner": "Glazing Co",
            "submittalManager": "Lee",
            "submittalStatus": "R&R",
            "dateReceived": "2025-05-01",
            "dateSentDesign": "",
            "dueDate": "2025-05-15",
            "dateReviewReceived": "",
            "dateIssuedSub": "",
            "comments": "resubmit anchors"
        }"#;
        let item: SubmittalItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.submittal_status, Some(SubmittalStatus::ReviseResubmit));
        assert!(item.date_sent_design.is_none());
        assert_eq!(item.due_date, NaiveDate::from_ymd_opt(2025, 5, 15));

        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["submittalStatus"], "R&R");
        assert_eq!(back["dateIssuedSub"], "");
        assert!(back["id"].as_str().unwrap().starts_with("SUB-"));
    }

    #[test]
    fn test_null_fields_from_unsaved_forms() {
        let json = r#"{"projectName": null, "titleProduct": "Anchors", "comments": null, "submittalStatus": false}"#;
        let item: SubmittalItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.project_name, "");
        assert_eq!(item.title_product, "Anchors");
        assert_eq!(item.comments, "");
        assert!(item.submittal_status.is_none());
    }
}
