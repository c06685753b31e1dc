//! Procurement log entry
//!
//! A procurement item tracks one material package from order to delivery.
//! The drop-dead date and delivery status are derived from the
//! required-on-site date, lead time and order date; call
//! [`ProcurementItem::recompute`] after changing any of those inputs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::fields::{display_or_empty, empty_as_none, loose_text};
use crate::core::entity::LineItem;
use crate::core::identity::{ItemId, ItemKind};
use crate::core::store;
use crate::core::schedule::{self, DeliveryStatus, RiskTier};

fn new_procurement_id() -> ItemId {
    ItemId::new(ItemKind::Procurement)
}

fn procurement_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ItemId, D::Error> {
    ItemId::deserialize_or_new(deserializer, ItemKind::Procurement)
}

/// A comment left on a procurement item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default, deserialize_with = "loose_text")]
    pub text: String,

    /// `None` for comments stored without a readable time
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(rename = "user", default, deserialize_with = "loose_text")]
    pub author: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredComments {
    List(Vec<Comment>),
    Text(String),
    Other(IgnoredAny),
}

/// Comments are normally a list; a plain note string becomes one undated comment
fn comment_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Comment>, D::Error> {
    Ok(match Option::<StoredComments>::deserialize(deserializer)? {
        Some(StoredComments::List(comments)) => comments,
        Some(StoredComments::Text(text)) if !text.trim().is_empty() => vec![Comment {
            text,
            timestamp: None,
            author: String::new(),
        }],
        _ => Vec::new(),
    })
}

/// Procurement log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementItem {
    /// Generated for records written before ids existed
    #[serde(default = "new_procurement_id", deserialize_with = "procurement_id")]
    pub id: ItemId,

    #[serde(default, deserialize_with = "loose_text")]
    pub project_name: String,

    /// Specification section number (digits only, up to 8)
    #[serde(default, deserialize_with = "loose_text")]
    pub specifications: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub title_product: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub material_id: String,

    #[serde(default, deserialize_with = "loose_text")]
    pub vendor_partner: String,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub required_onsite_date: Option<NaiveDate>,

    /// Lead time in weeks
    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub lead_time: Option<u32>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub drop_dead_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub order_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "empty_as_none", serialize_with = "display_or_empty")]
    pub status: Option<DeliveryStatus>,

    #[serde(default, deserialize_with = "comment_list", skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
}

impl ProcurementItem {
    /// Create an empty row for a project
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            id: new_procurement_id(),
            project_name: project_name.into(),
            specifications: String::new(),
            title_product: String::new(),
            material_id: String::new(),
            vendor_partner: String::new(),
            required_onsite_date: None,
            lead_time: None,
            drop_dead_date: None,
            order_date: None,
            status: None,
            comments: Vec::new(),
        }
    }

    /// Re-derive the drop-dead date and delivery status from the inputs
    pub fn recompute(&mut self) {
        self.drop_dead_date = schedule::drop_dead_date(self.required_onsite_date, self.lead_time);
        self.status = schedule::delivery_status(self.order_date, self.drop_dead_date);
    }

    pub fn risk_tier(&self) -> RiskTier {
        schedule::risk_tier(self.required_onsite_date, self.order_date)
    }

    pub fn is_delayed(&self) -> bool {
        self.status == Some(DeliveryStatus::Delayed)
    }

    /// Append a comment stamped with the current time
    pub fn add_comment(&mut self, text: impl Into<String>, author: impl Into<String>) {
        self.comments.push(Comment {
            text: text.into(),
            timestamp: Some(Utc::now()),
            author: author.into(),
        });
    }
}

impl LineItem for ProcurementItem {
    const KIND: ItemKind = ItemKind::Procurement;
    const STORE_KEY: &'static str = store::PROCUREMENT_ITEMS;

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
