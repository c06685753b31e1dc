//! LineItem trait - common interface for procurement and submittal rows

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{ItemId, ItemKind};

/// A row in one of the per-project logs
pub trait LineItem: Serialize + DeserializeOwned {
    /// Which log the row belongs to
    const KIND: ItemKind;

    /// Store key holding the whole collection
    const STORE_KEY: &'static str;

    fn id(&self) -> &ItemId;

    /// Name of the project the row belongs to
    fn project_name(&self) -> &str;

    /// Product title shown in summaries
    fn title(&self) -> &str;
}
