#![forbid(unsafe_code)]

//! Grid items and their identifiers.
//!
//! A [`GridItem`] is owned by the caller. Engine functions take `&[GridItem<C>]`
//! and return new positions; nothing in Tessel keeps a copy of the collection
//! between calls.
//!
//! The `content` payload is opaque to the engine. It participates in no
//! position or collision logic.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::geometry::{GridPosition, GridSize};

/// Caller-assigned unique identifier of a grid item.
///
/// Backed by an `Arc<str>` so that ids can be cloned into collision results,
/// keyboard state, and animation bookkeeping without reallocating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Arc<str>);

impl ItemId {
    /// Create a new id.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// The id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ItemId {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ItemId {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// A widget placed on the grid.
///
/// `C` is the opaque content payload; it defaults to `()` for layout-only use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem<C = ()> {
    /// Unique, caller-assigned identifier.
    pub id: ItemId,
    /// Current committed position.
    pub position: GridPosition,
    /// Smallest size a resize may produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<GridSize>,
    /// Largest size a resize may produce.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<GridSize>,
    /// Whether the item accepts resize requests.
    #[serde(default = "default_true")]
    pub is_resizable: bool,
    /// Whether the item accepts move requests.
    #[serde(default = "default_true")]
    pub is_draggable: bool,
    /// Opaque payload carried alongside the geometry.
    pub content: C,
}

fn default_true() -> bool {
    true
}

impl GridItem<()> {
    /// Create a layout-only item with no content.
    pub fn new(id: impl Into<ItemId>, position: GridPosition) -> Self {
        Self::with_content(id, position, ())
    }
}

impl<C> GridItem<C> {
    /// Create an item carrying `content`.
    pub fn with_content(id: impl Into<ItemId>, position: GridPosition, content: C) -> Self {
        Self {
            id: id.into(),
            position,
            min_size: None,
            max_size: None,
            is_resizable: true,
            is_draggable: true,
            content,
        }
    }

    /// Set the minimum size (builder pattern).
    #[must_use]
    pub fn min_size(mut self, size: GridSize) -> Self {
        self.min_size = Some(size);
        self
    }

    /// Set the maximum size (builder pattern).
    #[must_use]
    pub fn max_size(mut self, size: GridSize) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Set whether the item may be resized (builder pattern).
    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.is_resizable = resizable;
        self
    }

    /// Set whether the item may be moved (builder pattern).
    #[must_use]
    pub fn draggable(mut self, draggable: bool) -> Self {
        self.is_draggable = draggable;
        self
    }

    /// Copy of this item at a different position.
    #[must_use]
    pub fn at(&self, position: GridPosition) -> Self
    where
        C: Clone,
    {
        Self {
            position,
            ..self.clone()
        }
    }

    /// Clamp a requested size into this item's own min/max bounds.
    pub fn constrain_size(&self, size: GridSize) -> GridSize {
        let min = self.min_size.unwrap_or(GridSize::new(1, 1));
        let max = self.max_size.unwrap_or(GridSize::new(u16::MAX, u16::MAX));
        size.clamp(min, max)
    }
}

impl<C: DeserializeOwned> GridItem<C> {
    /// Replace the content from an externally supplied JSON document.
    ///
    /// On a parse failure the previous content is kept and the parse error
    /// is returned. Position and size are never touched.
    pub fn update_content_from_json(&mut self, raw: &str) -> Result<(), serde_json::Error> {
        match serde_json::from_str::<C>(raw) {
            Ok(content) => {
                self.content = content;
                Ok(())
            }
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    target: "tessel.item",
                    item_id = %self.id,
                    error = %err,
                    "discarding malformed item content"
                );
                Err(err)
            }
        }
    }
}

/// Find an item by id.
pub fn find_item<'a, C>(items: &'a [GridItem<C>], id: &str) -> Option<&'a GridItem<C>> {
    items.iter().find(|item| item.id.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Panel {
        title: String,
    }

    #[test]
    fn id_compares_with_str() {
        let id = ItemId::new("chat");
        assert_eq!(id, "chat");
        assert_eq!(id.to_string(), "chat");
        assert_eq!(ItemId::from(String::from("chat")), id);
    }

    #[test]
    fn builder_sets_flags() {
        let item = GridItem::new("a", GridPosition::new(0, 0, 2, 2))
            .draggable(false)
            .resizable(false)
            .min_size(GridSize::new(2, 1));
        assert!(!item.is_draggable);
        assert!(!item.is_resizable);
        assert_eq!(item.min_size, Some(GridSize::new(2, 1)));
    }

    #[test]
    fn constrain_size_uses_item_bounds() {
        let item = GridItem::new("a", GridPosition::new(0, 0, 2, 2))
            .min_size(GridSize::new(2, 2))
            .max_size(GridSize::new(4, 3));
        assert_eq!(item.constrain_size(GridSize::new(1, 9)), GridSize::new(2, 3));
        let free = GridItem::new("b", GridPosition::new(0, 0, 2, 2));
        assert_eq!(free.constrain_size(GridSize::new(0, 0)), GridSize::new(1, 1));
    }

    #[test]
    fn malformed_content_keeps_previous_value() {
        let mut item = GridItem::with_content(
            "terminal",
            GridPosition::new(0, 0, 4, 3),
            Panel {
                title: "Terminal".into(),
            },
        );
        assert!(item.update_content_from_json("{\"title\": 42").is_err());
        assert_eq!(item.content.title, "Terminal");

        assert!(item.update_content_from_json("{\"title\": \"Shell\"}").is_ok());
        assert_eq!(item.content.title, "Shell");
    }

    #[test]
    fn item_deserializes_with_defaults() {
        let item: GridItem<()> = serde_json::from_str(
            r#"{"id":"voice","position":{"x":1,"y":2,"width":3,"height":4},"content":null}"#,
        )
        .unwrap();
        assert_eq!(item.id, "voice");
        assert!(item.is_draggable);
        assert!(item.is_resizable);
        assert_eq!(item.min_size, None);
    }

    #[test]
    fn find_item_by_id() {
        let items = vec![
            GridItem::new("a", GridPosition::new(0, 0, 1, 1)),
            GridItem::new("b", GridPosition::new(1, 0, 1, 1)),
        ];
        assert_eq!(find_item(&items, "b").map(|i| i.position.x), Some(1));
        assert!(find_item(&items, "z").is_none());
    }
}
