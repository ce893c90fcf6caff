//! Tool Favorites and Recent Usage
//!
//! Tracks which utility tools (e.g. the unit converter) the user has starred
//! and which they used last, as two JSON arrays of tool ids in the shared
//! storage substrate.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::Storage;
use crate::error::StorageError;
use crate::favorites::{load_list, save_list};

pub const TOOL_FAVORITES_STORAGE_KEY: &str = "tool_favorites";
pub const TOOL_RECENT_STORAGE_KEY: &str = "tool_recent_usage";

/// Length of the recent-usage history.
pub const MAX_RECENT_ITEMS: usize = 10;

#[derive(Clone)]
pub struct ToolFavorites {
    storage: Arc<dyn Storage>,
}

impl ToolFavorites {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    fn read(&self, key: &str) -> Vec<String> {
        load_list(self.storage.as_ref(), key).unwrap_or_else(|e| {
            error!(key, error = %e, "failed to read tool list");
            Vec::new()
        })
    }

    fn write(&self, key: &str, ids: &[String]) -> Result<(), StorageError> {
        save_list(self.storage.as_ref(), key, ids)
            .inspect_err(|e| error!(key, error = %e, "failed to write tool list"))
    }

    // == Favorites ==
    /// Starred tool ids in the order they were starred.
    pub fn favorites(&self) -> Vec<String> {
        self.read(TOOL_FAVORITES_STORAGE_KEY)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites().iter().any(|t| t == id)
    }

    /// Stars `id`. `Ok(false)` if it already was.
    pub fn add_favorite(&self, id: &str) -> Result<bool, StorageError> {
        let mut ids = self.favorites();
        if ids.iter().any(|t| t == id) {
            return Ok(false);
        }
        ids.push(id.to_string());
        self.write(TOOL_FAVORITES_STORAGE_KEY, &ids).map(|()| true)
    }

    /// Unstars `id`. `Ok(false)` if it was not starred.
    pub fn remove_favorite(&self, id: &str) -> Result<bool, StorageError> {
        let ids = self.favorites();
        let before = ids.len();
        let kept: Vec<String> = ids.into_iter().filter(|t| t != id).collect();
        if kept.len() == before {
            return Ok(false);
        }
        self.write(TOOL_FAVORITES_STORAGE_KEY, &kept).map(|()| true)
    }

    /// Flips the starred state of `id` and returns the new state.
    pub fn toggle_favorite(&self, id: &str) -> Result<bool, StorageError> {
        if self.is_favorite(id) {
            self.remove_favorite(id).map(|_| false)
        } else {
            self.add_favorite(id).map(|_| true)
        }
    }

    pub fn clear_favorites(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOOL_FAVORITES_STORAGE_KEY)
    }

    // == Recent Usage ==
    /// Recently used tool ids, most recent first.
    pub fn recent(&self) -> Vec<String> {
        self.read(TOOL_RECENT_STORAGE_KEY)
    }

    /// Moves `id` to the front of the history, keeping at most
    /// [`MAX_RECENT_ITEMS`] entries.
    pub fn record_usage(&self, id: &str) -> Result<(), StorageError> {
        let mut ids: Vec<String> = self.recent().into_iter().filter(|t| t != id).collect();
        ids.insert(0, id.to_string());
        ids.truncate(MAX_RECENT_ITEMS);

        debug!(tool = id, "recorded tool usage");
        self.write(TOOL_RECENT_STORAGE_KEY, &ids)
    }

    pub fn clear_recent(&self) -> Result<(), StorageError> {
        self.storage.remove_item(TOOL_RECENT_STORAGE_KEY)
    }
}
