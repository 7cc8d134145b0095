//! Per-entity presentation side-table.
//!
//! Logical entities never carry render state. The client keeps it here,
//! keyed by [`EntityId`], and drops it wholesale when the stage is
//! replaced.

use std::collections::HashMap;

use knights_core::entity::EntityId;

use crate::render::RenderHandle;

/// Presentation state of one entity.
#[derive(Debug, Default)]
pub struct Presentation {
    /// The unit sprite.
    pub render_handle: Option<Box<dyn RenderHandle>>,
    /// Whether the sprite needs to be snapped to the logical position.
    pub dirty: bool,
    /// Transient facing indicator from the last local gesture.
    pub facing_indicator: Option<Box<dyn RenderHandle>>,
}

impl Presentation {
    /// Destroy every handle held.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.render_handle.take() {
            handle.destroy();
        }
        self.clear_facing_indicator();
    }

    /// Destroy the facing indicator, if any.
    pub fn clear_facing_indicator(&mut self) {
        if let Some(mut indicator) = self.facing_indicator.take() {
            indicator.destroy();
        }
    }
}

/// Side-table of presentation state.
#[derive(Debug, Default)]
pub struct PresentationTable {
    entries: HashMap<EntityId, Presentation>,
}

impl PresentationTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `id`, if any.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Presentation> {
        self.entries.get(&id)
    }

    /// Entry for `id`, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Presentation> {
        self.entries.get_mut(&id)
    }

    /// Entry for `id`, created empty if missing.
    pub fn entry(&mut self, id: EntityId) -> &mut Presentation {
        self.entries.entry(id).or_default()
    }

    /// Whether `id` already has a sprite.
    #[must_use]
    pub fn has_handle(&self, id: EntityId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|p| p.render_handle.is_some())
    }

    /// Sprite of `id`.
    #[must_use]
    pub fn handle(&self, id: EntityId) -> Option<&dyn RenderHandle> {
        self.entries.get(&id)?.render_handle.as_deref()
    }

    /// Sprite of `id`, mutably.
    pub fn handle_mut(&mut self, id: EntityId) -> Option<&mut (dyn RenderHandle + 'static)> {
        self.entries.get_mut(&id)?.render_handle.as_deref_mut()
    }

    /// Attach a sprite to `id`, destroying any previous one. The entry is
    /// marked dirty.
    pub fn attach(&mut self, id: EntityId, handle: Box<dyn RenderHandle>) {
        let entry = self.entry(id);
        if let Some(mut old) = entry.render_handle.replace(handle) {
            old.destroy();
        }
        entry.dirty = true;
    }

    /// Replace the facing indicator of `id`.
    pub fn set_facing_indicator(&mut self, id: EntityId, indicator: Box<dyn RenderHandle>) {
        let entry = self.entry(id);
        entry.clear_facing_indicator();
        entry.facing_indicator = Some(indicator);
    }

    /// Whether any entity shows a facing indicator.
    #[must_use]
    pub fn has_facing_indicator(&self) -> bool {
        self.entries.values().any(|p| p.facing_indicator.is_some())
    }

    /// Destroy every facing indicator.
    pub fn clear_facing_indicators(&mut self) {
        for entry in self.entries.values_mut() {
            entry.clear_facing_indicator();
        }
    }

    /// Flag `id` for a position sync.
    pub fn mark_dirty(&mut self, id: EntityId) {
        self.entry(id).dirty = true;
    }

    /// IDs flagged dirty, clearing the flags.
    pub fn take_dirty(&mut self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .entries
            .iter_mut()
            .filter(|(_, p)| p.dirty)
            .map(|(id, p)| {
                p.dirty = false;
                *id
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Destroy every handle and forget every entry. Safe to repeat.
    pub fn destroy_all(&mut self) {
        for entry in self.entries.values_mut() {
            entry.release();
        }
        self.entries.clear();
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
