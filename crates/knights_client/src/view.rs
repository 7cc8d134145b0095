//! Rendered stage.
//!
//! A [`StageView`] pairs a logical [`Stage`] with its projection and every
//! render handle drawn for it: tile sprites, unit sprites (through the
//! presentation side-table), deployment tiles and highlight tiles.

use knights_core::entity::{Entity, EntityId, Team};
use knights_core::stage::Stage;
use knights_core::transform::IsoTransform;
use knights_core::vector::Vector;
use tracing::{debug, info};

use crate::animation::{entity_idle_key, flip_x};
use crate::config::RenderConfig;
use crate::presentation::PresentationTable;
use crate::render::{RenderHandle, Renderer};

/// Asset key of a grid tile.
pub const TILE_KEY: &str = "base_tile";
/// Asset key of a legal deployment tile.
pub const DEPLOY_TILE_KEY: &str = "deploy_tile";
/// Asset key of the ring shown under a unit after a drag.
pub const FACING_INDICATOR_KEY: &str = "directional_ring";
/// Asset key of a training highlight tile.
pub const HIGHLIGHT_KEY: &str = "highlight_tile";

/// A stage and everything drawn for it.
#[derive(Debug)]
pub struct StageView {
    pub(crate) stage: Stage,
    pub(crate) transform: IsoTransform,
    pub(crate) presentation: PresentationTable,
    pub(crate) settings: RenderConfig,
    cell_handles: Vec<Box<dyn RenderHandle>>,
    deployment_handles: Vec<Box<dyn RenderHandle>>,
    highlight_handles: Vec<Box<dyn RenderHandle>>,
    destroyed: bool,
}

impl StageView {
    /// Wrap a stage. The projection is derived from the tile sprite and
    /// anchored so the whole grid sits right of and below the screen
    /// origin.
    #[must_use]
    pub fn new(stage: Stage, settings: &RenderConfig) -> Self {
        let (sprite_w, sprite_h) = settings.tile_sprite_size;
        let scaled = Vector::new(sprite_w * settings.tile_scalar, sprite_h * settings.tile_scalar);
        let origin = Vector::new(scaled.x, scaled.y * f64::from(stage.height()) / 2.0);
        let transform = IsoTransform::from_tile_sprite(sprite_w, sprite_h, settings.tile_scalar)
            .with_origin(origin);

        Self {
            stage,
            transform,
            presentation: PresentationTable::new(),
            settings: settings.clone(),
            cell_handles: Vec::new(),
            deployment_handles: Vec::new(),
            highlight_handles: Vec::new(),
            destroyed: false,
        }
    }

    /// The logical stage.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The logical stage, mutably.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// The projection.
    #[must_use]
    pub fn transform(&self) -> &IsoTransform {
        &self.transform
    }

    /// Presentation side-table.
    #[must_use]
    pub fn presentation(&self) -> &PresentationTable {
        &self.presentation
    }

    /// Presentation side-table, mutably.
    pub fn presentation_mut(&mut self) -> &mut PresentationTable {
        &mut self.presentation
    }

    /// Whether [`StageView::destroy`] has run.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Draw a tile for every cell, back row first. Returns the screen point
    /// to centre the camera on.
    pub fn render_stage(&mut self, renderer: &mut dyn Renderer) -> Vector {
        for x in (0..self.stage.width()).rev() {
            for y in 0..self.stage.height() {
                let world = self
                    .transform
                    .local_to_world(Vector::new(f64::from(x), f64::from(y)));
                self.cell_handles.push(renderer.add_sprite(TILE_KEY, world));
            }
        }
        let center = self.center_world();
        info!(
            width = self.stage.width(),
            height = self.stage.height(),
            %center,
            "Stage rendered"
        );
        center
    }

    /// Screen position of the stage centre.
    #[must_use]
    pub fn center_world(&self) -> Vector {
        self.transform.local_to_world(self.stage.get_center())
    }

    /// Screen position of a unit's feet on `local`.
    #[must_use]
    pub fn unit_world(&self, local: Vector) -> Vector {
        self.transform
            .entity_world(local, self.settings.entity_adjust_y)
    }

    /// Create sprites for entities that do not have one yet. Returns how
    /// many were created.
    pub fn render_entities(&mut self, renderer: &mut dyn Renderer) -> usize {
        let missing: Vec<EntityId> = self
            .stage
            .entities()
            .iter()
            .filter(|e| !self.presentation.has_handle(e.id))
            .map(|e| e.id)
            .collect();

        for &id in &missing {
            let Some(entity) = self.stage.battle().and_then(|b| b.get(id)) else {
                continue;
            };
            let mut handle = renderer.add_sprite(
                entity.class_key(),
                self.unit_world(entity.spatial.position),
            );
            handle.set_depth(self.settings.unit_depth + entity.spatial.position.y);
            self.presentation.attach(id, handle);
            self.update_entity_facing(id);
        }
        missing.len()
    }

    /// Play the idle animation matching the entity's facing. Dead entities
    /// keep their death frame.
    pub fn update_entity_facing(&mut self, id: EntityId) {
        let Some(entity) = self.stage.battle().and_then(|b| b.get(id)) else {
            return;
        };
        if !entity.is_alive() {
            return;
        }
        let key = entity_idle_key(entity);
        let flip = flip_x(entity.spatial.facing);
        if let Some(handle) = self.presentation.handle_mut(id) {
            handle.play(&key);
            handle.set_flip_x(flip);
        }
    }

    /// Snap dirty sprites to their logical positions. Returns how many
    /// moved.
    pub fn sync_dirty(&mut self) -> usize {
        let mut synced = 0;
        for id in self.presentation.take_dirty() {
            let Some(position) = self
                .stage
                .battle()
                .and_then(|b| b.get(id))
                .map(|e| e.spatial.position)
            else {
                continue;
            };
            let world = self.unit_world(position);
            if let Some(handle) = self.presentation.handle_mut(id) {
                handle.set_position(world);
                synced += 1;
            }
        }
        synced
    }

    /// Re-sort unit sprites so rows further down the grid draw later.
    pub fn refresh_depths(&mut self) {
        let base = self.settings.unit_depth;
        for entity in self.stage.entities() {
            if let Some(handle) = self.presentation.handle_mut(entity.id) {
                handle.set_depth(base + entity.spatial.position.y);
            }
        }
    }

    /// First living unit of `team` whose sprite contains `point`.
    #[must_use]
    pub fn hit_test(&self, team: Team, point: Vector) -> Option<&Entity> {
        self.stage
            .entities()
            .iter()
            .filter(|e| e.team() == team && e.is_alive())
            .find(|e| {
                self.presentation
                    .handle(e.id)
                    .is_some_and(|h| h.contains(point))
            })
    }

    /// Draw a ring under `id` showing its new facing.
    pub fn show_facing_indicator(&mut self, renderer: &mut dyn Renderer, id: EntityId, facing: Vector) {
        let Some(position) = self
            .stage
            .battle()
            .and_then(|b| b.get(id))
            .map(|e| e.spatial.position)
        else {
            return;
        };
        let mut ring = renderer.add_sprite(FACING_INDICATOR_KEY, self.transform.local_to_world(position));
        ring.set_depth(self.settings.facing_depth);
        ring.set_flip_x(flip_x(facing));
        ring.play(if facing.y < 0.0 { "ring_backward" } else { "ring_forward" });
        self.presentation.set_facing_indicator(id, ring);
    }

    /// Draw the legal deployment tiles.
    pub fn render_deployment_tiles(&mut self, renderer: &mut dyn Renderer, tiles: &[Vector]) {
        self.clear_deployment_tiles();
        for tile in tiles {
            let handle = renderer.add_sprite(DEPLOY_TILE_KEY, self.transform.local_to_world(*tile));
            self.deployment_handles.push(handle);
        }
        debug!(tiles = tiles.len(), "Deployment tiles rendered");
    }

    /// Remove the deployment tiles.
    pub fn clear_deployment_tiles(&mut self) {
        destroy_all(&mut self.deployment_handles);
    }

    /// Highlight grid cells, replacing any previous highlight.
    pub fn show_highlights(&mut self, renderer: &mut dyn Renderer, cells: &[Vector]) {
        self.clear_highlights();
        for cell in cells {
            let mut handle = renderer.add_sprite(HIGHLIGHT_KEY, self.transform.local_to_world(*cell));
            handle.set_depth(self.settings.facing_depth);
            handle.set_alpha(0.5);
            self.highlight_handles.push(handle);
        }
    }

    /// Remove highlight tiles.
    pub fn clear_highlights(&mut self) {
        destroy_all(&mut self.highlight_handles);
    }

    /// Number of highlight tiles shown.
    #[must_use]
    pub fn highlight_count(&self) -> usize {
        self.highlight_handles.len()
    }

    /// Number of tile sprites drawn.
    #[must_use]
    pub fn cell_handle_count(&self) -> usize {
        self.cell_handles.len()
    }

    /// Detach every handle, then release the battle. Safe to call
    /// repeatedly and on a stage that was never rendered.
    pub fn destroy(&mut self) {
        self.presentation.destroy_all();
        destroy_all(&mut self.cell_handles);
        self.clear_deployment_tiles();
        self.clear_highlights();
        self.stage.destroy();
        if !self.destroyed {
            debug!("Stage view destroyed");
        }
        self.destroyed = true;
    }
}

fn destroy_all(handles: &mut Vec<Box<dyn RenderHandle>>) {
    for mut handle in handles.drain(..) {
        handle.destroy();
    }
}
