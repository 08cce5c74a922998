//! Host scene interface and an in-memory scene implementation.

use crate::camera::Viewport;
use crate::error::{SnapError, SnapResult};
use crate::shapes::{Block, ShapeId, SnapShape};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the engine needs from the host scene graph.
pub trait SceneHost {
    /// Shapes directly inside `container` (None = scene root), back to front.
    fn shapes_under(&self, container: Option<ShapeId>) -> Vec<&dyn SnapShape>;

    /// Container of a shape, if it is nested.
    fn container_of(&self, id: ShapeId) -> Option<ShapeId>;

    /// Look up a shape. Returns None once the shape is gone.
    fn shape(&self, id: ShapeId) -> Option<&dyn SnapShape>;

    /// Look up a shape for mutation.
    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut dyn SnapShape>;

    /// The current view, for zoom and culling.
    fn viewport(&self) -> &Viewport;

    /// Move a shape to `position` in its parent's space. Returns false if
    /// the shape is gone.
    fn move_shape(&mut self, id: ShapeId, position: Point) -> bool {
        match self.shape_mut(id) {
            Some(shape) => {
                shape.set_position(position);
                true
            }
            None => false,
        }
    }
}

/// In-memory scene of blocks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    /// All blocks, keyed by ID.
    blocks: HashMap<ShapeId, Block>,
    /// Z-order of blocks (back to front).
    z_order: Vec<ShapeId>,
    /// The current view.
    #[serde(default)]
    pub viewport: Viewport,
}

/// Serialized layout of a scene: blocks listed back to front.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub viewport: Viewport,
    pub blocks: Vec<Block>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block on top. Its container, if any, must already exist.
    pub fn insert(&mut self, mut block: Block) -> SnapResult<ShapeId> {
        block.parent_origin = match block.parent {
            Some(parent) => self
                .blocks
                .get(&parent)
                .map(|p| p.root_origin().to_vec2())
                .ok_or(SnapError::UnknownShape(parent))?,
            None => Vec2::ZERO,
        };
        let id = block.id;
        if self.blocks.insert(id, block).is_none() {
            self.z_order.push(id);
        }
        Ok(id)
    }

    /// Remove a block and everything nested inside it.
    pub fn remove(&mut self, id: ShapeId) -> Option<Block> {
        let removed = self.blocks.remove(&id)?;
        self.z_order.retain(|&shape_id| shape_id != id);
        let children: Vec<ShapeId> = self
            .blocks
            .values()
            .filter(|b| b.parent == Some(id))
            .map(|b| b.id)
            .collect();
        for child in children {
            self.remove(child);
        }
        Some(removed)
    }

    /// Get a block by ID.
    pub fn get(&self, id: ShapeId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Move a block (and its nested blocks) by a delta.
    pub fn translate(&mut self, id: ShapeId, delta: Vec2) -> SnapResult<()> {
        let block = self.blocks.get_mut(&id).ok_or(SnapError::UnknownShape(id))?;
        block.position += delta;
        self.refresh_origins(id);
        Ok(())
    }

    /// Recompute cached parent origins below `id` after it moved.
    fn refresh_origins(&mut self, id: ShapeId) {
        let Some(origin) = self.blocks.get(&id).map(|b| b.root_origin().to_vec2()) else {
            return;
        };
        let children: Vec<ShapeId> = self
            .blocks
            .values()
            .filter(|b| b.parent == Some(id))
            .map(|b| b.id)
            .collect();
        for child in children {
            if let Some(block) = self.blocks.get_mut(&child) {
                block.parent_origin = origin;
            }
            self.refresh_origins(child);
        }
    }

    /// Blocks in z-order (back to front).
    pub fn blocks_ordered(&self) -> impl Iterator<Item = &Block> {
        self.z_order.iter().filter_map(|id| self.blocks.get(id))
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Get the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Build a scene from its file layout. Containers must precede their
    /// children and the viewport zoom must be usable.
    pub fn from_file(file: SceneFile) -> SnapResult<Self> {
        file.viewport.validate()?;
        let mut scene = Scene {
            viewport: file.viewport,
            ..Default::default()
        };
        for block in file.blocks {
            scene.insert(block)?;
        }
        Ok(scene)
    }

    /// Convert to the file layout.
    pub fn to_file(&self) -> SceneFile {
        SceneFile {
            viewport: self.viewport.clone(),
            blocks: self.blocks_ordered().cloned().collect(),
        }
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> SnapResult<Self> {
        let file: SceneFile = serde_json::from_str(json)?;
        Self::from_file(file)
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> SnapResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_file())?)
    }
}

impl SceneHost for Scene {
    fn shapes_under(&self, container: Option<ShapeId>) -> Vec<&dyn SnapShape> {
        self.blocks_ordered()
            .filter(|b| b.parent == container)
            .map(|b| b as &dyn SnapShape)
            .collect()
    }

    fn container_of(&self, id: ShapeId) -> Option<ShapeId> {
        self.blocks.get(&id).and_then(|b| b.parent)
    }

    fn shape(&self, id: ShapeId) -> Option<&dyn SnapShape> {
        self.blocks.get(&id).map(|b| b as &dyn SnapShape)
    }

    fn shape_mut(&mut self, id: ShapeId) -> Option<&mut dyn SnapShape> {
        self.blocks.get_mut(&id).map(|b| b as &mut dyn SnapShape)
    }

    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn move_shape(&mut self, id: ShapeId, position: Point) -> bool {
        self.set_position(id, position).is_ok()
    }
}

impl Scene {
    /// Set a block's position in its parent's space, keeping nested blocks attached.
    pub fn set_position(&mut self, id: ShapeId, position: Point) -> SnapResult<()> {
        let block = self.blocks.get_mut(&id).ok_or(SnapError::UnknownShape(id))?;
        block.position = position;
        self.refresh_origins(id);
        Ok(())
    }
}
