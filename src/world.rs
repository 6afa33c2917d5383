use error_chain::bail;
use log::debug;

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::errors::*;
use crate::physics::{BoundingBox, BoundingBoxId, PhysicsWorld};
use crate::tile_grid::{MazeTile, TileGrid};
use crate::utils;
use crate::utils::FnvHashMap;

/// Edge length of one tile in world units. Walls are as tall as a tile is wide.
pub const TILE_WORLD_SIZE: f32 = 5.0;

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 3, 1];
// Texture corners for the four vertices of every quad.
const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 0.0], [0.0, 0.0], [1.0, 1.0]];

const DOOR_NEAR: f32 = 2.4;
const DOOR_FAR: f32 = 2.6;
const PORTAL_NEAR: f32 = 2.0;
const PORTAL_FAR: f32 = 3.0;

/// A point in the 3D world. The floor is the y = 0 plane and tile rows run towards -z.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPosition {
    pub fn new(x: f32, y: f32, z: f32) -> WorldPosition {
        WorldPosition { x, y, z }
    }

    /// The middle of a tile, standing on the floor.
    pub fn tile_centre(tile: Cartesian2DCoordinate) -> WorldPosition {
        let half = TILE_WORLD_SIZE / 2.0;
        WorldPosition::new(tile.x as f32 * TILE_WORLD_SIZE + half,
                           0.0,
                           -(tile.y as f32 * TILE_WORLD_SIZE + half))
    }

    /// The tile under this position, None when it is off the grid's negative edges.
    pub fn tile(&self) -> Option<Cartesian2DCoordinate> {
        let plane_x = self.x / TILE_WORLD_SIZE;
        let plane_y = -self.z / TILE_WORLD_SIZE;
        if plane_x < 0.0 || plane_y < 0.0 || !plane_x.is_finite() || !plane_y.is_finite() {
            return None;
        }
        Some(Cartesian2DCoordinate::new(plane_x.floor() as u32, plane_y.floor() as u32))
    }
}

/// Position, texture coordinates and colour, laid out as 8 consecutive floats.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub colour: [f32; 3],
}

impl Vertex {
    pub const FLOATS: usize = 8;
}

/// Indexed triangles built from quads, ready to hand to a renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBatch {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl GeometryBatch {
    /// Corners go in as: a corner, its opposite corner, then the remaining two.
    fn push_quad(&mut self, corners: [[f32; 3]; 4]) {
        let base = self.vertices.len() as u32;
        for (position, tex_coords) in corners.iter().zip(QUAD_TEX_COORDS.iter()) {
            self.vertices.push(Vertex {
                position: *position,
                tex_coords: *tex_coords,
                colour: WHITE,
            });
        }
        self.indices.extend(QUAD_INDICES.iter().map(|i| base + i));
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn quads_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Interleaved vertex data, `Vertex::FLOATS` per vertex.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut floats = Vec::with_capacity(self.vertices.len() * Vertex::FLOATS);
        for v in &self.vertices {
            floats.extend_from_slice(&v.position);
            floats.extend_from_slice(&v.tex_coords);
            floats.extend_from_slice(&v.colour);
        }
        floats
    }
}

/// Opaque reference to the mesh drawn for a dynamic object.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct RenderHandle(usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DynamicObjectKind {
    Door,
    ExitPortal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicObject {
    kind: DynamicObjectKind,
    tile: Cartesian2DCoordinate,
    bounding_box: BoundingBoxId,
    render_handle: RenderHandle,
}

impl DynamicObject {
    #[inline]
    pub fn kind(&self) -> DynamicObjectKind {
        self.kind
    }
    #[inline]
    pub fn tile(&self) -> Cartesian2DCoordinate {
        self.tile
    }
    #[inline]
    pub fn bounding_box(&self) -> BoundingBoxId {
        self.bounding_box
    }
    #[inline]
    pub fn render_handle(&self) -> RenderHandle {
        self.render_handle
    }
}

/// Everything built from a tile grid: static geometry, the dynamic object registry and the
/// collision boxes.
#[derive(Clone, Debug)]
pub struct World {
    side: usize,
    floor: GeometryBatch,
    walls: GeometryBatch,
    dynamic_meshes: Vec<GeometryBatch>,
    dynamic_objects: FnvHashMap<Cartesian2DCoordinate, DynamicObject>,
    physics_world: PhysicsWorld,
}

impl World {
    #[inline]
    pub fn floor(&self) -> &GeometryBatch {
        &self.floor
    }

    /// Walls and ceilings.
    #[inline]
    pub fn walls(&self) -> &GeometryBatch {
        &self.walls
    }

    pub fn dynamic_mesh(&self, handle: RenderHandle) -> Option<&GeometryBatch> {
        self.dynamic_meshes.get(handle.0)
    }

    #[inline]
    pub fn physics_world(&self) -> &PhysicsWorld {
        &self.physics_world
    }

    /// The door or exit portal in the tile containing `position`, if there is one.
    pub fn dynamic_object(&self, position: WorldPosition) -> Option<&DynamicObject> {
        let tile = position.tile()?;
        if tile.x as usize >= self.side || tile.y as usize >= self.side {
            return None;
        }
        self.dynamic_objects.get(&tile)
    }

    pub fn dynamic_object_at_tile(&self, tile: Cartesian2DCoordinate) -> Option<&DynamicObject> {
        self.dynamic_objects.get(&tile)
    }

    /// Takes an object out of the registry and permanently disables its collision box.
    pub fn remove_dynamic_object(&mut self, tile: Cartesian2DCoordinate) -> Option<DynamicObject> {
        let removed = self.dynamic_objects.remove(&tile)?;
        self.physics_world.disable(removed.bounding_box);
        debug!("removed {:?} at {:?}", removed.kind, tile);
        Some(removed)
    }

    pub fn dynamic_objects(&self) -> impl Iterator<Item = &DynamicObject> {
        self.dynamic_objects.values()
    }

    pub fn count_dynamic_objects(&self, kind: DynamicObjectKind) -> usize {
        self.dynamic_objects.values().filter(|object| object.kind == kind).count()
    }
}

/// Walks a tile grid once and emits a `World`.
#[derive(Debug, Default)]
pub struct WorldBuilder {
    floor: GeometryBatch,
    walls: GeometryBatch,
    dynamic_meshes: Vec<GeometryBatch>,
    dynamic_objects: Vec<DynamicObject>,
    physics_world: PhysicsWorld,
}

impl WorldBuilder {
    pub fn new() -> WorldBuilder {
        WorldBuilder::default()
    }

    pub fn build(mut self, grid: &TileGrid) -> Result<World> {
        for (coord, tile) in grid.iter() {
            let (x, y) = (coord.x as f32 * TILE_WORLD_SIZE, coord.y as f32 * TILE_WORLD_SIZE);

            if tile == MazeTile::Void {
                self.physics_world
                    .add(BoundingBox::new(x, x + TILE_WORLD_SIZE, y, y + TILE_WORLD_SIZE));
                continue;
            }

            let void_at = |dir: CompassPrimary| grid.neighbour_tile(coord, dir) == MazeTile::Void;

            match tile {
                MazeTile::Door => {
                    let across_x = void_at(CompassPrimary::West) && void_at(CompassPrimary::East);
                    let across_y = void_at(CompassPrimary::North) && void_at(CompassPrimary::South);
                    self.build_door(coord, across_x, across_y)?;
                }
                MazeTile::ExitPortal => self.build_exit_portal(coord),
                _ => {}
            }

            self.build_floor(x, y);
            self.build_ceiling(x, y);
            if void_at(CompassPrimary::West) {
                self.build_left_wall(x, y);
            }
            if void_at(CompassPrimary::East) {
                self.build_right_wall(x, y);
            }
            if void_at(CompassPrimary::North) {
                self.build_front_wall(x, y);
            }
            if void_at(CompassPrimary::South) {
                self.build_back_wall(x, y);
            }
        }

        debug!("world built: {} floor quads, {} wall quads, {} dynamic objects, {} bounding boxes",
               self.floor.quads_count(),
               self.walls.quads_count(),
               self.dynamic_objects.len(),
               self.physics_world.len());

        let mut registry = utils::fnv_hashmap(self.dynamic_objects.len());
        for object in self.dynamic_objects {
            registry.insert(object.tile, object);
        }

        Ok(World {
            side: grid.side(),
            floor: self.floor,
            walls: self.walls,
            dynamic_meshes: self.dynamic_meshes,
            dynamic_objects: registry,
            physics_world: self.physics_world,
        })
    }

    // Plane coordinates (x, y) are the tile's near corner; the world z of that corner is -y.

    fn build_floor(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.floor.push_quad([[x, 0.0, -y], [x + s, 0.0, -y - s], [x, 0.0, -y - s], [x + s, 0.0, -y]]);
    }

    fn build_ceiling(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.walls.push_quad([[x, s, -y - s], [x + s, s, -y], [x, s, -y], [x + s, s, -y - s]]);
    }

    fn build_left_wall(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.walls.push_quad([[x, 0.0, -y], [x, s, -y - s], [x, s, -y], [x, 0.0, -y - s]]);
    }

    fn build_right_wall(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.walls.push_quad([[x + s, 0.0, -y - s], [x + s, s, -y], [x + s, s, -y - s], [x + s, 0.0, -y]]);
    }

    fn build_front_wall(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.walls.push_quad([[x + s, 0.0, -y], [x, s, -y], [x + s, s, -y], [x, 0.0, -y]]);
    }

    fn build_back_wall(&mut self, x: f32, y: f32) {
        let s = TILE_WORLD_SIZE;
        self.walls.push_quad([[x, 0.0, -y - s], [x + s, s, -y - s], [x, s, -y - s], [x + s, 0.0, -y - s]]);
    }

    /// A panel across the tile at plane depth `depth` into it, spanning x.
    fn panel_along_x(mesh: &mut GeometryBatch, x: f32, y: f32, depth: f32) {
        let (s, z) = (TILE_WORLD_SIZE, -y - depth);
        mesh.push_quad([[x, 0.0, z], [x + s, s, z], [x, s, z], [x + s, 0.0, z]]);
    }

    /// A panel across the tile at `offset` along x, spanning the tile's depth.
    fn panel_along_y(mesh: &mut GeometryBatch, x: f32, y: f32, offset: f32) {
        let (s, px) = (TILE_WORLD_SIZE, x + offset);
        mesh.push_quad([[px, 0.0, -y - s], [px, s, -y], [px, s, -y - s], [px, 0.0, -y]]);
    }

    /// Doors hang between the pair of void tiles either side of them, left/right checked first.
    fn build_door(&mut self, tile: Cartesian2DCoordinate, across_x: bool, across_y: bool) -> Result<()> {
        let (x, y) = (tile.x as f32 * TILE_WORLD_SIZE, tile.y as f32 * TILE_WORLD_SIZE);
        let mut mesh = GeometryBatch::default();

        let bounding_box = if across_x {
            WorldBuilder::panel_along_x(&mut mesh, x, y, DOOR_NEAR);
            WorldBuilder::panel_along_x(&mut mesh, x, y, DOOR_FAR);
            BoundingBox::new(x, x + TILE_WORLD_SIZE, y + DOOR_NEAR, y + DOOR_FAR)
        } else if across_y {
            WorldBuilder::panel_along_y(&mut mesh, x, y, DOOR_NEAR);
            WorldBuilder::panel_along_y(&mut mesh, x, y, DOOR_FAR);
            BoundingBox::new(x + DOOR_NEAR, x + DOOR_FAR, y, y + TILE_WORLD_SIZE)
        } else {
            bail!(ErrorKind::MalformedDoor(tile.x, tile.y));
        };

        self.add_dynamic_object(DynamicObjectKind::Door, tile, bounding_box, mesh);
        Ok(())
    }

    fn build_exit_portal(&mut self, tile: Cartesian2DCoordinate) {
        let (x, y) = (tile.x as f32 * TILE_WORLD_SIZE, tile.y as f32 * TILE_WORLD_SIZE);
        let mut mesh = GeometryBatch::default();

        WorldBuilder::panel_along_x(&mut mesh, x, y, PORTAL_NEAR);
        WorldBuilder::panel_along_x(&mut mesh, x, y, PORTAL_FAR);
        // Side faces closing the slab.
        let s = TILE_WORLD_SIZE;
        for side_x in &[x, x + s] {
            mesh.push_quad([[*side_x, 0.0, -y - PORTAL_FAR],
                            [*side_x, s, -y - PORTAL_NEAR],
                            [*side_x, s, -y - PORTAL_FAR],
                            [*side_x, 0.0, -y - PORTAL_NEAR]]);
        }

        let bounding_box = BoundingBox::new(x, x + s, y + PORTAL_NEAR, y + PORTAL_FAR);
        self.add_dynamic_object(DynamicObjectKind::ExitPortal, tile, bounding_box, mesh);
    }

    fn add_dynamic_object(&mut self,
                          kind: DynamicObjectKind,
                          tile: Cartesian2DCoordinate,
                          bounding_box: BoundingBox,
                          mesh: GeometryBatch) {
        let bounding_box = self.physics_world.add(bounding_box);
        let render_handle = RenderHandle(self.dynamic_meshes.len());
        self.dynamic_meshes.push(mesh);
        self.dynamic_objects.push(DynamicObject {
            kind,
            tile,
            bounding_box,
            render_handle,
        });
    }
}
