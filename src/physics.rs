/// Axis aligned box on the collision plane. The plane's y axis is the world's -z.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> BoundingBox {
        BoundingBox {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Square box of half width `half_extent` around a point.
    pub fn around(x: f32, y: f32, half_extent: f32) -> BoundingBox {
        BoundingBox::new(x - half_extent, x + half_extent, y - half_extent, y + half_extent)
    }

    /// Touching edges count as overlapping.
    #[inline]
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x && self.min_y <= other.max_y &&
        other.min_y <= self.max_y
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BoundingBoxId(usize);

#[derive(Clone, Debug)]
struct Body {
    bounding_box: BoundingBox,
    enabled: bool,
}

/// Every collision footprint of a world. Boxes are never removed, only disabled, so ids stay valid.
#[derive(Clone, Debug, Default)]
pub struct PhysicsWorld {
    bodies: Vec<Body>,
}

impl PhysicsWorld {
    pub fn new() -> PhysicsWorld {
        PhysicsWorld::default()
    }

    pub fn add(&mut self, bounding_box: BoundingBox) -> BoundingBoxId {
        self.bodies.push(Body {
            bounding_box,
            enabled: true,
        });
        BoundingBoxId(self.bodies.len() - 1)
    }

    /// Permanently stops a box taking part in collisions. Returns false for an unknown id.
    pub fn disable(&mut self, id: BoundingBoxId) -> bool {
        match self.bodies.get_mut(id.0) {
            Some(body) => {
                body.enabled = false;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, id: BoundingBoxId) -> bool {
        self.bodies.get(id.0).map_or(false, |body| body.enabled)
    }

    pub fn bounding_box(&self, id: BoundingBoxId) -> Option<&BoundingBox> {
        self.bodies.get(id.0).map(|body| &body.bounding_box)
    }

    /// Does `candidate` overlap any enabled box.
    pub fn collides(&self, candidate: &BoundingBox) -> bool {
        self.bodies
            .iter()
            .any(|body| body.enabled && body.bounding_box.overlaps(candidate))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.bodies.iter().filter(|body| body.enabled).count()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn overlap_is_inclusive() {
        let a = BoundingBox::new(0.0, 5.0, 0.0, 5.0);
        assert!(a.overlaps(&BoundingBox::new(5.0, 6.0, 1.0, 2.0)));
        assert!(a.overlaps(&BoundingBox::around(2.5, 2.5, 0.5)));
        assert!(!a.overlaps(&BoundingBox::new(5.1, 6.0, 1.0, 2.0)));
        assert!(!a.overlaps(&BoundingBox::new(1.0, 2.0, -2.0, -0.1)));
        assert!(a.contains_point(5.0, 0.0));
        assert!(!a.contains_point(5.01, 0.0));
    }

    #[test]
    fn disabled_boxes_never_collide() {
        let mut world = PhysicsWorld::new();
        assert!(world.is_empty());
        let wall = world.add(BoundingBox::new(0.0, 5.0, 0.0, 5.0));
        let door = world.add(BoundingBox::new(10.0, 15.0, 2.4, 2.6));
        assert_eq!(world.len(), 2);

        let at_door = BoundingBox::around(12.0, 2.5, 0.5);
        assert!(world.collides(&at_door));
        assert!(world.disable(door));
        assert!(!world.is_enabled(door));
        assert!(world.is_enabled(wall));
        assert!(!world.collides(&at_door));
        assert!(world.collides(&BoundingBox::around(4.0, 4.0, 0.5)));
        assert_eq!(world.enabled_count(), 1);
        assert_eq!(world.len(), 2);

        // Disabling twice changes nothing.
        assert!(world.disable(door));
        assert!(!world.is_enabled(door));
    }

    #[test]
    fn unknown_ids() {
        let mut world = PhysicsWorld::new();
        let id = BoundingBoxId(3);
        assert!(!world.disable(id));
        assert!(!world.is_enabled(id));
        assert_eq!(world.bounding_box(id), None);
    }
}
