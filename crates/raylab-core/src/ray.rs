use crate::math::Vec3;

/// Bias applied at spawn points so secondary rays do not immediately
/// re-intersect the surface they started on.
pub const RAY_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
    pub t_min: f32,
    /// Upper bound on the hit distance. Nearest-hit traversal shrinks this
    /// as closer hits are found, which is what prunes farther subtrees.
    pub t_max: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_range(origin, direction, RAY_EPSILON, f32::INFINITY)
    }

    pub fn with_range(origin: Vec3, direction: Vec3, t_min: f32, t_max: f32) -> Self {
        Self {
            origin,
            direction,
            inv_direction: invert(direction),
            t_min,
            t_max,
        }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn inv_direction(&self) -> Vec3 {
        self.inv_direction
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
        self.inv_direction = invert(direction);
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

fn invert(direction: Vec3) -> Vec3 {
    // Zero components map to infinity; the slab test handles those axes
    // without ever dividing.
    Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z)
}
