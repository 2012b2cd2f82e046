use crate::math::Vec3;
use crate::ray::Ray;

/// Axis-aligned bounding box. The empty box (min = +inf, max = -inf) is the
/// identity for `union`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds3 {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn union_point(self, p: Vec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.diagonal();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Position of `p` inside the box, normalized to [0, 1] per axis.
    /// Axes with zero extent map to 0.
    pub fn offset(&self, p: Vec3) -> Vec3 {
        let d = self.diagonal();
        let axis = |v: f32, min: f32, extent: f32| {
            if extent > 0.0 {
                (v - min) / extent
            } else {
                0.0
            }
        };
        Vec3::new(
            axis(p.x, self.min.x, d.x),
            axis(p.y, self.min.y, d.y),
            axis(p.z, self.min.z, d.z),
        )
    }

    pub fn max_extent_axis(&self) -> usize {
        let d = self.diagonal();
        if d.x >= d.y && d.x >= d.z {
            0
        } else if d.y >= d.z {
            1
        } else {
            2
        }
    }

    /// Slab test against `[ray.t_min, t_max]`. `t_max` is passed separately
    /// because nearest-hit traversal shrinks it below `ray.t_max`'s initial
    /// value as hits are found.
    pub fn hit(&self, ray: &Ray, t_max: f32) -> bool {
        let mut near = ray.t_min;
        let mut far = t_max;
        for axis in 0..3 {
            let min = self.min.axis(axis);
            let max = self.max.axis(axis);
            let origin = ray.origin.axis(axis);
            let dir = ray.direction().axis(axis);
            if dir == 0.0 {
                // Parallel ray: pass/fail on the origin alone, no division.
                if origin < min || origin > max {
                    return false;
                }
                continue;
            }
            let inv = ray.inv_direction().axis(axis);
            let mut t0 = (min - origin) * inv;
            let mut t1 = (max - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            near = t0.max(near);
            far = t1.min(far);
            if near > far {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_union_identity() {
        let b = Bounds3::from_point(Vec3::new(1.0, 2.0, 3.0))
            .union_point(Vec3::new(-1.0, 0.0, 5.0));
        assert_eq!(Bounds3::EMPTY.union(b), b);
        assert!(Bounds3::EMPTY.is_empty());
        assert_eq!(Bounds3::EMPTY.surface_area(), 0.0);
    }

    #[test]
    fn offset_normalizes_and_guards_zero_extent() {
        let b = Bounds3::from_point(Vec3::zero()).union_point(Vec3::new(2.0, 4.0, 0.0));
        let o = b.offset(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(o, Vec3::new(0.5, 0.25, 0.0));
    }

    #[test]
    fn slab_test_handles_zero_direction_components() {
        let b = Bounds3::from_point(Vec3::new(-1.0, -1.0, 1.0))
            .union_point(Vec3::new(1.0, 1.0, 2.0));

        let inside = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&inside, f32::INFINITY));

        let outside = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!b.hit(&outside, f32::INFINITY));
    }

    #[test]
    fn slab_test_respects_t_max() {
        let b = Bounds3::from_point(Vec3::new(-1.0, -1.0, 5.0))
            .union_point(Vec3::new(1.0, 1.0, 6.0));
        let ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
        assert!(b.hit(&ray, 10.0));
        assert!(!b.hit(&ray, 4.0));
    }
}
