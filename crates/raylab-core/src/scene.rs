use crate::bounds::Bounds3;
use crate::bvh::Bvh;
use crate::primitive::{Intersection, Primitive};
use crate::ray::Ray;
use std::sync::atomic::{AtomicU64, Ordering};

/// The surface the render driver and integrators see: a primitive store plus
/// its BVH, answering nearest-hit and occlusion queries. Immutable after
/// construction, so any number of threads may query it concurrently.
pub struct Scene {
    prims: Vec<Primitive>,
    bvh: Bvh,
    rays_traced: AtomicU64,
}

impl Scene {
    pub fn new(prims: Vec<Primitive>) -> Self {
        let bvh = Bvh::build(&prims);
        Self {
            prims,
            bvh,
            rays_traced: AtomicU64::new(0),
        }
    }

    pub fn intersect(&self, ray: &mut Ray) -> Option<Intersection> {
        self.rays_traced.fetch_add(1, Ordering::Relaxed);
        self.bvh.intersect(&self.prims, ray)
    }

    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.rays_traced.fetch_add(1, Ordering::Relaxed);
        self.bvh.intersect_p(&self.prims, ray)
    }

    pub fn world_bound(&self) -> Bounds3 {
        self.bvh.world_bound()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.prims
    }

    /// Total queries answered so far, for diagnostics.
    pub fn rays_traced(&self) -> u64 {
        self.rays_traced.load(Ordering::Relaxed)
    }
}
