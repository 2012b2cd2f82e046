//! BVH construction, ray traversal, and parallel work scheduling.

pub mod bounds;
pub mod bvh;
pub mod math;
pub mod parallel;
pub mod primitive;
pub mod ray;
pub mod scene;

pub use bounds::Bounds3;
pub use bvh::Bvh;
pub use math::Vec3;
pub use parallel::WorkScheduler;
pub use primitive::{Intersection, Primitive};
pub use ray::Ray;
pub use scene::Scene;
