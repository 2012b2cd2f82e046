use crate::bounds::Bounds3;
use crate::math::Vec3;
use crate::ray::Ray;

/// Determinants smaller than this reject the triangle as edge-on or
/// zero-area rather than dividing by a near-zero value.
const DEGENERATE_DET: f32 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct Intersection {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: (f32, f32),
    pub primitive: usize,
    pub material: usize,
}

#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Triangle {
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        material: usize,
    },
    Sphere {
        center: Vec3,
        radius: f32,
        material: usize,
    },
}

impl Primitive {
    pub fn bounds(&self) -> Bounds3 {
        match *self {
            Primitive::Triangle { v0, v1, v2, .. } => Bounds3::from_point(v0)
                .union_point(v1)
                .union_point(v2),
            Primitive::Sphere { center, radius, .. } => {
                let r = Vec3::splat(radius);
                Bounds3 {
                    min: center - r,
                    max: center + r,
                }
            }
        }
    }

    pub fn centroid(&self) -> Vec3 {
        match *self {
            Primitive::Triangle { v0, v1, v2, .. } => (v0 + v1 + v2) / 3.0,
            Primitive::Sphere { center, .. } => center,
        }
    }

    pub fn material(&self) -> usize {
        match *self {
            Primitive::Triangle { material, .. } => material,
            Primitive::Sphere { material, .. } => material,
        }
    }

    /// Nearest intersection within `[ray.t_min, ray.t_max]`. The caller is
    /// responsible for filling in `Intersection::primitive`.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match *self {
            Primitive::Triangle {
                v0, v1, v2, material,
            } => intersect_triangle(ray, v0, v1, v2, material),
            Primitive::Sphere {
                center,
                radius,
                material,
            } => intersect_sphere(ray, center, radius, material),
        }
    }

    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}

fn intersect_triangle(
    ray: &Ray,
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    material: usize,
) -> Option<Intersection> {
    let e1 = v1 - v0;
    let e2 = v2 - v0;
    let p = ray.direction().cross(e2);
    let det = e1.dot(p);
    if det.abs() < DEGENERATE_DET {
        return None;
    }

    let inv_det = 1.0 / det;
    let tv = ray.origin - v0;
    let u = tv.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = tv.cross(e1);
    let v = ray.direction().dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = e2.dot(q) * inv_det;
    if t < ray.t_min || t > ray.t_max {
        return None;
    }

    Some(Intersection {
        t,
        point: ray.at(t),
        normal: e1.cross(e2).normalized(),
        uv: (u, v),
        primitive: usize::MAX,
        material,
    })
}

fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32, material: usize) -> Option<Intersection> {
    let oc = ray.origin - center;
    let a = ray.direction().dot(ray.direction());
    let half_b = oc.dot(ray.direction());
    let c = oc.dot(oc) - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_d = discriminant.sqrt();

    let mut root = (-half_b - sqrt_d) / a;
    if root < ray.t_min || root > ray.t_max {
        root = (-half_b + sqrt_d) / a;
        if root < ray.t_min || root > ray.t_max {
            return None;
        }
    }

    let point = ray.at(root);
    let normal = (point - center) / radius;
    Some(Intersection {
        t: root,
        point,
        normal,
        uv: sphere_uv(normal),
        primitive: usize::MAX,
        material,
    })
}

fn sphere_uv(normal: Vec3) -> (f32, f32) {
    let u = 0.5 + normal.z.atan2(normal.x) / (2.0 * std::f32::consts::PI);
    let v = 0.5 - normal.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
    (u, v)
}
