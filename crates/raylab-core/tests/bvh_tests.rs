use raylab_core::{Primitive, Ray, Scene, Vec3};

#[test]
fn bvh_nearest_hit_matches_bruteforce() {
    let mut rng = TestRng::new(7);
    let prims = random_scene(&mut rng, 128);
    let scene = Scene::new(prims.clone());

    for _ in 0..256 {
        let ray = random_ray(&mut rng);

        let brute = brute_hit(&prims, ray);
        let mut query = ray;
        let hit = scene.intersect(&mut query);

        assert_eq!(brute.is_some(), hit.is_some());
        if let (Some(a), Some(b)) = (brute, hit) {
            assert!((a.t - b.t).abs() < 1e-3, "t {} vs {}", a.t, b.t);
        }
    }
}

#[test]
fn any_hit_agrees_with_nearest_hit_existence() {
    let mut rng = TestRng::new(21);
    let prims = random_scene(&mut rng, 96);
    let scene = Scene::new(prims);

    for _ in 0..256 {
        let ray = random_ray(&mut rng);
        let mut query = ray;
        let nearest = scene.intersect(&mut query).is_some();
        assert_eq!(scene.intersect_p(&ray), nearest);
    }
}

#[test]
fn axis_parallel_rays_traverse_correctly() {
    let mut rng = TestRng::new(3);
    let prims = random_scene(&mut rng, 64);
    let scene = Scene::new(prims.clone());

    let axes = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    for direction in axes {
        for _ in 0..64 {
            let origin = Vec3::new(
                rng.range(-8.0, 8.0),
                rng.range(-8.0, 8.0),
                rng.range(-8.0, 8.0),
            );
            let ray = Ray::new(origin, direction);
            let brute = brute_hit(&prims, ray);
            let mut query = ray;
            let hit = scene.intersect(&mut query);
            assert_eq!(brute.is_some(), hit.is_some());
            if let (Some(a), Some(b)) = (brute, hit) {
                assert!((a.t - b.t).abs() < 1e-3);
            }
        }
    }
}

#[test]
fn stacked_triangles_return_the_nearest() {
    let scene = Scene::new(vec![
        unit_triangle_at(1.0),
        unit_triangle_at(2.0),
        unit_triangle_at(3.0),
    ]);

    let mut ray = Ray::new(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0));
    let hit = scene.intersect(&mut ray).expect("ray must hit the stack");
    assert!((hit.t - 1.0).abs() < 1e-6);
    assert_eq!(hit.primitive, 0);

    let reachable = Ray::with_range(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 1e-3, 1.5);
    assert!(scene.intersect_p(&reachable));

    let too_short = Ray::with_range(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 1e-3, 0.5);
    assert!(!scene.intersect_p(&too_short));
}

fn unit_triangle_at(z: f32) -> Primitive {
    Primitive::Triangle {
        v0: Vec3::new(-1.0, -1.0, z),
        v1: Vec3::new(1.0, -1.0, z),
        v2: Vec3::new(0.0, 1.0, z),
        material: 0,
    }
}

fn random_scene(rng: &mut TestRng, count: usize) -> Vec<Primitive> {
    let mut prims = Vec::new();
    for i in 0..count {
        let center = Vec3::new(
            rng.range(-5.0, 5.0),
            rng.range(-5.0, 5.0),
            rng.range(-5.0, 5.0),
        );
        if i % 2 == 0 {
            prims.push(Primitive::Sphere {
                center,
                radius: rng.range(0.2, 1.0),
                material: 0,
            });
        } else {
            let jitter = |rng: &mut TestRng| {
                Vec3::new(
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                    rng.range(-1.0, 1.0),
                )
            };
            prims.push(Primitive::Triangle {
                v0: center,
                v1: center + jitter(rng),
                v2: center + jitter(rng),
                material: 0,
            });
        }
    }
    prims
}

fn random_ray(rng: &mut TestRng) -> Ray {
    let origin = Vec3::new(
        rng.range(-8.0, 8.0),
        rng.range(-8.0, 8.0),
        rng.range(-8.0, 8.0),
    );
    let direction = Vec3::new(
        rng.range(-1.0, 1.0),
        rng.range(-1.0, 1.0),
        rng.range(-1.0, 1.0),
    )
    .normalized();
    Ray::new(origin, direction)
}

fn brute_hit(prims: &[Primitive], ray: Ray) -> Option<raylab_core::Intersection> {
    let mut ray = ray;
    let mut closest = None;
    for (index, prim) in prims.iter().enumerate() {
        if let Some(mut hit) = prim.intersect(&ray) {
            ray.t_max = hit.t;
            hit.primitive = index;
            closest = Some(hit);
        }
    }
    closest
}

struct TestRng {
    state: u64,
}

impl TestRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn next_f32(&mut self) -> f32 {
        self.next_u32() as f32 / u32::MAX as f32
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }
}
