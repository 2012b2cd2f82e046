use crate::camera::Camera;
use image::{Rgb, RgbImage};
use raylab_core::{Primitive, Ray, Scene, Vec3, WorkScheduler};
use raylab_model::SceneFile;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Instant;

const TILE_SIZE: usize = 16;

pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    pub spp: u32,
    pub bounces: u32,
    pub seed: u64,
    pub threads: usize,
    pub progress_every: u32,
}

#[derive(Debug, Clone, Copy)]
struct Material {
    albedo: Vec3,
    emission: Vec3,
}

const DEFAULT_MATERIAL: Material = Material {
    albedo: Vec3::new(0.7, 0.7, 0.7),
    emission: Vec3::zero(),
};

pub fn render_scene(scene_file: &SceneFile, settings: &RenderSettings) -> RgbImage {
    let context = RenderContext::new(scene_file, settings);

    let width = settings.width as usize;
    let height = settings.height as usize;
    let tiles_x = width.div_ceil(TILE_SIZE);
    let tiles_y = height.div_ceil(TILE_SIZE);
    let tile_total = (tiles_x * tiles_y) as u32;

    // One buffer per tile behind its own lock; a worker locks only the tile
    // it just finished.
    let film: Vec<Mutex<Vec<Vec3>>> = (0..tiles_x * tiles_y)
        .map(|_| Mutex::new(Vec::new()))
        .collect();

    let spp = settings.spp.max(1);
    let bounces = settings.bounces.max(1);
    let progress_every = settings.progress_every;
    let start = Instant::now();
    let counter = AtomicU32::new(0);

    let scheduler = WorkScheduler::new(settings.threads);
    scheduler.parallel_for_2d((tiles_x, tiles_y), |tile_x, tile_y| {
        let x0 = tile_x * TILE_SIZE;
        let y0 = tile_y * TILE_SIZE;
        let tile_w = TILE_SIZE.min(width - x0);
        let tile_h = TILE_SIZE.min(height - y0);

        let mut tile = vec![Vec3::zero(); tile_w * tile_h];
        for row in 0..tile_h {
            for col in 0..tile_w {
                let x = x0 + col;
                let y = y0 + row;
                let mut color = Vec3::zero();
                for sample in 0..spp {
                    let mut rng =
                        Rng::new(hash_seed(settings.seed, x as u32, y as u32, sample));
                    let u = (x as f32 + rng.next_f32()) / settings.width as f32;
                    let v = (y as f32 + rng.next_f32()) / settings.height as f32;
                    let ray = context.camera.ray(u, 1.0 - v);
                    color = color + trace(&context, ray, bounces, &mut rng);
                }
                tile[row * tile_w + col] = color;
            }
        }

        *film[tile_y * tiles_x + tile_x].lock().unwrap() = tile;

        if progress_every > 0 {
            let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
            if done == tile_total || done % progress_every == 0 {
                let elapsed = start.elapsed().as_secs_f64();
                let percent = (done as f64 / tile_total as f64) * 100.0;
                let total = elapsed * tile_total as f64 / done as f64;
                let remaining = (total - elapsed).max(0.0);
                eprintln!(
                    "render: tile {}/{} ({:.1}%) elapsed {:.1}s eta {:.1}s",
                    done, tile_total, percent, elapsed, remaining
                );
            }
        }
    });

    if progress_every > 0 {
        eprintln!("render: {} rays traced", context.scene.rays_traced());
    }

    let mut image = RgbImage::new(settings.width, settings.height);
    let scale = 1.0 / spp as f32;
    for tile_y in 0..tiles_y {
        for tile_x in 0..tiles_x {
            let x0 = tile_x * TILE_SIZE;
            let y0 = tile_y * TILE_SIZE;
            let tile_w = TILE_SIZE.min(width - x0);
            let tile = film[tile_y * tiles_x + tile_x].lock().unwrap();
            for (index, color) in tile.iter().enumerate() {
                let x = x0 + index % tile_w;
                let y = y0 + index / tile_w;
                image.put_pixel(x as u32, y as u32, to_rgb(*color * scale));
            }
        }
    }

    image
}

struct RenderContext {
    scene: Scene,
    camera: Camera,
    materials: Vec<Material>,
    sun_direction: Vec3,
    sun_color: Vec3,
}

impl RenderContext {
    fn new(scene_file: &SceneFile, settings: &RenderSettings) -> Self {
        let scene = Scene::new(build_primitives(scene_file));
        let cam = &scene_file.camera;
        let camera = Camera::new(
            vec3(cam.look_from),
            vec3(cam.look_at),
            vec3(cam.vup),
            cam.vfov_deg,
            settings.width as f32 / settings.height as f32,
        );
        let materials = scene_file
            .materials
            .iter()
            .map(|m| Material {
                albedo: vec3(m.albedo),
                emission: vec3(m.emission),
            })
            .collect();
        Self {
            scene,
            camera,
            materials,
            sun_direction: Vec3::new(0.45, 0.8, 0.35).normalized(),
            sun_color: Vec3::new(1.0, 0.96, 0.9),
        }
    }

    fn material(&self, index: usize) -> Material {
        self.materials.get(index).copied().unwrap_or(DEFAULT_MATERIAL)
    }
}

pub fn build_primitives(scene_file: &SceneFile) -> Vec<Primitive> {
    let mut prims = Vec::new();
    for sphere in &scene_file.spheres {
        prims.push(Primitive::Sphere {
            center: vec3(sphere.center),
            radius: sphere.radius,
            material: sphere.material,
        });
    }
    for triangle in &scene_file.triangles {
        prims.push(Primitive::Triangle {
            v0: vec3(triangle.vertices[0]),
            v1: vec3(triangle.vertices[1]),
            v2: vec3(triangle.vertices[2]),
            material: triangle.material,
        });
    }
    prims
}

fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

fn trace(context: &RenderContext, ray: Ray, bounces: u32, rng: &mut Rng) -> Vec3 {
    let mut current = ray;
    let mut throughput = Vec3::new(1.0, 1.0, 1.0);
    let mut color = Vec3::zero();

    for _ in 0..bounces {
        let mut query = current;
        if let Some(hit) = context.scene.intersect(&mut query) {
            let material = context.material(hit.material);
            color = color + throughput.mul_elem(material.emission);

            let mut normal = hit.normal;
            if normal.dot(current.direction()) > 0.0 {
                normal = normal * -1.0;
            }

            let cos_sun = normal.dot(context.sun_direction);
            if cos_sun > 0.0 {
                let shadow = Ray::new(hit.point + normal * 1e-3, context.sun_direction);
                if !context.scene.intersect_p(&shadow) {
                    color = color
                        + throughput
                            .mul_elem(material.albedo)
                            .mul_elem(context.sun_color)
                            * cos_sun;
                }
            }

            throughput = throughput.mul_elem(material.albedo);
            let direction = random_in_hemisphere(normal, rng);
            current = Ray::new(hit.point + normal * 1e-3, direction);
        } else {
            color = color + throughput.mul_elem(background(&current));
            return color;
        }
    }

    color
}

fn random_in_hemisphere(normal: Vec3, rng: &mut Rng) -> Vec3 {
    let mut dir = random_unit_vector(rng);
    if dir.dot(normal) < 0.0 {
        dir = dir * -1.0;
    }
    (normal + dir).normalized()
}

fn random_unit_vector(rng: &mut Rng) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
            rng.next_f32() * 2.0 - 1.0,
        );
        if p.dot(p) < 1.0 {
            return p.normalized();
        }
    }
}

fn background(ray: &Ray) -> Vec3 {
    let t = 0.5 * (ray.direction().y + 1.0);
    let sky = Vec3::new(0.6, 0.8, 1.0);
    let ground = Vec3::new(0.05, 0.05, 0.07);
    ground * (1.0 - t) + sky * t
}

fn to_rgb(color: Vec3) -> Rgb<u8> {
    let c = color.clamp01();
    let gamma = Vec3::new(c.x.sqrt(), c.y.sqrt(), c.z.sqrt());
    Rgb([
        (gamma.x * 255.0) as u8,
        (gamma.y * 255.0) as u8,
        (gamma.z * 255.0) as u8,
    ])
}

fn hash_seed(seed: u64, x: u32, y: u32, sample: u32) -> u64 {
    let mut v = seed ^ ((x as u64) << 32) ^ ((y as u64) << 16) ^ sample as u64;
    v = v.wrapping_add(0x9e3779b97f4a7c15);
    v = (v ^ (v >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    v = (v ^ (v >> 27)).wrapping_mul(0x94d049bb133111eb);
    v ^ (v >> 31)
}

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0xdeadbeefcafebabe } else { seed };
        Self { state }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn next_f32(&mut self) -> f32 {
        let value = self.next_u32();
        value as f32 / u32::MAX as f32
    }
}
