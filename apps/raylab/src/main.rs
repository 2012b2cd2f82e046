use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use raylab_model::{CameraConfig, MaterialDef, SceneFile, SphereDef, TriangleDef};
use raylab_render::{render_scene, write_png, RenderSettings};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser)]
#[command(name = "raylab", version, about = "raylab CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Generate(GenerateArgs),
    Render(RenderArgs),
}

#[derive(Args)]
#[command(about = "Write a procedural demo scene as JSON")]
struct GenerateArgs {
    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 24)]
    spheres: usize,
}

#[derive(Args)]
#[command(about = "Render a scene JSON to a PNG")]
struct RenderArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    out: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    #[arg(long, default_value_t = 64)]
    spp: u32,

    #[arg(long, default_value_t = 6)]
    bounces: u32,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 0)]
    threads: usize,

    #[arg(long, default_value_t = 64)]
    progress_every: u32,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Render(args) => run_render(args),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let scene = generate_scene(args.seed, args.spheres);
    write_json(&args.out, &scene)?;
    eprintln!(
        "generate: wrote {} spheres and {} triangles to {:?}",
        scene.spheres.len(),
        scene.triangles.len(),
        args.out
    );
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let contents = fs::read_to_string(&args.in_path)
        .map_err(|err| anyhow!("failed to read input {:?}: {}", args.in_path, err))?;
    let scene: SceneFile = serde_json::from_str(&contents)
        .map_err(|err| anyhow!("failed to parse scene {:?}: {}", args.in_path, err))?;

    if scene.spheres.is_empty() && scene.triangles.is_empty() {
        return Err(anyhow!("scene {:?} contains no primitives", args.in_path));
    }

    let out = args.out.unwrap_or_else(default_out_path);
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| anyhow!("failed to create output directory {:?}: {}", parent, err))?;
        }
    }

    let settings = RenderSettings {
        width: args.width,
        height: args.height,
        spp: args.spp,
        bounces: args.bounces,
        seed: args.seed,
        threads: args.threads,
        progress_every: args.progress_every,
    };

    let image = render_scene(&scene, &settings);
    write_png(&out, &image).map_err(|err| anyhow!("failed to write png: {err}"))?;
    eprintln!("render: wrote {:?}", out);
    Ok(())
}

fn generate_scene(seed: u64, sphere_count: usize) -> SceneFile {
    let mut materials = vec![
        MaterialDef {
            albedo: [0.55, 0.55, 0.55],
            emission: [0.0, 0.0, 0.0],
        },
        MaterialDef {
            albedo: [0.1, 0.1, 0.1],
            emission: [6.0, 5.4, 4.6],
        },
    ];

    let extent = 8.0;
    let triangles = vec![
        TriangleDef {
            vertices: [
                [-extent, 0.0, -extent],
                [extent, 0.0, -extent],
                [extent, 0.0, extent],
            ],
            material: 0,
        },
        TriangleDef {
            vertices: [
                [-extent, 0.0, -extent],
                [extent, 0.0, extent],
                [-extent, 0.0, extent],
            ],
            material: 0,
        },
    ];

    let mut spheres = vec![SphereDef {
        center: [0.0, 4.5, 0.0],
        radius: 1.0,
        material: 1,
    }];

    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);

    for i in 0..sphere_count {
        let angle = i as f32 / sphere_count.max(1) as f32 * std::f32::consts::TAU;
        let distance = 1.5 + next_f32(&mut state) * 4.5;
        let radius = 0.25 + next_f32(&mut state) * 0.45;
        materials.push(MaterialDef {
            albedo: [
                0.2 + 0.8 * next_f32(&mut state),
                0.2 + 0.8 * next_f32(&mut state),
                0.2 + 0.8 * next_f32(&mut state),
            ],
            emission: [0.0, 0.0, 0.0],
        });
        spheres.push(SphereDef {
            center: [angle.cos() * distance, radius, angle.sin() * distance],
            radius,
            material: materials.len() - 1,
        });
    }

    SceneFile {
        version: 1,
        camera: CameraConfig {
            look_from: [9.0, 5.5, 9.0],
            look_at: [0.0, 0.8, 0.0],
            vup: [0.0, 1.0, 0.0],
            vfov_deg: 38.0,
        },
        materials,
        spheres,
        triangles,
    }
}

fn next_f32(state: &mut u64) -> f32 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*state >> 32) as u32 as f32 / u32::MAX as f32
}

fn default_out_path() -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    PathBuf::from("renders").join(format!("{stamp}.png"))
}

fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    atomic_write(path, &json)
}

fn atomic_write(path: &PathBuf, data: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .map_err(|err| anyhow!("failed to create output directory {:?}: {}", parent, err))?;
    }

    let tmp_path = temp_path(path);
    let mut file = fs::File::create(&tmp_path)
        .map_err(|err| anyhow!("failed to create temp file {:?}: {}", tmp_path, err))?;
    file.write_all(data)
        .map_err(|err| anyhow!("failed to write temp file {:?}: {}", tmp_path, err))?;
    file.sync_all()
        .map_err(|err| anyhow!("failed to sync temp file {:?}: {}", tmp_path, err))?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(anyhow!("failed to replace output {:?}: {}", path, err));
    }

    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }

    Ok(())
}

fn temp_path(path: &PathBuf) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let pid = std::process::id();
    let tmp_name = format!(".{}.part-{}-{}", file_name, pid, stamp);
    parent.join(tmp_name)
}
