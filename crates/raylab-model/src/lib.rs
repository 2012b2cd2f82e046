//! Shared scene-file data structures for raylab.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SceneFile {
    pub version: u32,
    pub camera: CameraConfig,
    pub materials: Vec<MaterialDef>,
    pub spheres: Vec<SphereDef>,
    pub triangles: Vec<TriangleDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraConfig {
    pub look_from: [f32; 3],
    pub look_at: [f32; 3],
    pub vup: [f32; 3],
    pub vfov_deg: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialDef {
    pub albedo: [f32; 3],
    pub emission: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SphereDef {
    pub center: [f32; 3],
    pub radius: f32,
    pub material: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriangleDef {
    pub vertices: [[f32; 3]; 3],
    pub material: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_file_round_trip_is_stable() {
        let scene = SceneFile {
            version: 1,
            camera: CameraConfig {
                look_from: [6.0, 4.0, 6.0],
                look_at: [0.0, 0.5, 0.0],
                vup: [0.0, 1.0, 0.0],
                vfov_deg: 40.0,
            },
            materials: vec![
                MaterialDef {
                    albedo: [0.7, 0.7, 0.7],
                    emission: [0.0, 0.0, 0.0],
                },
                MaterialDef {
                    albedo: [0.1, 0.1, 0.1],
                    emission: [4.0, 3.5, 3.0],
                },
            ],
            spheres: vec![SphereDef {
                center: [0.0, 0.5, 0.0],
                radius: 0.5,
                material: 0,
            }],
            triangles: vec![TriangleDef {
                vertices: [[-1.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 0.0, 1.0]],
                material: 1,
            }],
        };

        let json = serde_json::to_string_pretty(&scene).unwrap();
        let decoded: SceneFile = serde_json::from_str(&json).unwrap();
        let json2 = serde_json::to_string_pretty(&decoded).unwrap();

        assert_eq!(scene, decoded);
        assert_eq!(json, json2);
    }
}
