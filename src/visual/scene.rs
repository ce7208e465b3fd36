//! Visual scene description: the closed schema handed to client-side renderers.

use crate::types::VisualMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCENE_VERSION: u32 = 1;
pub const DEFAULT_TITLE: &str = "Generated Visual";
pub const DEFAULT_OBJECT_COLOR: &str = "#6366f1";
pub const DEFAULT_MATERIAL: &str = "standard";
pub const PLACEHOLDER_LABEL: &str = "Visual placeholder";

pub type Vec3 = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geometry {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
    Plane,
    Circle,
    Ring,
}

impl Geometry {
    /// Exact-match lookup against the whitelist.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "box" => Some(Geometry::Box),
            "sphere" => Some(Geometry::Sphere),
            "cylinder" => Some(Geometry::Cylinder),
            "cone" => Some(Geometry::Cone),
            "torus" => Some(Geometry::Torus),
            "plane" => Some(Geometry::Plane),
            "circle" => Some(Geometry::Circle),
            "ring" => Some(Geometry::Ring),
            _ => None,
        }
    }

    pub fn placeholder_for(mode: VisualMode) -> Self {
        match mode {
            VisualMode::ThreeD => Geometry::Sphere,
            VisualMode::TwoD => Geometry::Circle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraKind {
    Perspective,
    Orthographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Camera {
    #[serde(rename = "type")]
    pub kind: CameraKind,
    pub position: Vec3,
    pub look_at: Vec3,
    pub fov: Option<f64>,
    pub zoom: Option<f64>,
}

impl Camera {
    pub fn default_for(mode: VisualMode) -> Self {
        match mode {
            VisualMode::ThreeD => Self {
                kind: CameraKind::Perspective,
                position: [5.0, 5.0, 5.0],
                look_at: [0.0; 3],
                fov: Some(75.0),
                zoom: None,
            },
            VisualMode::TwoD => Self {
                kind: CameraKind::Orthographic,
                position: [0.0, 0.0, 10.0],
                look_at: [0.0; 3],
                fov: None,
                zoom: Some(50.0),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
    Hemisphere,
}

impl LightKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ambient" => Some(LightKind::Ambient),
            "directional" => Some(LightKind::Directional),
            "point" => Some(LightKind::Point),
            "spot" => Some(LightKind::Spot),
            "hemisphere" => Some(LightKind::Hemisphere),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(rename = "type")]
    pub kind: LightKind,
    pub color: String,
    pub intensity: f64,
    pub position: Option<Vec3>,
}

/// Ambient fill plus one directional key light.
pub fn default_lights() -> Vec<Light> {
    vec![
        Light {
            kind: LightKind::Ambient,
            color: "#ffffff".to_string(),
            intensity: 0.6,
            position: None,
        },
        Light {
            kind: LightKind::Directional,
            color: "#ffffff".to_string(),
            intensity: 0.8,
            position: Some([10.0, 10.0, 5.0]),
        },
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    pub id: String,
    pub geometry: Geometry,
    pub geometry_args: Option<Vec<f64>>,
    pub material: String,
    pub color: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub opacity: f64,
    pub transparent: bool,
    pub wireframe: bool,
    pub label: Option<String>,
}

impl SceneObject {
    pub fn placeholder(mode: VisualMode) -> Self {
        Self {
            id: "placeholder".to_string(),
            geometry: Geometry::placeholder_for(mode),
            geometry_args: None,
            material: DEFAULT_MATERIAL.to_string(),
            color: DEFAULT_OBJECT_COLOR.to_string(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            opacity: 1.0,
            transparent: false,
            wireframe: false,
            label: Some(PLACEHOLDER_LABEL.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Rotate,
    Float,
    Pulse,
    Orbit,
    Bounce,
}

impl AnimationKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rotate" => Some(AnimationKind::Rotate),
            "float" => Some(AnimationKind::Float),
            "pulse" => Some(AnimationKind::Pulse),
            "orbit" => Some(AnimationKind::Orbit),
            "bounce" => Some(AnimationKind::Bounce),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub axis: Axis,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneProvenance {
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSceneDescription {
    pub version: u32,
    pub mode: VisualMode,
    pub title: String,
    pub background_color: String,
    pub camera: Camera,
    pub lights: Vec<Light>,
    /// Never empty.
    pub objects: Vec<SceneObject>,
    pub animations: Vec<Animation>,
    pub show_grid: bool,
    pub show_axes: bool,
    pub generation: SceneProvenance,
}

pub fn default_background(mode: VisualMode) -> &'static str {
    match mode {
        VisualMode::ThreeD => "#1a1a2e",
        VisualMode::TwoD => "#ffffff",
    }
}
