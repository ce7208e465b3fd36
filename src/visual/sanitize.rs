//! Normalizes a loosely shaped model reply into a [`VisualSceneDescription`].
//!
//! Total and deterministic: every missing or ill-typed field falls back to a default and
//! closed enumerations are enforced. Only unparsable replies are rejected, and that happens
//! before this pass.

use crate::types::VisualMode;
use crate::visual::scene::{
    default_background, default_lights, Animation, AnimationKind, Axis, Camera, CameraKind,
    Geometry, Light, LightKind, SceneObject, SceneProvenance, Vec3, VisualSceneDescription,
    DEFAULT_MATERIAL, DEFAULT_OBJECT_COLOR, DEFAULT_TITLE, SCENE_VERSION,
};
use serde_json::{Map, Value};

pub fn sanitize_scene(
    raw: &Value,
    mode: VisualMode,
    generation: SceneProvenance,
) -> VisualSceneDescription {
    let empty = Map::new();
    let root = raw.as_object().unwrap_or(&empty);

    let mut objects: Vec<SceneObject> = array(root, "objects")
        .iter()
        .enumerate()
        .filter_map(|(index, value)| sanitize_object(value.as_object()?, index, mode))
        .collect();
    if objects.is_empty() {
        objects.push(SceneObject::placeholder(mode));
    }

    let mut lights: Vec<Light> = array(root, "lights")
        .iter()
        .filter_map(|value| sanitize_light(value.as_object()?))
        .collect();
    if lights.is_empty() {
        lights = default_lights();
    }

    let animations = array(root, "animations")
        .iter()
        .filter_map(|value| sanitize_animation(value.as_object()?))
        .collect();

    VisualSceneDescription {
        version: SCENE_VERSION,
        mode,
        title: string(root, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        background_color: string(root, "backgroundColor")
            .unwrap_or_else(|| default_background(mode).to_string()),
        camera: sanitize_camera(root.get("camera").and_then(Value::as_object), mode),
        lights,
        objects,
        animations,
        show_grid: boolean(root, "showGrid").unwrap_or(mode == VisualMode::ThreeD),
        show_axes: boolean(root, "showAxes").unwrap_or(false),
        generation,
    }
}

fn sanitize_camera(raw: Option<&Map<String, Value>>, mode: VisualMode) -> Camera {
    let mut camera = Camera::default_for(mode);
    let Some(raw) = raw else {
        return camera;
    };

    // The projection follows the mode; a reply's "type" is ignored.
    if let Some(position) = raw.get("position").and_then(vec3) {
        camera.position = position;
    }
    if let Some(look_at) = raw.get("lookAt").and_then(vec3) {
        camera.look_at = look_at;
    }
    match camera.kind {
        CameraKind::Perspective => {
            camera.fov = number(raw, "fov").filter(|f| *f > 0.0).or(Some(75.0));
            camera.zoom = None;
        }
        CameraKind::Orthographic => {
            camera.zoom = number(raw, "zoom").filter(|z| *z > 0.0).or(Some(50.0));
            camera.fov = None;
        }
    }
    camera
}

fn sanitize_light(raw: &Map<String, Value>) -> Option<Light> {
    let kind = LightKind::from_name(string(raw, "type")?.as_str())?;
    Some(Light {
        kind,
        color: string(raw, "color").unwrap_or_else(|| "#ffffff".to_string()),
        intensity: number(raw, "intensity").filter(|i| *i >= 0.0).unwrap_or(1.0),
        position: raw.get("position").and_then(vec3),
    })
}

fn sanitize_object(
    raw: &Map<String, Value>,
    index: usize,
    mode: VisualMode,
) -> Option<SceneObject> {
    let geometry = string(raw, "geometry")
        .and_then(|name| Geometry::from_name(&name))
        .unwrap_or(Geometry::Box);

    let geometry_args = raw.get("geometryArgs").and_then(Value::as_array).map(|args| {
        args.iter()
            .filter_map(Value::as_f64)
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>()
    });

    let mut position = raw.get("position").and_then(vec3).unwrap_or([0.0; 3]);
    if mode == VisualMode::TwoD {
        position[2] = 0.0;
    }

    let scale = match raw.get("scale") {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).map(|v| [v; 3]),
        Some(other) => vec3(other),
        None => None,
    }
    .unwrap_or([1.0; 3]);

    Some(SceneObject {
        id: string(raw, "id").unwrap_or_else(|| format!("obj_{}", index)),
        geometry,
        geometry_args,
        material: string(raw, "material").unwrap_or_else(|| DEFAULT_MATERIAL.to_string()),
        color: string(raw, "color").unwrap_or_else(|| DEFAULT_OBJECT_COLOR.to_string()),
        position,
        rotation: raw.get("rotation").and_then(vec3).unwrap_or([0.0; 3]),
        scale,
        opacity: number(raw, "opacity").map(|o| o.clamp(0.0, 1.0)).unwrap_or(1.0),
        transparent: boolean(raw, "transparent").unwrap_or(false),
        wireframe: boolean(raw, "wireframe").unwrap_or(false),
        label: string(raw, "label"),
    })
}

fn sanitize_animation(raw: &Map<String, Value>) -> Option<Animation> {
    let target = string(raw, "target")?;
    let kind = AnimationKind::from_name(string(raw, "type")?.as_str())?;
    let axis = match string(raw, "axis").as_deref() {
        Some("x") => Axis::X,
        Some("z") => Axis::Z,
        _ => Axis::Y,
    };
    Some(Animation {
        target,
        kind,
        axis,
        speed: number(raw, "speed").filter(|s| *s > 0.0).unwrap_or(1.0),
    })
}

fn array<'a>(map: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn number(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn boolean(map: &Map<String, Value>, key: &str) -> Option<bool> {
    map.get(key).and_then(Value::as_bool)
}

fn vec3(value: &Value) -> Option<Vec3> {
    let items = value.as_array()?;
    if items.len() < 3 {
        return None;
    }
    let mut out = [0.0; 3];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item.as_f64().filter(|v| v.is_finite())?;
    }
    Some(out)
}
