//! Prompt for a structured scene description.

use crate::generation::JsonPrompt;
use crate::types::VisualMode;

const SCENE_SHAPE: &str = r##"{"title":"...","backgroundColor":"#rrggbb","camera":{"type":"...","position":[x,y,z],"lookAt":[0,0,0]},"lights":[{"type":"ambient|directional|point|spot|hemisphere","color":"#rrggbb","intensity":1,"position":[x,y,z]}],"objects":[{"id":"...","geometry":"...","geometryArgs":[...],"color":"#rrggbb","position":[x,y,z],"rotation":[x,y,z],"scale":[x,y,z],"opacity":1,"label":"..."}],"animations":[{"target":"<object id>","type":"rotate|float|pulse|orbit|bounce","axis":"x|y|z","speed":1}],"showGrid":false,"showAxes":false}"##;

#[derive(Debug, Clone)]
pub struct VisualRequest {
    pub mode: VisualMode,
    pub question: String,
    pub subject_name: Option<String>,
    pub topic_name: Option<String>,
    pub language: Option<String>,
}

pub fn build_visual_prompt(request: &VisualRequest) -> JsonPrompt {
    let system = match request.mode {
        VisualMode::ThreeD => "You design 3D illustrations for school questions. Use a \
perspective camera and the primitives box, sphere, cylinder, cone and torus. Reply with a \
single JSON object and nothing else.",
        VisualMode::TwoD => "You design flat 2D diagrams for school questions. Use an \
orthographic camera looking down the z axis and the primitives plane, circle, ring and box. \
Keep every object on the z = 0 plane. Reply with a single JSON object and nothing else.",
    };

    let mut sections = vec![format!(
        "Illustrate this question:\n{}",
        request.question.trim()
    )];
    if let Some(subject) = request.subject_name.as_deref().filter(|s| !s.trim().is_empty()) {
        sections.push(format!("Subject: {}", subject.trim()));
    }
    if let Some(topic) = request.topic_name.as_deref().filter(|t| !t.trim().is_empty()) {
        sections.push(format!("Topic: {}", topic.trim()));
    }
    if let Some(language) = request.language.as_deref().filter(|l| !l.trim().is_empty()) {
        sections.push(format!("Write titles and labels in language \"{}\".", language.trim()));
    }
    sections.push(
        "Use 3 to 8 labeled objects with vibrant, distinct colors. Add 1 or 2 subtle \
animations. Center the scene at the origin."
            .to_string(),
    );
    sections.push(format!("Respond with JSON shaped like:\n{}", SCENE_SHAPE));

    JsonPrompt {
        system: system.to_string(),
        user: sections.join("\n\n"),
    }
}
