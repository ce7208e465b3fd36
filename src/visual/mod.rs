//! Visual scene generation: prompt, external call, sanitization.

pub mod prompt;
pub mod sanitize;
pub mod scene;

pub use prompt::{build_visual_prompt, VisualRequest};
pub use sanitize::sanitize_scene;
pub use scene::VisualSceneDescription;

use crate::error::ApiError;
use crate::generation::GenerationCollaborator;
use crate::visual::scene::SceneProvenance;
use chrono::Utc;
use tracing::info;

/// Asks the collaborator for a scene and normalizes the reply.
///
/// Collaborator failures and replies that are not a JSON object propagate. Anything that
/// parses as an object yields a valid scene.
pub async fn generate_visual(
    collaborator: &dyn GenerationCollaborator,
    request: &VisualRequest,
) -> Result<VisualSceneDescription, ApiError> {
    if request.question.trim().is_empty() {
        return Err(ApiError::InvalidRequest(
            "visual generation needs question text".to_string(),
        ));
    }

    let prompt = build_visual_prompt(request);
    let raw = collaborator.complete_json(&prompt).await?;
    if !raw.is_object() {
        return Err(ApiError::MalformedResponse(
            "scene reply is not a JSON object".to_string(),
        ));
    }

    let scene = sanitize_scene(
        &raw,
        request.mode,
        SceneProvenance {
            model: collaborator.model_name().to_string(),
            generated_at: Utc::now(),
        },
    );
    info!(
        mode = %request.mode,
        objects = scene.objects.len(),
        animations = scene.animations.len(),
        "Generated visual scene"
    );
    Ok(scene)
}
