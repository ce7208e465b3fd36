//! Integration tests for the content generation pipeline

mod end_to_end;
mod llm_collaborator;
mod store_integration;
mod test_utils;
