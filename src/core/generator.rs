use super::document::DocumentKind;
use super::extract::{self, excerpt};
use super::postprocess;
use super::prompts;
use super::repair;
use super::retry::RetryPolicy;
use super::schema::{self, ValidationResult};
use crate::common::error::{ExtractionError, GenerationError, ProviderError};
use crate::provider::TextGenerator;
use serde_json::Value;
use std::sync::Arc;

/// Turns requests into validated documents.
///
/// A pipeline attempt is provider call (under the network retry policy),
/// extraction, repair and validation. When an attempt fails on the model's
/// output, one more attempt runs with the simplified prompt for that kind.
/// Provider failures end the request straight away.
#[derive(Clone)]
pub struct CourseGenerator {
    provider: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
    max_code_example_len: usize,
}

impl CourseGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>, retry: RetryPolicy) -> Self {
        Self {
            provider,
            retry,
            max_code_example_len: 200,
        }
    }

    pub fn with_code_example_limit(mut self, max_len: usize) -> Self {
        self.max_code_example_len = max_len;
        self
    }

    pub async fn roadmap(&self, course_title: &str, level: &str) -> Result<Value, GenerationError> {
        self.generate_document(
            DocumentKind::Roadmap,
            &prompts::roadmap(course_title, level),
            &prompts::roadmap_simplified(course_title, level),
        )
        .await
    }

    pub async fn tutorial(
        &self,
        topic: &str,
        level: &str,
        format_type: &str,
    ) -> Result<Value, GenerationError> {
        let mut doc = self
            .generate_document(
                DocumentKind::Tutorial,
                &prompts::tutorial(topic, level, format_type),
                &prompts::tutorial_simplified(topic, level, format_type),
            )
            .await?;
        postprocess::trim_code_examples(&mut doc, self.max_code_example_len);
        Ok(doc)
    }

    pub async fn tutorial_markdown(&self, topic: &str, level: &str) -> Result<String, GenerationError> {
        let raw = self.call_provider(&prompts::tutorial_markdown(topic, level)).await?;
        let content = strip_outer_fence(&raw);
        if content.is_empty() {
            return Err(ExtractionError::EmptyResponse.into());
        }
        Ok(content.to_string())
    }

    pub async fn quiz(&self, topic: &str, level: &str, count: u32) -> Result<Value, GenerationError> {
        let mut doc = self
            .generate_document(
                DocumentKind::Quiz,
                &prompts::quiz(topic, level, count),
                &prompts::quiz_simplified(topic, level, count),
            )
            .await?;
        postprocess::strip_quiz_level(&mut doc);
        Ok(doc)
    }

    async fn generate_document(
        &self,
        kind: DocumentKind,
        prompt: &str,
        simplified_prompt: &str,
    ) -> Result<Value, GenerationError> {
        match self.attempt(kind, prompt).await {
            Ok(doc) => Ok(doc),
            Err(err) if err.is_output_failure() => {
                tracing::warn!("First {} attempt failed ({}), retrying with simplified prompt", kind, err);
                let second = self.attempt(kind, simplified_prompt).await;
                match &second {
                    Ok(_) => tracing::info!("{} generated on second attempt with simplified prompt", kind),
                    Err(e) => tracing::error!("Simplified {} attempt failed: {}", kind, e),
                }
                second
            }
            Err(err) => {
                tracing::error!("AI generation failed after retries: {}", err);
                Err(err)
            }
        }
    }

    async fn attempt(&self, kind: DocumentKind, prompt: &str) -> Result<Value, GenerationError> {
        let raw = self.call_provider(prompt).await?;
        tracing::debug!("AI response excerpt: {}", excerpt(&raw, 200));
        let mut doc = recover(&raw, kind)?;
        validate_document(&mut doc, kind)?;
        Ok(doc)
    }

    async fn call_provider(&self, prompt: &str) -> Result<String, ProviderError> {
        // Every provider failure counts as transient.
        self.retry
            .run(|| self.provider.generate(prompt), |_: &ProviderError| true)
            .await
    }
}

/// Extraction, then repair of the best candidate when nothing parsed as is.
pub fn recover(raw: &str, kind: DocumentKind) -> Result<Value, GenerationError> {
    match extract::extract(raw) {
        Ok(doc) => Ok(doc),
        Err(ExtractionError::NoJsonFound) => {
            let candidate = extract::json_candidate(raw);
            if !candidate.starts_with('{') && !candidate.starts_with('[') {
                return Err(ExtractionError::NoJsonFound.into());
            }
            Ok(repair::repair(candidate, kind)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Schema check with the tutorial self-heal applied once on failure.
pub fn validate_document(doc: &mut Value, kind: DocumentKind) -> Result<(), GenerationError> {
    let schema = schema::schema_for(kind);
    let reason = match schema::validate(doc, schema) {
        ValidationResult::Valid => return Ok(()),
        ValidationResult::Invalid(reason) => reason,
    };
    tracing::warn!("Invalid {} structure: {}", kind, reason);

    if kind == DocumentKind::Tutorial && postprocess::heal_tutorial(doc) {
        if schema::validate(doc, schema).is_valid() {
            tracing::info!("Tutorial accepted after filling empty lists");
            return Ok(());
        }
    }
    Err(GenerationError::Validation(reason))
}

/// Drops a ```markdown fence wrapped around the whole reply.
fn strip_outer_fence(raw: &str) -> &str {
    let text = raw.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::Network("script exhausted".into())))
        }
    }

    fn generator(provider: Arc<Scripted>) -> CourseGenerator {
        CourseGenerator::new(provider, RetryPolicy::default())
    }

    fn roadmap_json() -> Value {
        json!({
            "course_title": "Frontend Developer",
            "description": "Build websites.",
            "level": "Beginner",
            "duration": "3 months",
            "modules": [{"module_title": "HTML", "topics": ["Tags"]}]
        })
    }

    #[tokio::test]
    async fn test_roadmap_first_attempt() {
        let provider = Scripted::new(vec![Ok(roadmap_json().to_string())]);
        let doc = generator(provider.clone()).roadmap("Frontend Developer", "Beginner").await.unwrap();
        assert_eq!(doc, roadmap_json());
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_simplified_prompt_after_unparseable_output() {
        let provider = Scripted::new(vec![
            Ok("Sorry, I can only describe the roadmap in words.".to_string()),
            Ok(format!("Here it is:\n```json\n{}\n```", roadmap_json())),
        ]);
        let doc = generator(provider.clone()).roadmap("Frontend Developer", "Beginner").await.unwrap();
        assert_eq!(doc, roadmap_json());

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].starts_with("Create a short roadmap"));
    }

    #[tokio::test]
    async fn test_second_failure_is_terminal() {
        let provider = Scripted::new(vec![Ok("{\"course_title\": ".into()), Ok("no json".into())]);
        let err = generator(provider.clone()).roadmap("Go", "Beginner").await.unwrap_err();
        assert_eq!(err, GenerationError::Extraction(ExtractionError::NoJsonFound));
        assert_eq!(provider.prompts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_exhaustion_skips_simplified_attempt() {
        let provider = Scripted::new(vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::Timeout),
            Err(ProviderError::Timeout),
            Ok(roadmap_json().to_string()),
        ]);
        let err = generator(provider.clone()).roadmap("Go", "Beginner").await.unwrap_err();
        assert_eq!(err, GenerationError::Provider(ProviderError::Timeout));
        assert_eq!(provider.prompts().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_retry_inside_attempt() {
        let provider = Scripted::new(vec![
            Err(ProviderError::RateLimited),
            Ok(roadmap_json().to_string()),
        ]);
        let doc = generator(provider.clone()).roadmap("Go", "Beginner").await.unwrap();
        assert_eq!(doc["course_title"], "Frontend Developer");
        assert_eq!(provider.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_validation_failure_retries_then_reports_reason() {
        let mut bad = roadmap_json();
        bad["modules"] = json!([]);
        let provider = Scripted::new(vec![Ok(bad.to_string()), Ok(bad.to_string())]);
        let err = generator(provider).roadmap("Go", "Beginner").await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::Validation("Field 'modules' must be a non-empty list".into())
        );
    }

    #[tokio::test]
    async fn test_tutorial_self_heal_and_code_trim() {
        let reply = json!({
            "title": "Closures",
            "estimated_time": "10 minutes",
            "overview": "Functions that capture.",
            "prerequisites": [],
            "sections": [{"section_title": "Intro", "content": "c", "code_example": "y".repeat(300)}],
            "practice_exercises": [],
            "additional_resources": []
        });
        let provider = Scripted::new(vec![Ok(reply.to_string())]);
        let doc = generator(provider.clone())
            .tutorial("Closures", "Beginner", "tutorial")
            .await
            .unwrap();
        assert_eq!(doc["prerequisites"], json!([postprocess::DEFAULT_PREREQUISITE]));
        assert_eq!(doc["practice_exercises"], json!([postprocess::DEFAULT_EXERCISE]));
        assert_eq!(doc["sections"][0]["code_example"], postprocess::SIMPLIFIED_CODE);
        assert_eq!(provider.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_quiz_level_removed_and_symbols_repaired() {
        let reply = "{\"title\": \"Circles\", \"description\": \"Geometry\", \"level\": \"Beginner\", \"questions\": [{\"question\": \"Area of a circle is \\pi r²?\", \"options\": [\"πr²\", \"2πr\", \"πd\", \"r²\"], \"correct_answer\": \"πr²\", \"explanation\": \"A = πr²\"},]}";
        let provider = Scripted::new(vec![Ok(reply.to_string())]);
        let doc = generator(provider).quiz("Circles", "Beginner", 1).await.unwrap();
        assert!(doc.get("level").is_none());
        assert_eq!(doc["questions"][0]["correct_answer"], "pir^2");
        assert_eq!(doc["questions"][0]["question"], "Area of a circle is \\pi r^2?");
    }

    #[tokio::test]
    async fn test_markdown_strips_outer_fence() {
        let provider = Scripted::new(vec![Ok("```markdown\n# Closures\n\nBody\n```".to_string())]);
        let content = generator(provider).tutorial_markdown("Closures", "Beginner").await.unwrap();
        assert_eq!(content, "# Closures\n\nBody");
    }

    #[test]
    fn test_recover_prose_with_embedded_json() {
        let raw = format!("Here is the roadmap you asked for: {} Let me know!", roadmap_json());
        assert_eq!(recover(&raw, DocumentKind::Roadmap).unwrap(), roadmap_json());
    }
}
