use serde::Serialize;
use std::fmt;

/// The structured documents the service knows how to produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Roadmap,
    Tutorial,
    Quiz,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DocumentKind::Roadmap => "roadmap",
            DocumentKind::Tutorial => "tutorial",
            DocumentKind::Quiz => "quiz",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoLink {
    pub title: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_is_lowercase() {
        assert_eq!(DocumentKind::Roadmap.to_string(), "roadmap");
        assert_eq!(DocumentKind::Tutorial.to_string(), "tutorial");
        assert_eq!(DocumentKind::Quiz.to_string(), "quiz");
    }

    #[test]
    fn test_video_link_serializes_title_and_url() {
        let link = VideoLink {
            title: "Closures".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            serde_json::json!({"title": "Closures", "url": "https://www.youtube.com/watch?v=abc"})
        );
    }
}
