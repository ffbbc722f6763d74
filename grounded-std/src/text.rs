use async_trait::async_trait;
use grounded_plugin::{Permission, Plugin, PluginError, PluginOutput, Result};
use serde::Deserialize;
use serde_json::Value;

/// Counts characters, words and lines of a text on the server.
pub struct AnalyzeTextPlugin;

#[derive(Debug, Deserialize)]
struct AnalyzeTextParams {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
        }
    }
}

impl AnalyzeTextPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzeTextPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for AnalyzeTextPlugin {
    fn name(&self) -> &str {
        "analyze_text"
    }

    fn description(&self) -> &str {
        "Analyze a text string on the server: returns character count, word count, and line count. \
         Use when you need the server to compute these values rather than inferring from context."
    }

    fn parameter_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "required": ["text"],
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The text to analyze"
                }
            }
        })
    }

    fn required_permission(&self) -> Permission {
        Permission::NONE
    }

    async fn execute(&self, input: Value) -> Result<PluginOutput> {
        let params: AnalyzeTextParams = match input {
            Value::Null => AnalyzeTextParams { text: None },
            input => serde_json::from_value(input)
                .map_err(|e| PluginError::InvalidInput(format!("Invalid parameters: {}", e)))?,
        };

        let text = params.text.unwrap_or_default();
        if text.is_empty() {
            return Ok(PluginOutput::new(
                "Analysis: characters=0, words=0, lines=0 (empty or null input)",
            ));
        }

        let stats = TextStats::of(&text);
        Ok(PluginOutput::new(format!(
            "Analysis: characters={}, words={}, lines={}",
            stats.characters, stats.words, stats.lines
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_stats() {
        let stats = TextStats::of("hello world\nsecond  line here");
        assert_eq!(
            stats,
            TextStats {
                characters: 29,
                words: 5,
                lines: 2
            }
        );
    }

    #[tokio::test]
    async fn test_analyze_empty_text() {
        let output = AnalyzeTextPlugin::new()
            .execute(serde_json::json!({ "text": "" }))
            .await
            .unwrap();
        assert_eq!(
            output.content,
            "Analysis: characters=0, words=0, lines=0 (empty or null input)"
        );
    }

    #[tokio::test]
    async fn test_analyze_missing_text() {
        let output = AnalyzeTextPlugin::new().execute(Value::Null).await.unwrap();
        assert!(output.content.contains("empty or null input"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_wrong_type() {
        let err = AnalyzeTextPlugin::new()
            .execute(serde_json::json!({ "text": 42 }))
            .await
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_analyze_text() {
        let output = AnalyzeTextPlugin::new()
            .execute(serde_json::json!({ "text": "one two\nthree" }))
            .await
            .unwrap();
        assert_eq!(output.content, "Analysis: characters=13, words=3, lines=2");
    }
}
