//! Augmented prompt assembly.
//!
//! Turns a query and its ranked search results into the prompt sent to the
//! generator: a system instruction, the retrieved chunks labelled by source,
//! and the user's question.

use super::types::SearchResult;
use crate::config::EmptyContextPolicy;
use crate::provider::Message;
use serde::Serialize;

const CONTEXT_DELIMITER: &str = "---------------------";

const GROUNDED_INSTRUCTION: &str = "Given the context information and not prior knowledge, \
answer the question. Cite the sources you used by their label. If the answer is not in \
the context, say that you can't answer the question from the knowledge base.";

/// Marker placed in the prompt when retrieval found nothing.
pub const NO_CONTEXT_MARKER: &str = "No relevant context was found in the knowledge base.";

const ANSWER_WITHOUT_CONTEXT: &str = "Answer the question from general knowledge, and state \
clearly that the answer is not grounded in the knowledge base.";

const DECLINE_WITHOUT_CONTEXT: &str = "Do not answer the question. Tell the user that the \
knowledge base has no information about it.";

/// A retrieved chunk attributed to its source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBlock {
    pub source_label: String,
    pub text: String,
}

/// The assembled prompt for one query. Built per request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedPrompt {
    pub system_prompt: String,
    pub original_query: String,
    /// Retrieved chunks, highest similarity first.
    pub context_blocks: Vec<ContextBlock>,
    pub policy: EmptyContextPolicy,
}

impl AugmentedPrompt {
    pub fn has_context(&self) -> bool {
        !self.context_blocks.is_empty()
    }

    /// The user-facing part of the prompt: context section plus question.
    pub fn user_content(&self) -> String {
        let mut content = String::new();

        if self.has_context() {
            content.push_str("Context information is below, surrounded by ");
            content.push_str(CONTEXT_DELIMITER);
            content.push_str("\n\n");
            content.push_str(CONTEXT_DELIMITER);
            content.push('\n');
            for (i, block) in self.context_blocks.iter().enumerate() {
                content.push_str(&format!(
                    "[{}] (source: {})\n{}\n\n",
                    i + 1,
                    block.source_label,
                    block.text
                ));
            }
            content.push_str(CONTEXT_DELIMITER);
            content.push_str("\n\n");
            content.push_str(GROUNDED_INSTRUCTION);
        } else {
            content.push_str(NO_CONTEXT_MARKER);
            content.push_str("\n\n");
            content.push_str(match self.policy {
                EmptyContextPolicy::Answer => ANSWER_WITHOUT_CONTEXT,
                EmptyContextPolicy::Decline => DECLINE_WITHOUT_CONTEXT,
            });
        }

        content.push_str("\n\nQuestion: ");
        content.push_str(&self.original_query);
        content
    }

    /// Renders the prompt as chat messages for a provider.
    pub fn to_messages(&self) -> Vec<Message> {
        vec![
            Message::system(&self.system_prompt),
            Message::user(self.user_content()),
        ]
    }
}

/// Builds [`AugmentedPrompt`]s with a fixed system prompt and empty-context policy.
#[derive(Debug, Clone)]
pub struct PromptAugmenter {
    system_prompt: String,
    policy: EmptyContextPolicy,
}

impl PromptAugmenter {
    pub fn new(system_prompt: impl Into<String>, policy: EmptyContextPolicy) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            policy,
        }
    }

    pub fn policy(&self) -> EmptyContextPolicy {
        self.policy
    }

    /// Assembles the prompt, keeping `results` in the order given.
    ///
    /// Each block is labelled with the document's `source` metadata, falling
    /// back to the document id.
    pub fn augment(&self, query: &str, results: &[SearchResult]) -> AugmentedPrompt {
        let context_blocks = results
            .iter()
            .map(|result| ContextBlock {
                source_label: result
                    .document
                    .source()
                    .unwrap_or(result.document.id.as_str())
                    .to_string(),
                text: result.document.content.clone(),
            })
            .collect();

        AugmentedPrompt {
            system_prompt: self.system_prompt.clone(),
            original_query: query.to_string(),
            context_blocks,
            policy: self.policy,
        }
    }
}
