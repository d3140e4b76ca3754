//! Prompt builder combining long-term memory with the live session context.
//!
//! The prompt uses XML tags for section boundaries so the model can
//! distinguish the instruction header, each memory category, and the
//! conversation transcript.
//!
//! Layout:
//! ```text
//! <instructions>...</instructions>
//! <user_attributes>- ...</user_attributes>
//! <user_goals>- ...</user_goals>
//! <memories>- ...</memories>
//! <assistant_requests>- ...</assistant_requests>
//! <conversation>User: ... / Assistant: ...</conversation>
//! ```
//!
//! `render` is a deterministic pure function of its inputs, and the debug
//! view is produced by the same code path, so introspection can never show a
//! prompt that differs from what the backend receives.

use serde::Serialize;

use aide_types::chat::ConversationTurn;
use aide_types::memory::{MemoryCategory, MemoryRecord};

/// Fixed instruction header prepended to every reply prompt.
const INSTRUCTION_HEADER: &str = "<instructions>\n\
You are a capable, attentive personal assistant.\n\
Use what you already know about the user, listed in the sections below, to \
respond to their latest message appropriately and naturally.\n\
Reference past conversations naturally without saying \"I remember\".\n\
Reply with the assistant's next message only.\n\
</instructions>";

/// Structured breakdown of a rendered prompt, for introspection tooling.
#[derive(Debug, Clone, Serialize)]
pub struct PromptBreakdown {
    /// The fixed instruction header.
    pub header: String,
    /// Long-term records grouped by category.
    pub long_term: String,
    /// The session turns in chronological order.
    pub short_term: String,
}

/// A rendered prompt together with its breakdown.
///
/// `prompt` is byte-identical to what [`PromptAssembler::render`] returns
/// for the same inputs.
#[derive(Debug, Clone, Serialize)]
pub struct DebugView {
    pub prompt: String,
    pub breakdown: PromptBreakdown,
}

/// Stateless prompt builder.
pub struct PromptAssembler;

impl PromptAssembler {
    /// Render the full prompt for a reply-generation call.
    pub fn render(snapshot: &[ConversationTurn], records: &[MemoryRecord]) -> String {
        Self::render_debug_view(snapshot, records).prompt
    }

    /// Render the prompt plus a structured section breakdown.
    ///
    /// This is the single code path for prompt construction: `render`
    /// delegates here, so the two can never diverge.
    pub fn render_debug_view(
        snapshot: &[ConversationTurn],
        records: &[MemoryRecord],
    ) -> DebugView {
        let header = INSTRUCTION_HEADER.to_string();
        let long_term = Self::long_term_section(records);
        let short_term = Self::short_term_section(snapshot);

        let prompt = [header.as_str(), long_term.as_str(), short_term.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("\n\n");

        DebugView {
            prompt,
            breakdown: PromptBreakdown {
                header,
                long_term,
                short_term,
            },
        }
    }

    /// Long-term records grouped by category in stable order (attribute,
    /// goal, memory, request), ascending `updated_at` within each category.
    fn long_term_section(records: &[MemoryRecord]) -> String {
        let mut sections = Vec::with_capacity(MemoryCategory::ALL.len());

        for category in MemoryCategory::ALL {
            let mut group: Vec<&MemoryRecord> = records
                .iter()
                .filter(|r| r.category == category)
                .collect();
            if group.is_empty() {
                continue;
            }
            // Secondary key on id keeps ordering deterministic when
            // updated_at collides.
            group.sort_by_key(|r| (r.updated_at, r.id));

            let lines: Vec<String> = group.iter().map(|r| format!("- {}", r.content)).collect();
            let tag = Self::category_tag(category);
            sections.push(format!("<{tag}>\n{}\n</{tag}>", lines.join("\n")));
        }

        sections.join("\n\n")
    }

    /// The session turns in chronological order, one line per turn.
    fn short_term_section(snapshot: &[ConversationTurn]) -> String {
        if snapshot.is_empty() {
            return String::new();
        }
        let lines: Vec<String> = snapshot
            .iter()
            .map(|t| {
                let speaker = match t.role {
                    aide_types::chat::TurnRole::User => "User",
                    aide_types::chat::TurnRole::Assistant => "Assistant",
                };
                format!("{speaker}: {}", t.text)
            })
            .collect();
        format!("<conversation>\n{}\n</conversation>", lines.join("\n"))
    }

    fn category_tag(category: MemoryCategory) -> &'static str {
        match category {
            MemoryCategory::Attribute => "user_attributes",
            MemoryCategory::Goal => "user_goals",
            MemoryCategory::Memory => "memories",
            MemoryCategory::Request => "assistant_requests",
        }
    }
}
