use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::llm::{ChatMessage, GenerationError, LlmClient};
use crate::models::{Exercise, RevisionSheet};

/// Assistant persona, sent as the first system message on every call.
const PERSONA: &str = "Your name is Clara. You are an educational assistant that is eager to help \
the user on the subject they gave you. You should answer in a warm tone and be nice but no need \
for any pleasing techniques. Don't hesitate to use a different choice of words and point of view \
when answering because the user probably needs a different perspective. Answer to them in the \
language they talked to you in.";

const CHAT_TASK: &str =
    "No formatting needed, answer in a concise way making it as clear as possible for the user.";

const REVISION_TASK: &str = "\
You will be given some content related to a concept either the user struggles to understand or \
needs help to revise. You will generate a set of revision sheets based strictly on the said \
provided content.

Your task happens in two steps:
1. Identify the key concepts that a student must understand from this material. The chosen \
concepts must ideally be building blocks of higher concepts so that the user doesn't miss any \
necessary concept and struggles to later understand more complex concepts. You can occasionally \
choose a higher concept to explain on the condition that you already have written sheets to \
explain the concepts needed to understand the said higher concept.
2. For each concept, produce one structured revision sheet. You are the one to decide the number \
of sheets based on the number of concepts you find crucial. That number shall not exceed 10.

Output format:
[
    {
        \"title\": str,
        \"key_concepts\": [str, str, ...],
        \"detailed_explanation\": str
    },
    ...
]

Constraints:
- Only use information given to you.
- Do not invent external facts.
- Keep terminology consistent with the text.
- Each revision sheet must be clear, concise, and technically accurate.
- No need for extensive length, keep each sheet brief while not sacrificing clarity.
- No extra text outside the JSON object.";

/// Cap on the number of revision sheets kept from a single generation.
const MAX_REVISION_SHEETS: usize = 10;

fn exercises_task(n_questions: usize) -> String {
    format!(
        "\
You will generate {n_questions} multiple-choice questions based exclusively on the content you \
are given.

Output constraints:
- Each item must be structured as JSON.
- No text outside the JSON.
- Incorrect choices must be plausible but wrong.
- Vocabulary must stay aligned with the provided content.
- Strict element format:
{{
\"question\": str,
\"choices\": [ str, str, str, str ],
\"correct_answer\": int,
\"explanation\": str
}}
- The whole wrapped in a list"
    )
}

/// Build the four-message prompt every generation call uses. The order is
/// load-bearing: persona, task instructions, retrieved context (delimited so
/// the model cannot mistake it for instructions), then the user's query last.
pub fn build_messages(task: &str, doc_context: &str, query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(PERSONA),
        ChatMessage::system(task),
        ChatMessage::user(format!(
            "Here is the context to base your reply on :\n---\n{doc_context}\n---"
        )),
        ChatMessage::user(query),
    ]
}

/// Parse model output as `T`, stripping conversational prose if needed.
///
/// Direct parse first; on failure, extract the outermost `[...]` span
/// (dot matches newlines) and retry. Anything else is a `Parse` error,
/// which callers treat differently from a failed backend call.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, GenerationError> {
    if let Ok(parsed) = serde_json::from_str(raw) {
        return Ok(parsed);
    }

    static ARRAY_RE: OnceLock<Regex> = OnceLock::new();
    let re = ARRAY_RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("static regex"));

    let span = re.find(raw).ok_or(GenerationError::Parse)?;
    serde_json::from_str(span.as_str()).map_err(|_| GenerationError::Parse)
}

/// Parse revision-sheet output, enforcing the ten-sheet cap after parsing.
/// The model decides how many concepts warrant a sheet; anything past the
/// cap is discarded, never an error.
fn parse_revision_sheets(raw: &str) -> Result<Vec<RevisionSheet>, GenerationError> {
    let mut sheets: Vec<RevisionSheet> = extract_json(raw)?;
    sheets.truncate(MAX_REVISION_SHEETS);
    Ok(sheets)
}

impl LlmClient {
    /// Plain-text answer to a single question over the retrieved context.
    pub async fn chat(&self, query: &str, doc_context: &str) -> Result<String, GenerationError> {
        self.complete(build_messages(CHAT_TASK, doc_context, query))
            .await
    }

    /// Generate `n_questions` multiple-choice exercises from the context.
    pub async fn generate_exercises(
        &self,
        query: &str,
        doc_context: &str,
        n_questions: usize,
    ) -> Result<Vec<Exercise>, GenerationError> {
        let raw = self
            .complete(build_messages(&exercises_task(n_questions), doc_context, query))
            .await?;
        extract_json(&raw)
    }

    /// Generate up to ten revision sheets from the context.
    pub async fn generate_revision_sheets(
        &self,
        query: &str,
        doc_context: &str,
    ) -> Result<Vec<RevisionSheet>, GenerationError> {
        let raw = self
            .complete(build_messages(REVISION_TASK, doc_context, query))
            .await?;
        parse_revision_sheets(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_order_is_persona_task_context_query() {
        let messages = build_messages("do the thing", "CONTEXT HERE", "what is TCP?");
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.starts_with("Your name is Clara"));
        assert_eq!(messages[1].role, "system");
        assert_eq!(messages[1].content, "do the thing");
        assert_eq!(messages[2].role, "user");
        assert!(messages[2].content.contains("---\nCONTEXT HERE\n---"));
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "what is TCP?");
    }

    #[test]
    fn test_context_is_delimited_even_when_empty() {
        let messages = build_messages(CHAT_TASK, "", "hello");
        assert!(messages[2].content.contains("---\n\n---"));
    }

    #[test]
    fn test_exercises_task_embeds_question_count() {
        let task = exercises_task(3);
        assert!(task.contains("generate 3 multiple-choice questions"));
        assert!(task.contains("\"correct_answer\": int"));
    }

    #[test]
    fn test_extract_json_parses_clean_output() {
        let raw = r#"[{"question":"q","choices":["a","b","c","d"],"correct_answer":1,"explanation":"e"}]"#;
        let parsed: Vec<Exercise> = extract_json(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].correct_answer, 1);
    }

    #[test]
    fn test_extract_json_strips_surrounding_prose() {
        let raw = r#"Sure! Here are your exercises:
[
  {"question":"q1","choices":["a","b","c","d"],"correct_answer":0,"explanation":"e1"},
  {"question":"q2","choices":["a","b","c","d"],"correct_answer":2,"explanation":"e2"},
  {"question":"q3","choices":["a","b","c","d"],"correct_answer":3,"explanation":"e3"}
]
Hope that helps!"#;
        let parsed: Vec<Exercise> = extract_json(raw).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].question, "q2");
    }

    #[test]
    fn test_extract_json_spans_newlines_inside_array() {
        let raw = "prefix text [ {\"title\":\"t\",\n\"key_concepts\":[\"k\"],\n\"detailed_explanation\":\"d\"} ] suffix";
        let parsed: Vec<RevisionSheet> = extract_json(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].title, "t");
    }

    #[test]
    fn test_revision_sheets_truncated_to_the_cap() {
        let sheets: Vec<serde_json::Value> = (0..11)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Concept {i}"),
                    "key_concepts": [format!("k{i}")],
                    "detailed_explanation": "..."
                })
            })
            .collect();
        let raw = serde_json::to_string(&sheets).unwrap();
        let parsed = parse_revision_sheets(&raw).unwrap();
        assert_eq!(parsed.len(), MAX_REVISION_SHEETS);
        assert_eq!(parsed[9].title, "Concept 9");
    }

    #[test]
    fn test_revision_sheets_below_cap_untouched() {
        let raw = r#"[{"title":"t","key_concepts":["k"],"detailed_explanation":"d"}]"#;
        let parsed = parse_revision_sheets(raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn test_extract_json_without_array_is_a_parse_error() {
        let err = extract_json::<Vec<Exercise>>("I cannot answer that.").unwrap_err();
        assert!(matches!(err, GenerationError::Parse));
    }

    #[test]
    fn test_extract_json_with_malformed_array_is_a_parse_error() {
        let err = extract_json::<Vec<Exercise>>("[ {\"question\": } ]").unwrap_err();
        assert!(matches!(err, GenerationError::Parse));
    }
}
