// Shared prompt fragments.
// Each pipeline that needs LLM calls defines its own prompts.rs alongside it.

const JSON_ONLY_MARKER: &str = "Return ONLY a valid JSON object";

/// Appended to every user prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str =
    "\n\nReturn ONLY a valid JSON object. No additional text, no markdown code fences.";

/// Builds a user prompt from a template, substituting `{name}` placeholders
/// in a single pass and appending the JSON-only instruction unless the
/// template already carries it.
///
/// Substituted values are never scanned again, and braces that do not name
/// a known variable (JSON schemas in the templates) are copied as-is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut prompt = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substitution = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });

        match substitution {
            Some((close, value)) => {
                prompt.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                prompt.push('{');
                rest = after;
            }
        }
    }
    prompt.push_str(rest);

    if !template.contains(JSON_ONLY_MARKER) {
        prompt.push_str(JSON_ONLY_INSTRUCTION);
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_and_appends_instruction() {
        let prompt = render("Feedback: {feedback_text}", &[("feedback_text", "great team")]);
        assert!(prompt.starts_with("Feedback: great team"));
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_render_does_not_duplicate_instruction() {
        let template = "x\n\nReturn ONLY a valid JSON object.";
        assert_eq!(render(template, &[]), template);
    }

    #[test]
    fn test_render_does_not_expand_placeholders_inside_values() {
        let prompt = render(
            "Resume: {resume_text}\nFeedback: {feedback_text}",
            &[
                ("resume_text", "see {feedback_text}"),
                ("feedback_text", "{resume_text} again"),
            ],
        );
        assert!(prompt.starts_with("Resume: see {feedback_text}\nFeedback: {resume_text} again"));
    }

    #[test]
    fn test_render_appends_instruction_even_if_value_mentions_it() {
        let prompt = render(
            "Resume: {resume_text}",
            &[("resume_text", "I always Return ONLY a valid JSON object on time")],
        );
        assert!(prompt.ends_with(JSON_ONLY_INSTRUCTION));
    }

    #[test]
    fn test_render_keeps_schema_braces() {
        let template = "Skills of {name}:\n{\n  \"languages\": [\"...\"]\n}";
        let prompt = render(template, &[("name", "Jane")]);
        assert!(prompt.starts_with("Skills of Jane:\n{\n  \"languages\": [\"...\"]\n}"));
    }
}
