/// Strip markdown code fences from a model response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Pull the outermost `{ ... }` span out of a response that may carry prose
/// around the JSON. Returns `None` when no object is present.
pub fn extract_json_object(response: &str) -> Option<&str> {
    let body = strip_code_blocks(response);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("{}"), "{}");
    }

    #[test]
    fn extract_json_object_skips_surrounding_prose() {
        let raw = "Here is the event:\n{\"type\": \"strike\"}\nLet me know.";
        assert_eq!(extract_json_object(raw), Some("{\"type\": \"strike\"}"));
    }

    #[test]
    fn extract_json_object_handles_fenced_and_missing() {
        assert_eq!(extract_json_object("```json\n{\"a\":1}\n```"), Some("{\"a\":1}"));
        assert_eq!(extract_json_object("null"), None);
        assert_eq!(extract_json_object("} {"), None);
    }
}
