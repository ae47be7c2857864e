//! Extraction of a JSON object from free-form LLM output

/// Strip a markdown code fence (with or without a `json` tag) and any prose
/// around the outermost JSON object.
///
/// Returns the trimmed input when no braces are found so the caller's JSON
/// decoder reports the failure.
pub fn extract_json_block(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(start) = body.find("```") {
        let after_fence = &body[start + 3..];
        let after_tag = after_fence
            .strip_prefix("json")
            .or_else(|| after_fence.strip_prefix("JSON"))
            .unwrap_or(after_fence);
        body = match after_tag.find("```") {
            Some(end) => &after_tag[..end],
            None => after_tag,
        };
        body = body.trim();
    }

    match (body.find('{'), body.rfind('}')) {
        (Some(open), Some(close)) if open < close => &body[open..=close],
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        assert_eq!(extract_json_block(r#"{"intent": "trend"}"#), r#"{"intent": "trend"}"#);
    }

    #[test]
    fn test_json_fence() {
        let text = "```json\n{\"intent\": \"comparison\"}\n```";
        assert_eq!(extract_json_block(text), "{\"intent\": \"comparison\"}");
    }

    #[test]
    fn test_bare_fence_with_prose() {
        let text = "Here is the result:\n```\n{\"a\": {\"b\": 1}}\n```\nHope this helps.";
        assert_eq!(extract_json_block(text), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_prose_without_fence() {
        let text = "Sure! {\"intent\": \"general\"} Let me know.";
        assert_eq!(extract_json_block(text), "{\"intent\": \"general\"}");
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_block("  not json  "), "not json");
    }

    mod props {
        use crate::json::extract_json_block;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fenced_object_survives_surrounding_prose(
                pre in "[a-zA-Z .!:]{0,40}",
                post in "[a-zA-Z .!]{0,40}",
                n in any::<i64>(),
            ) {
                let object = format!("{{\"k\": {}}}", n);
                let text = format!("{}```json\n{}\n```{}", pre, object, post);
                prop_assert_eq!(extract_json_block(&text), object.as_str());
            }
        }
    }
}
