use serde::de::DeserializeOwned;
use serde_json::Value;
use spin_core::{Error, Result};

/// Pulls the JSON object out of a free-text answer.
///
/// Grounded answers are not guaranteed to be bare JSON: they may carry prose
/// or markdown fences around the object. Everything from the first `{` to the
/// last `}` is parsed.
pub fn extract_json(text: &str) -> Result<Value> {
    let start = text.find('{');
    let end = text.rfind('}');

    let candidate = match (start, end) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => {
            return Err(Error::MalformedResponse(format!(
                "no JSON object in response: {}",
                preview(text)
            )))
        }
    };

    serde_json::from_str(candidate)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON in response ({}): {}", e, preview(text))))
}

/// Extracts and deserializes in one go.
pub fn extract_as<T: DeserializeOwned>(text: &str) -> Result<T> {
    let value = extract_json(text)?;
    serde_json::from_value(value).map_err(|e| Error::MalformedResponse(format!("unexpected response shape: {}", e)))
}

fn preview(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(120) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_object_surrounded_by_prose() {
        let value = extract_json("here is json: {\"a\":1} thanks").unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn test_extracts_from_markdown_fence() {
        let text = "Sure!\n```json\n{\"articles\": [{\"title\": \"A\"}]}\n```\nLet me know.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["articles"][0]["title"], "A");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let first = extract_json("prefix {\"a\": {\"b\": [1, 2]}} suffix").unwrap();
        let second = extract_json(&first.to_string()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_braces_is_malformed() {
        for text in ["no json here", "", "} backwards {", "{ unterminated"] {
            let err = extract_json(text).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{:?} for {:?}", err, text);
        }
    }

    #[test]
    fn test_unparsable_substring_is_malformed() {
        let err = extract_json("{not: json}").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_as_reports_shape_errors() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Expected {
            score: f32,
        }
        let err = extract_as::<Expected>("{\"score\": \"high\"}").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
        assert_eq!(extract_as::<Expected>("ok {\"score\": 2.5}").unwrap().score, 2.5);
    }
}
