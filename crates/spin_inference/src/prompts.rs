use serde_json::{json, Value};
use spin_core::{ArticleRef, TopicHeadline};

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn string_list() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

fn perspective_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": string(),
            "talkingPoints": string_list()
        },
        "required": ["summary", "talkingPoints"]
    })
}

pub fn headlines_prompt(per_side: usize) -> String {
    format!(
        "List the {n} most important current news headlines from left-leaning outlets and the {n} most \
         important current news headlines from right-leaning outlets. For each headline give the exact \
         headline text, the outlet name, a single emoji capturing its tone, the publication date and time \
         in ISO 8601 format if known, and the article URL if known.",
        n = per_side
    )
}

pub fn headlines_schema() -> Value {
    let headline = json!({
        "type": "OBJECT",
        "properties": {
            "headline": string(),
            "source": string(),
            "toneEmoji": string(),
            "publishedAt": string(),
            "url": string()
        },
        "required": ["headline", "source", "toneEmoji"]
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "leftLeaning": { "type": "ARRAY", "items": headline.clone() },
            "rightLeaning": { "type": "ARRAY", "items": headline }
        },
        "required": ["leftLeaning", "rightLeaning"]
    })
}

pub fn direct_analysis_prompt(topic: &TopicHeadline) -> String {
    let mut context = format!("Headline: \"{}\"", topic.text);
    if let Some(source) = &topic.source {
        context.push_str(&format!("\nSource: {}", source));
    }
    if let Some(url) = &topic.url {
        context.push_str(&format!("\nURL: {}", url));
    }
    if let Some(published_at) = &topic.published_at {
        context.push_str(&format!("\nPublished: {}", published_at.to_rfc3339()));
    }

    format!(
        "{context}\n\n\
         Analyze the story behind this headline. Classify its news category. Rate its popularity from 0 to 10 \
         and justify the rating. Say whether the headline appears to have been edited since publication and \
         why. Then describe how the story is framed from a right-wing, a left-wing and a socialist \
         perspective: for each give a short summary and a list of talking points. Finally rate the political \
         lean of the coverage on a scale from -10 (far left) to 10 (far right) and justify the score."
    )
}

pub fn direct_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "category": string(),
            "popularity": {
                "type": "OBJECT",
                "properties": { "score": { "type": "INTEGER" }, "justification": string() },
                "required": ["score", "justification"]
            },
            "wasEdited": {
                "type": "OBJECT",
                "properties": { "status": { "type": "BOOLEAN" }, "reasoning": string() },
                "required": ["status", "reasoning"]
            },
            "rightWing": perspective_schema(),
            "leftWing": perspective_schema(),
            "socialist": perspective_schema(),
            "spectrumScore": { "type": "NUMBER" },
            "spectrumJustification": string()
        },
        "required": [
            "category", "popularity", "wasEdited", "rightWing", "leftWing", "socialist",
            "spectrumScore", "spectrumJustification"
        ]
    })
}

/// Grounded requests cannot carry a schema, so the expected shape is spelled
/// out in the prompt itself.
pub fn article_search_prompt(topic: &str) -> String {
    format!(
        "Search the web for recent news coverage of: \"{topic}\".\n\
         Find one article from a right-leaning outlet and one article from a left-leaning outlet covering \
         this story. Reply with a single JSON object of the form \
         {{\"rightWingArticle\": {{\"title\": \"...\", \"url\": \"...\", \"source\": \"...\", \"publishedAt\": \"...\"}}, \
         \"leftWingArticle\": {{\"title\": \"...\", \"url\": \"...\", \"source\": \"...\", \"publishedAt\": \"...\"}}}}. \
         Use ISO 8601 for publishedAt. If you cannot tell which outlet leans which way, reply with \
         {{\"articles\": [...]}} listing both articles instead."
    )
}

pub fn source_classification_prompt(first: &str, second: &str) -> String {
    format!(
        "Two news outlets covered the same story: \"{first}\" and \"{second}\". Which one of them is the \
         right-leaning outlet? Answer with its name spelled exactly as given."
    )
}

pub fn source_classification_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": { "rightWingArticleSource": string() },
        "required": ["rightWingArticleSource"]
    })
}

fn describe_article(label: &str, article: &ArticleRef) -> String {
    let mut line = format!("{label}: \"{}\" ({})", article.title, article.source);
    if let Some(url) = &article.url {
        line.push_str(&format!(" {}", url));
    }
    line
}

pub fn article_analysis_prompt(topic: &str, right: &ArticleRef, left: &ArticleRef) -> String {
    format!(
        "Story: \"{topic}\"\n{}\n{}\n\n\
         Summarize each article. For the right-leaning article describe its spin. For the left-leaning \
         article describe how it portrays the political right. Then list the talking points a leftist and a \
         socialist would raise about this story. Finally rate the political lean of the combined coverage on \
         a scale from -10 (far left) to 10 (far right) and justify the score.",
        describe_article("Right-leaning article", right),
        describe_article("Left-leaning article", left),
    )
}

pub fn article_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "rightWingArticle": {
                "type": "OBJECT",
                "properties": { "summary": string(), "spinAnalysis": string() },
                "required": ["summary", "spinAnalysis"]
            },
            "leftWingArticle": {
                "type": "OBJECT",
                "properties": { "summary": string(), "portrayalOfRight": string() },
                "required": ["summary", "portrayalOfRight"]
            },
            "leftistTalkingPoints": string_list(),
            "socialistTalkingPoints": string_list(),
            "spectrumScore": { "type": "NUMBER" },
            "spectrumJustification": string()
        },
        "required": [
            "rightWingArticle", "leftWingArticle", "leftistTalkingPoints", "socialistTalkingPoints",
            "spectrumScore", "spectrumJustification"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_prompt_spells_out_shape() {
        let prompt = article_search_prompt("budget vote");
        assert!(prompt.contains("\"rightWingArticle\""));
        assert!(prompt.contains("\"articles\""));
        assert!(prompt.contains("budget vote"));
    }

    #[test]
    fn test_direct_prompt_includes_known_context() {
        let topic = TopicHeadline {
            text: "Rates held".to_string(),
            source: Some("Reuters".to_string()),
            url: None,
            published_at: None,
        };
        let prompt = direct_analysis_prompt(&topic);
        assert!(prompt.contains("Source: Reuters"));
        assert!(!prompt.contains("URL:"));
    }
}
