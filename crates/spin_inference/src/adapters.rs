//! Adapters from the loosely-shaped service payloads to the canonical types.
//!
//! Every payload struct here is deliberately lenient (optional fields, field
//! aliases, numbers given as strings). The adapter functions then decide what
//! is required and turn gaps into classified errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use spin_core::{
    AnalysisResult, ArticleAnalysis, ArticleRef, Classification, EditStatus, Error, Headline, Perspective,
    PerspectiveKind, Popularity, Result, Side, Spectrum, Subject, TopicHeadline, ANALYSIS_SCHEMA_VERSION,
};

pub const DEFAULT_TONE_EMOJI: &str = "📰";

fn lenient_f32<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<f32>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64().map(|f| f as f32),
        Some(Value::String(s)) => s.trim().parse::<f32>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<bool>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn clean_points(points: Vec<String>) -> Vec<String> {
    points.into_iter().filter_map(|p| non_blank(Some(p))).collect()
}

/// A date as resolved from the service, with whether the fallback was used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDate {
    pub value: DateTime<Utc>,
    pub defaulted: bool,
}

pub fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Resolves an article date, falling back to `now` when the service omitted
/// it or sent something unparsable.
pub fn resolve_published_at(raw: Option<&str>, now: DateTime<Utc>) -> ResolvedDate {
    match raw.and_then(parse_published_at) {
        Some(value) => ResolvedDate { value, defaulted: false },
        None => ResolvedDate { value: now, defaulted: true },
    }
}

// ---------------------------------------------------------------------------
// Headlines

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinePayload {
    #[serde(alias = "text", alias = "title")]
    pub headline: Option<String>,
    pub source: Option<String>,
    #[serde(alias = "tone", alias = "emoji")]
    pub tone_emoji: Option<String>,
    #[serde(alias = "date", alias = "published_at")]
    pub published_at: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlinesPayload {
    #[serde(alias = "left", alias = "leftWing", alias = "left_leaning")]
    pub left_leaning: Option<Vec<HeadlinePayload>>,
    #[serde(alias = "right", alias = "rightWing", alias = "right_leaning")]
    pub right_leaning: Option<Vec<HeadlinePayload>>,
}

pub fn adapt_headline(payload: HeadlinePayload) -> Result<Headline> {
    let text = non_blank(payload.headline)
        .ok_or_else(|| Error::MalformedResponse("headline without text".to_string()))?;
    let source = non_blank(payload.source)
        .ok_or_else(|| Error::MalformedResponse(format!("headline '{}' has no source", text)))?;
    let published_at = match non_blank(payload.published_at) {
        Some(raw) => {
            let parsed = parse_published_at(&raw);
            if parsed.is_none() {
                tracing::debug!("Ignoring unparsable headline date {:?} for '{}'", raw, text);
            }
            parsed
        }
        None => None,
    };

    Ok(Headline {
        text,
        source,
        tone_emoji: non_blank(payload.tone_emoji).unwrap_or_else(|| DEFAULT_TONE_EMOJI.to_string()),
        published_at,
        url: non_blank(payload.url),
    })
}

/// Validates both side lists. Missing side keys are a schema violation; an
/// empty list is a valid (empty) answer.
pub fn adapt_headlines(payload: HeadlinesPayload) -> Result<(Vec<Headline>, Vec<Headline>)> {
    let left = payload
        .left_leaning
        .ok_or_else(|| Error::MalformedResponse("missing leftLeaning headlines".to_string()))?;
    let right = payload
        .right_leaning
        .ok_or_else(|| Error::MalformedResponse("missing rightLeaning headlines".to_string()))?;

    let left = left.into_iter().map(adapt_headline).collect::<Result<Vec<_>>>()?;
    let right = right.into_iter().map(adapt_headline).collect::<Result<Vec<_>>>()?;
    Ok((left, right))
}

// ---------------------------------------------------------------------------
// Direct analysis (topic + three perspectives)

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerspectivePayload {
    pub summary: Option<String>,
    #[serde(default, alias = "points", alias = "talking_points")]
    pub talking_points: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PopularityPayload {
    #[serde(default, deserialize_with = "lenient_f32")]
    pub score: Option<f32>,
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditPayload {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub status: Option<bool>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SpectrumPayload {
    #[serde(default, deserialize_with = "lenient_f32")]
    pub score: Option<f32>,
    pub justification: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPayload {
    #[serde(alias = "text", alias = "title")]
    pub headline: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectAnalysisPayload {
    pub topic: Option<TopicPayload>,
    pub category: Option<String>,
    pub popularity: Option<PopularityPayload>,
    pub was_edited: Option<EditPayload>,
    #[serde(alias = "rightWingPerspective", alias = "right_wing")]
    pub right_wing: Option<PerspectivePayload>,
    #[serde(alias = "leftWingPerspective", alias = "left_wing")]
    pub left_wing: Option<PerspectivePayload>,
    #[serde(alias = "socialistPerspective")]
    pub socialist: Option<PerspectivePayload>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub spectrum_score: Option<f32>,
    pub spectrum_justification: Option<String>,
    pub spectrum: Option<SpectrumPayload>,
}

fn adapt_spectrum(
    flat_score: Option<f32>,
    flat_justification: Option<String>,
    nested: Option<SpectrumPayload>,
) -> Result<Spectrum> {
    let (nested_score, nested_justification) = match nested {
        Some(s) => (s.score, s.justification),
        None => (None, None),
    };
    let score = flat_score
        .or(nested_score)
        .ok_or_else(|| Error::MalformedResponse("missing spectrum score".to_string()))?;
    let justification = non_blank(flat_justification).or_else(|| non_blank(nested_justification)).unwrap_or_default();

    let (spectrum, clamped) = Spectrum::clamped(score, justification);
    if clamped {
        tracing::warn!("⚠️ Spectrum score {} outside [-10, 10], clamped to {}", score, spectrum.score);
    }
    Ok(spectrum)
}

fn adapt_classification(
    category: Option<String>,
    popularity: Option<PopularityPayload>,
    was_edited: Option<EditPayload>,
) -> Option<Classification> {
    let category = non_blank(category)?;
    let popularity = popularity.and_then(|p| {
        let score = p.score?;
        Some(Popularity {
            score: score.round().clamp(0.0, 10.0) as u8,
            justification: non_blank(p.justification).unwrap_or_default(),
        })
    });
    let was_edited = was_edited.and_then(|e| {
        Some(EditStatus {
            status: e.status?,
            reasoning: non_blank(e.reasoning).unwrap_or_default(),
        })
    });

    match (popularity, was_edited) {
        (Some(popularity), Some(was_edited)) => Some(Classification { category, popularity, was_edited }),
        _ => {
            tracing::warn!("⚠️ Incomplete classification for category '{}', leaving it out", category);
            None
        }
    }
}

fn adapt_perspective(kind: PerspectiveKind, payload: Option<PerspectivePayload>) -> Result<Perspective> {
    let payload = payload
        .ok_or_else(|| Error::MalformedResponse(format!("missing {} perspective", kind.label())))?;
    let summary = non_blank(payload.summary)
        .ok_or_else(|| Error::MalformedResponse(format!("{} perspective has no summary", kind.label())))?;
    Ok(Perspective {
        kind,
        summary: Some(summary),
        talking_points: clean_points(payload.talking_points),
    })
}

/// Adapts a direct-strategy answer. `requested` describes the headline that
/// was sent and fills in whatever the service did not echo back.
pub fn adapt_direct(payload: DirectAnalysisPayload, requested: TopicHeadline) -> Result<AnalysisResult> {
    let topic = match payload.topic {
        Some(topic) => TopicHeadline {
            text: non_blank(topic.headline).unwrap_or(requested.text),
            source: non_blank(topic.source).or(requested.source),
            url: non_blank(topic.url).or(requested.url),
            published_at: topic
                .published_at
                .as_deref()
                .and_then(parse_published_at)
                .or(requested.published_at),
        },
        None => requested,
    };

    let perspectives = vec![
        adapt_perspective(PerspectiveKind::RightWing, payload.right_wing)?,
        adapt_perspective(PerspectiveKind::LeftWing, payload.left_wing)?,
        adapt_perspective(PerspectiveKind::Socialist, payload.socialist)?,
    ];

    Ok(AnalysisResult {
        schema_version: ANALYSIS_SCHEMA_VERSION,
        subject: Subject::Topic(topic),
        classification: adapt_classification(payload.category, payload.popularity, payload.was_edited),
        perspectives,
        spectrum: adapt_spectrum(payload.spectrum_score, payload.spectrum_justification, payload.spectrum)?,
    })
}

// ---------------------------------------------------------------------------
// Search-and-classify

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    #[serde(alias = "headline")]
    pub title: Option<String>,
    #[serde(alias = "link")]
    pub url: Option<String>,
    #[serde(alias = "outlet", alias = "publisher")]
    pub source: Option<String>,
    #[serde(alias = "date", alias = "published_at")]
    pub published_at: Option<String>,
}

/// Article identification arrives either flat or wrapped in `article`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArticleSlot {
    Nested { article: RawArticle },
    Flat(RawArticle),
}

impl ArticleSlot {
    pub fn into_raw(self) -> RawArticle {
        match self {
            ArticleSlot::Nested { article } => article,
            ArticleSlot::Flat(article) => article,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSearchPayload {
    #[serde(alias = "rightArticle", alias = "right_wing_article")]
    pub right_wing_article: Option<ArticleSlot>,
    #[serde(alias = "leftArticle", alias = "left_wing_article")]
    pub left_wing_article: Option<ArticleSlot>,
    #[serde(default)]
    pub articles: Vec<ArticleSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The service already said which article is which.
    Labeled { right: RawArticle, left: RawArticle },
    /// A plain list that still needs a side assignment.
    Unlabeled(Vec<RawArticle>),
}

pub fn adapt_search(payload: ArticleSearchPayload) -> Result<SearchOutcome> {
    match (payload.right_wing_article, payload.left_wing_article) {
        (Some(right), Some(left)) => Ok(SearchOutcome::Labeled {
            right: right.into_raw(),
            left: left.into_raw(),
        }),
        _ if payload.articles.len() >= 2 => Ok(SearchOutcome::Unlabeled(
            payload.articles.into_iter().map(ArticleSlot::into_raw).collect(),
        )),
        _ => Err(Error::ArticlesNotFound(format!(
            "search returned {} usable article(s)",
            payload.articles.len()
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceClassificationPayload {
    #[serde(alias = "rightSource", alias = "right_wing_article_source")]
    pub right_wing_article_source: Option<String>,
}

/// Picks the right-leaning article among the first two by exact source match.
/// Returns `(right, left)`.
pub fn assign_sides(mut articles: Vec<RawArticle>, right_source: &str) -> Result<(RawArticle, RawArticle)> {
    if articles.len() < 2 {
        return Err(Error::ArticlesNotFound("fewer than two articles to classify".to_string()));
    }
    articles.truncate(2);
    let second = articles.pop().unwrap_or_default();
    let first = articles.pop().unwrap_or_default();

    let first_matches = first.source.as_deref() == Some(right_source);
    let second_matches = second.source.as_deref() == Some(right_source);
    match (first_matches, second_matches) {
        (true, false) => Ok((first, second)),
        (false, true) => Ok((second, first)),
        (true, true) => Err(Error::ArticlesNotFound(format!(
            "both articles come from '{}', cannot tell the sides apart",
            right_source
        ))),
        (false, false) => Err(Error::ArticlesNotFound(format!(
            "classified source '{}' matches neither article",
            right_source
        ))),
    }
}

/// Normalizes one side's article. A missing title fails the whole analysis;
/// a missing date falls back to `now` and is flagged.
pub fn normalize_article(raw: RawArticle, side: Side, now: DateTime<Utc>) -> Result<ArticleRef> {
    let title = non_blank(raw.title)
        .ok_or_else(|| Error::ArticlesNotFound(format!("the {}-leaning article has no title", side)))?;
    let source = non_blank(raw.source).unwrap_or_else(|| {
        tracing::warn!("⚠️ No source for {}-leaning article '{}'", side, title);
        "Unknown source".to_string()
    });

    let date = resolve_published_at(raw.published_at.as_deref(), now);
    if date.defaulted {
        tracing::warn!(
            "📅 No usable publish date for {}-leaning article '{}', using request time {}",
            side,
            title,
            date.value.to_rfc3339()
        );
    }

    Ok(ArticleRef {
        title,
        url: non_blank(raw.url),
        source,
        published_at: date.value,
        published_at_defaulted: date.defaulted,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummaryPayload {
    pub summary: Option<String>,
    #[serde(alias = "spinAnalysis", alias = "portrayalOfRight")]
    pub framing: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleAnalysisPayload {
    #[serde(alias = "rightArticle", alias = "rightWingArticleAnalysis")]
    pub right_wing_article: Option<ArticleSummaryPayload>,
    #[serde(alias = "leftArticle", alias = "leftWingArticleAnalysis")]
    pub left_wing_article: Option<ArticleSummaryPayload>,
    #[serde(default, alias = "leftWingTalkingPoints")]
    pub leftist_talking_points: Vec<String>,
    #[serde(default)]
    pub socialist_talking_points: Vec<String>,
    #[serde(default, deserialize_with = "lenient_f32")]
    pub spectrum_score: Option<f32>,
    pub spectrum_justification: Option<String>,
    pub spectrum: Option<SpectrumPayload>,
}

fn adapt_article_analysis(side: Side, article: ArticleRef, payload: Option<ArticleSummaryPayload>) -> Result<ArticleAnalysis> {
    let payload = payload
        .ok_or_else(|| Error::MalformedResponse(format!("missing analysis of the {}-leaning article", side)))?;
    let summary = non_blank(payload.summary)
        .ok_or_else(|| Error::MalformedResponse(format!("the {}-leaning article has no summary", side)))?;
    Ok(ArticleAnalysis {
        side,
        article,
        summary,
        framing: non_blank(payload.framing).unwrap_or_default(),
    })
}

/// Adapts the final search-strategy answer onto the two normalized articles.
pub fn adapt_article_analysis_result(
    payload: ArticleAnalysisPayload,
    right: ArticleRef,
    left: ArticleRef,
) -> Result<AnalysisResult> {
    let right = adapt_article_analysis(Side::Right, right, payload.right_wing_article)?;
    let left = adapt_article_analysis(Side::Left, left, payload.left_wing_article)?;

    let perspectives = [
        (PerspectiveKind::LeftWing, payload.leftist_talking_points),
        (PerspectiveKind::Socialist, payload.socialist_talking_points),
    ]
    .into_iter()
    .map(|(kind, points)| Perspective { kind, summary: None, talking_points: clean_points(points) })
    .filter(|p| !p.talking_points.is_empty())
    .collect();

    Ok(AnalysisResult {
        schema_version: ANALYSIS_SCHEMA_VERSION,
        subject: Subject::Articles { right, left },
        classification: None,
        perspectives,
        spectrum: adapt_spectrum(payload.spectrum_score, payload.spectrum_justification, payload.spectrum)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn topic() -> TopicHeadline {
        TopicHeadline {
            text: "Senate passes budget".to_string(),
            source: Some("AP".to_string()),
            url: None,
            published_at: None,
        }
    }

    fn direct_payload(value: Value) -> DirectAnalysisPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_direct_variant_is_adapted() {
        let payload = direct_payload(json!({
            "category": "Politics",
            "popularity": {"score": "8", "justification": "Trending everywhere"},
            "wasEdited": {"status": false, "reasoning": "No edits"},
            "rightWing": {"summary": "Fiscal win.", "talkingPoints": ["Lower deficit", "  "]},
            "leftWingPerspective": {"summary": "Cuts hurt.", "talkingPoints": ["Programs slashed"]},
            "socialist": {"summary": "Austerity.", "points": []},
            "spectrumScore": 2.5,
            "spectrumJustification": "Mostly centrist"
        }));

        let result = adapt_direct(payload, topic()).unwrap();
        assert_eq!(result.schema_version, ANALYSIS_SCHEMA_VERSION);
        assert_eq!(result.perspectives.len(), 3);
        let right = result.perspective(PerspectiveKind::RightWing).unwrap();
        assert_eq!(right.talking_points, vec!["Lower deficit".to_string()]);
        assert_eq!(result.classification.as_ref().unwrap().popularity.score, 8);
        assert_eq!(result.spectrum.score, 2.5);
        assert_eq!(result.title(), "Senate passes budget");
    }

    #[test]
    fn test_direct_variant_requires_summaries() {
        let payload = direct_payload(json!({
            "rightWing": {"summary": "x"},
            "leftWing": {"summary": " "},
            "socialist": {"summary": "y"},
            "spectrumScore": 0
        }));
        let err = adapt_direct(payload, topic()).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(msg) if msg.contains("left-wing")));
    }

    #[test]
    fn test_nested_spectrum_and_partial_classification() {
        let payload = direct_payload(json!({
            "category": "Economy",
            "rightWing": {"summary": "a"},
            "leftWing": {"summary": "b"},
            "socialist": {"summary": "c"},
            "spectrum": {"score": -42, "justification": "far out"}
        }));
        let result = adapt_direct(payload, topic()).unwrap();
        assert!(result.classification.is_none());
        assert_eq!(result.spectrum.score, -10.0);
        assert_eq!(result.spectrum.justification, "far out");
    }

    #[test]
    fn test_search_shapes() {
        let labeled: ArticleSearchPayload = serde_json::from_value(json!({
            "rightWingArticle": {"title": "R", "source": "Fox News"},
            "leftWingArticle": {"article": {"title": "L", "source": "CNN"}}
        }))
        .unwrap();
        match adapt_search(labeled).unwrap() {
            SearchOutcome::Labeled { right, left } => {
                assert_eq!(right.title.as_deref(), Some("R"));
                assert_eq!(left.title.as_deref(), Some("L"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let listed: ArticleSearchPayload = serde_json::from_value(json!({
            "articles": [{"title": "A", "source": "Fox News"}, {"title": "B", "source": "CNN"}]
        }))
        .unwrap();
        assert!(matches!(adapt_search(listed).unwrap(), SearchOutcome::Unlabeled(a) if a.len() == 2));

        let single: ArticleSearchPayload = serde_json::from_value(json!({
            "articles": [{"title": "A", "source": "Fox News"}]
        }))
        .unwrap();
        assert!(matches!(adapt_search(single), Err(Error::ArticlesNotFound(_))));
    }

    #[test]
    fn test_assign_sides_by_exact_source() {
        let a = RawArticle { title: Some("A".into()), source: Some("Fox News".into()), ..Default::default() };
        let b = RawArticle { title: Some("B".into()), source: Some("CNN".into()), ..Default::default() };

        let (right, left) = assign_sides(vec![a.clone(), b.clone()], "Fox News").unwrap();
        assert_eq!(right.title.as_deref(), Some("A"));
        assert_eq!(left.title.as_deref(), Some("B"));

        let (right, left) = assign_sides(vec![a.clone(), b.clone()], "CNN").unwrap();
        assert_eq!(right.title.as_deref(), Some("B"));
        assert_eq!(left.title.as_deref(), Some("A"));

        assert!(matches!(assign_sides(vec![a.clone(), b], "fox news"), Err(Error::ArticlesNotFound(_))));
        assert!(matches!(assign_sides(vec![a.clone(), a], "Fox News"), Err(Error::ArticlesNotFound(_))));
    }

    #[test]
    fn test_normalize_article_date_fallback() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let raw = RawArticle { title: Some("A".into()), source: Some("CNN".into()), ..Default::default() };
        let article = normalize_article(raw, Side::Left, now).unwrap();
        assert_eq!(article.published_at, now);
        assert!(article.published_at_defaulted);

        let raw = RawArticle {
            title: Some("A".into()),
            source: Some("CNN".into()),
            published_at: Some("2024-05-30".into()),
            ..Default::default()
        };
        let article = normalize_article(raw, Side::Left, now).unwrap();
        assert_eq!(article.published_at, Utc.with_ymd_and_hms(2024, 5, 30, 0, 0, 0).unwrap());
        assert!(!article.published_at_defaulted);
    }

    #[test]
    fn test_normalize_article_requires_title() {
        let raw = RawArticle { title: Some("   ".into()), source: Some("CNN".into()), ..Default::default() };
        assert!(matches!(normalize_article(raw, Side::Right, Utc::now()), Err(Error::ArticlesNotFound(_))));
    }

    #[test]
    fn test_headlines_require_both_sides() {
        let payload: HeadlinesPayload = serde_json::from_value(json!({"leftLeaning": []})).unwrap();
        assert!(matches!(adapt_headlines(payload), Err(Error::MalformedResponse(_))));

        let payload: HeadlinesPayload = serde_json::from_value(json!({
            "leftLeaning": [{"headline": "X", "source": "Y", "publishedAt": "2024-05-01T10:00:00Z"}],
            "rightLeaning": []
        }))
        .unwrap();
        let (left, right) = adapt_headlines(payload).unwrap();
        assert_eq!(left[0].tone_emoji, DEFAULT_TONE_EMOJI);
        assert!(left[0].published_at.is_some());
        assert!(right.is_empty());
    }
}
