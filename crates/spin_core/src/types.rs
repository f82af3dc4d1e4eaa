use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Version of the canonical `AnalysisResult` layout.
pub const ANALYSIS_SCHEMA_VERSION: u32 = 1;

pub const SPECTRUM_MIN: f32 = -10.0;
pub const SPECTRUM_MAX: f32 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub text: String,
    pub source: String,
    pub tone_emoji: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSet {
    pub latest: Vec<Headline>,
    pub left_leaning: Vec<Headline>,
    pub right_leaning: Vec<Headline>,
}

impl HeadlineSet {
    /// Builds a set, moving the `latest_count` most recently published
    /// headlines (pooled across both sides) into `latest`.
    ///
    /// Headlines without a publish date never qualify. Ties keep input order,
    /// left side first. Removal from the side lists is by text equality, so a
    /// duplicate of a latest headline on the other side disappears too.
    pub fn with_latest(left: Vec<Headline>, right: Vec<Headline>, latest_count: usize) -> Self {
        let mut dated: Vec<&Headline> = left
            .iter()
            .chain(right.iter())
            .filter(|h| h.published_at.is_some())
            .collect();
        dated.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let mut latest: Vec<Headline> = Vec::with_capacity(latest_count);
        for headline in dated {
            if latest.len() == latest_count {
                break;
            }
            if !latest.iter().any(|l| l.text == headline.text) {
                latest.push(headline.clone());
            }
        }

        let is_latest = |h: &Headline| latest.iter().any(|l| l.text == h.text);
        let left_leaning = left.into_iter().filter(|h| !is_latest(h)).collect();
        let right_leaning = right.into_iter().filter(|h| !is_latest(h)).collect();

        Self { latest, left_leaning, right_leaning }
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty() && self.left_leaning.is_empty() && self.right_leaning.is_empty()
    }

    pub fn len(&self) -> usize {
        self.latest.len() + self.left_leaning.len() + self.right_leaning.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Headline> {
        self.latest.iter().chain(self.left_leaning.iter()).chain(self.right_leaning.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Right,
    Left,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Right => write!(f, "right"),
            Side::Left => write!(f, "left"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub title: String,
    pub url: Option<String>,
    pub source: String,
    pub published_at: DateTime<Utc>,
    /// Set when the service gave no usable date and the request time was used.
    pub published_at_defaulted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleAnalysis {
    pub side: Side,
    pub article: ArticleRef,
    pub summary: String,
    /// Spin analysis for the right-leaning article, portrayal of the right
    /// for the left-leaning one.
    pub framing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicHeadline {
    pub text: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Popularity {
    pub score: u8,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditStatus {
    pub status: bool,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub popularity: Popularity,
    pub was_edited: EditStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerspectiveKind {
    RightWing,
    LeftWing,
    Socialist,
}

impl PerspectiveKind {
    pub const ALL: [PerspectiveKind; 3] =
        [PerspectiveKind::RightWing, PerspectiveKind::LeftWing, PerspectiveKind::Socialist];

    pub fn label(&self) -> &'static str {
        match self {
            PerspectiveKind::RightWing => "right-wing",
            PerspectiveKind::LeftWing => "left-wing",
            PerspectiveKind::Socialist => "socialist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    pub kind: PerspectiveKind,
    pub summary: Option<String>,
    pub talking_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub score: f32,
    pub justification: String,
}

impl Spectrum {
    /// Clamps `score` into the spectrum range. The flag reports whether the
    /// raw value had to be adjusted.
    pub fn clamped(score: f32, justification: String) -> (Self, bool) {
        let adjusted = if score.is_nan() { 0.0 } else { score.clamp(SPECTRUM_MIN, SPECTRUM_MAX) };
        let changed = adjusted != score;
        (Self { score: adjusted, justification }, changed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    Topic(TopicHeadline),
    Articles { right: ArticleAnalysis, left: ArticleAnalysis },
}

/// The single canonical analysis shape every response variant is adapted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub schema_version: u32,
    pub subject: Subject,
    pub classification: Option<Classification>,
    pub perspectives: Vec<Perspective>,
    pub spectrum: Spectrum,
}

impl AnalysisResult {
    pub fn perspective(&self, kind: PerspectiveKind) -> Option<&Perspective> {
        self.perspectives.iter().find(|p| p.kind == kind)
    }

    /// Short label used in logs and list views.
    pub fn title(&self) -> &str {
        match &self.subject {
            Subject::Topic(topic) => &topic.text,
            Subject::Articles { right, .. } => &right.article.title,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnalysisInput {
    Headline(Headline),
    Topic(String),
}

impl AnalysisInput {
    pub fn text(&self) -> &str {
        match self {
            AnalysisInput::Headline(h) => &h.text,
            AnalysisInput::Topic(t) => t,
        }
    }
}

/// Identifies the UI card a narration unit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    Header,
    Metadata,
    Article(Side),
    Perspective(PerspectiveKind),
    Spectrum,
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionId::Header => write!(f, "header"),
            SectionId::Metadata => write!(f, "metadata"),
            SectionId::Article(side) => write!(f, "article-{}", side),
            SectionId::Perspective(kind) => write!(f, "perspective-{}", kind.label()),
            SectionId::Spectrum => write!(f, "spectrum"),
        }
    }
}

impl Serialize for SectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrationUnit {
    pub section_id: SectionId,
    pub text: String,
}
