use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spin_core::logging::Logger;
use spin_core::{
    AnalysisInput, AnalysisResult, ArticleRef, CompletionModel, CompletionRequest, Error, HeadlineSet,
    RequestPurpose, Result, Side, TopicHeadline,
};
use crate::adapters::{self, ArticleAnalysisPayload, ArticleSearchPayload, DirectAnalysisPayload, HeadlinesPayload,
    RawArticle, SearchOutcome, SourceClassificationPayload};
use crate::extract::extract_as;
use crate::prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One structured request built from the headline itself.
    Direct,
    /// Grounded search for a right and a left article, then analysis of both.
    SearchAndClassify,
}

impl Strategy {
    /// Headlines carry enough context for a direct analysis, free topics do not.
    pub fn default_for(input: &AnalysisInput) -> Self {
        match input {
            AnalysisInput::Headline(_) => Strategy::Direct,
            AnalysisInput::Topic(_) => Strategy::SearchAndClassify,
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Strategy::Direct),
            "search" | "search-and-classify" => Ok(Strategy::SearchAndClassify),
            other => Err(format!("Unknown strategy: {} (expected direct or search)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub request_timeout: Duration,
    pub headlines_per_side: usize,
    pub latest_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
            headlines_per_side: 5,
            latest_count: 2,
        }
    }
}

/// Runs headline discovery and story analysis against a completion model.
///
/// Each operation is a strict sequence of typed steps; a failing step aborts
/// the operation with a classified error and nothing is retried here.
pub struct AnalysisPipeline {
    model: Arc<dyn CompletionModel>,
    config: PipelineConfig,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("model", &self.model.name())
            .field("config", &self.config)
            .finish()
    }
}

impl AnalysisPipeline {
    pub fn new(model: Arc<dyn CompletionModel>, config: PipelineConfig) -> Self {
        Self { model, config }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    async fn request(&self, logger: &Logger, request: CompletionRequest) -> Result<String> {
        let purpose = request.purpose;
        logger.debug(&format!("➡️ {} request ({} chars)", purpose, request.prompt.len()));
        let text = tokio::time::timeout(self.config.request_timeout, self.model.complete(request))
            .await
            .map_err(|_| Error::RequestTimeout(self.config.request_timeout))??;
        if text.trim().is_empty() {
            return Err(Error::MalformedResponse(format!("empty {} response", purpose)));
        }
        logger.debug(&format!("⬅️ {} response ({} chars)", purpose, text.len()));
        Ok(text)
    }

    pub async fn discover_headlines(&self) -> Result<HeadlineSet> {
        let logger = Logger::new().with_prefix("[headlines]");
        logger.info("🗞️ Fetching headlines");

        let result = self.fetch_headlines(&logger).await;
        match result {
            Ok(set) => {
                logger.info(&format!(
                    "✨ {} latest, {} left, {} right",
                    set.latest.len(),
                    set.left_leaning.len(),
                    set.right_leaning.len()
                ));
                Ok(set)
            }
            Err(e) => {
                logger.error(&format!("❌ Headline fetch failed: {}", e));
                Err(e.into_headlines_error())
            }
        }
    }

    async fn fetch_headlines(&self, logger: &Logger) -> Result<HeadlineSet> {
        let request = CompletionRequest::structured(
            RequestPurpose::Headlines,
            prompts::headlines_prompt(self.config.headlines_per_side),
            prompts::headlines_schema(),
        );
        let text = self.request(logger, request).await?;
        let payload: HeadlinesPayload = extract_as(&text)?;
        let (left, right) = adapters::adapt_headlines(payload)?;
        Ok(HeadlineSet::with_latest(left, right, self.config.latest_count))
    }

    /// Analyzes a headline or free topic with the default strategy for it.
    pub async fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisResult> {
        self.analyze_with(input, Strategy::default_for(input)).await
    }

    pub async fn analyze_with(&self, input: &AnalysisInput, strategy: Strategy) -> Result<AnalysisResult> {
        let logger = Logger::new().with_prefix(match strategy {
            Strategy::Direct => "[direct]",
            Strategy::SearchAndClassify => "[search]",
        });
        logger.info(&format!("🔎 Analyzing \"{}\"", input.text()));

        let result = match strategy {
            Strategy::Direct => self.analyze_direct(&logger, input).await,
            Strategy::SearchAndClassify => self.search_and_classify(&logger, input.text()).await,
        };

        match result {
            Ok(analysis) => {
                logger.info(&format!(
                    "✅ Analysis ready: {} perspective(s), spectrum {:+.1}",
                    analysis.perspectives.len(),
                    analysis.spectrum.score
                ));
                Ok(analysis)
            }
            Err(e) => {
                let e = e.into_analysis_error(self.config.request_timeout);
                logger.error(&format!("❌ Analysis failed: {}", e));
                Err(e)
            }
        }
    }

    async fn analyze_direct(&self, logger: &Logger, input: &AnalysisInput) -> Result<AnalysisResult> {
        let topic = match input {
            AnalysisInput::Headline(h) => TopicHeadline {
                text: h.text.clone(),
                source: Some(h.source.clone()),
                url: h.url.clone(),
                published_at: h.published_at,
            },
            AnalysisInput::Topic(text) => TopicHeadline {
                text: text.clone(),
                source: None,
                url: None,
                published_at: None,
            },
        };

        let request = CompletionRequest::structured(
            RequestPurpose::DirectAnalysis,
            prompts::direct_analysis_prompt(&topic),
            prompts::direct_analysis_schema(),
        );
        let text = self.request(logger, request).await?;
        let payload: DirectAnalysisPayload = extract_as(&text)?;
        adapters::adapt_direct(payload, topic)
    }

    async fn search_and_classify(&self, logger: &Logger, topic: &str) -> Result<AnalysisResult> {
        let now = Utc::now();

        let outcome = self.search_articles(&logger.clone().with_prefix("[1/3 search]"), topic).await?;
        let (right, left) = match outcome {
            SearchOutcome::Labeled { right, left } => (right, left),
            SearchOutcome::Unlabeled(articles) => {
                self.classify_sides(&logger.clone().with_prefix("[2/3 classify]"), articles).await?
            }
        };

        let right = adapters::normalize_article(right, Side::Right, now)?;
        let left = adapters::normalize_article(left, Side::Left, now)?;

        self.describe_articles(&logger.clone().with_prefix("[3/3 describe]"), topic, right, left).await
    }

    async fn search_articles(&self, logger: &Logger, topic: &str) -> Result<SearchOutcome> {
        let request = CompletionRequest::grounded(RequestPurpose::ArticleSearch, prompts::article_search_prompt(topic));
        let text = self.request(logger, request).await?;
        let payload: ArticleSearchPayload = extract_as(&text)?;
        let outcome = adapters::adapt_search(payload)?;
        if let SearchOutcome::Unlabeled(articles) = &outcome {
            logger.info(&format!("🧭 {} unlabeled articles, asking for side assignment", articles.len()));
        }
        Ok(outcome)
    }

    async fn classify_sides(&self, logger: &Logger, articles: Vec<RawArticle>) -> Result<(RawArticle, RawArticle)> {
        let source_of = |i: usize| {
            articles
                .get(i)
                .and_then(|a| a.source.clone())
                .ok_or_else(|| Error::ArticlesNotFound(format!("article {} has no source to classify", i + 1)))
        };
        let first = source_of(0)?;
        let second = source_of(1)?;

        let request = CompletionRequest::structured(
            RequestPurpose::SourceClassification,
            prompts::source_classification_prompt(&first, &second),
            prompts::source_classification_schema(),
        );
        let text = self.request(logger, request).await?;
        let payload: SourceClassificationPayload = extract_as(&text)?;
        let right_source = payload
            .right_wing_article_source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MalformedResponse("classification named no source".to_string()))?;

        logger.info(&format!("🏷️ Right-leaning source: {}", right_source));
        adapters::assign_sides(articles, &right_source)
    }

    async fn describe_articles(
        &self,
        logger: &Logger,
        topic: &str,
        right: ArticleRef,
        left: ArticleRef,
    ) -> Result<AnalysisResult> {
        let request = CompletionRequest::structured(
            RequestPurpose::ArticleAnalysis,
            prompts::article_analysis_prompt(topic, &right, &left),
            prompts::article_analysis_schema(),
        );
        let text = self.request(logger, request).await?;
        let payload: ArticleAnalysisPayload = extract_as(&text)?;
        adapters::adapt_article_analysis_result(payload, right, left)
    }
}
