use std::fmt;
use serde_json::json;
use spin_core::{CompletionModel, CompletionRequest, RequestPurpose, Result};

/// Offline model answering every step with canned content, in the shapes a
/// real service produces (the search step wraps its JSON in prose and returns
/// an unlabeled list so the classification step runs too).
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CompletionModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = match request.purpose {
            RequestPurpose::Headlines => json!({
                "leftLeaning": [
                    {"headline": "City council expands transit subsidies", "source": "The Guardian", "toneEmoji": "🚌", "publishedAt": "2024-05-01T09:00:00Z"},
                    {"headline": "Teachers rally for higher pay", "source": "MSNBC", "toneEmoji": "✊", "publishedAt": "2024-05-01T07:30:00Z"},
                    {"headline": "New climate targets announced", "source": "CNN", "toneEmoji": "🌍"}
                ],
                "rightLeaning": [
                    {"headline": "Small businesses push back on new tax", "source": "Fox News", "toneEmoji": "💼", "publishedAt": "2024-05-01T08:45:00Z"},
                    {"headline": "Border bill stalls in committee", "source": "The Daily Wire", "toneEmoji": "🛑", "publishedAt": "2024-04-30T22:10:00Z"}
                ]
            })
            .to_string(),
            RequestPurpose::DirectAnalysis => json!({
                "category": "Politics",
                "popularity": {"score": 6, "justification": "Covered by several national outlets."},
                "wasEdited": {"status": false, "reasoning": "The headline matches the earliest archived copy."},
                "rightWing": {
                    "summary": "The measure is framed as government overreach. Costs fall on taxpayers!",
                    "talkingPoints": ["Spending is out of control", "Local businesses pay the price"]
                },
                "leftWing": {
                    "summary": "The measure is framed as overdue public investment.",
                    "talkingPoints": ["Working families benefit", "Public services need funding"]
                },
                "socialist": {
                    "summary": "The measure is seen as a modest step that leaves ownership untouched.",
                    "talkingPoints": ["Public ownership over subsidies"]
                },
                "spectrumScore": -1.5,
                "spectrumJustification": "Coverage leans slightly left overall."
            })
            .to_string(),
            RequestPurpose::ArticleSearch => format!(
                "I found two articles covering this story.\n```json\n{}\n```\nBoth were published this week.",
                json!({
                    "articles": [
                        {"title": "Tax plan sparks outrage among owners", "source": "Fox News", "url": "https://www.foxnews.com/politics/tax-plan"},
                        {"title": "Tax plan targets the wealthiest", "source": "CNN", "url": "https://www.cnn.com/politics/tax-plan", "publishedAt": "2024-05-01"}
                    ]
                })
            ),
            RequestPurpose::SourceClassification => json!({"rightWingArticleSource": "Fox News"}).to_string(),
            RequestPurpose::ArticleAnalysis => json!({
                "rightWingArticle": {
                    "summary": "Owners say the plan will cost jobs.",
                    "spinAnalysis": "Emphasizes anecdotes from business owners."
                },
                "leftWingArticle": {
                    "summary": "The plan raises rates on top earners only.",
                    "portrayalOfRight": "Portrays opponents as defending the rich."
                },
                "leftistTalkingPoints": ["The wealthy should pay their share"],
                "socialistTalkingPoints": ["Tax capital, not labour"],
                "spectrumScore": 0.5,
                "spectrumJustification": "Balanced between the two outlets."
            })
            .to_string(),
        };
        Ok(body)
    }
}
