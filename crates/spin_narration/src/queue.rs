use spin_core::{AnalysisResult, ArticleAnalysis, NarrationUnit, PerspectiveKind, SectionId, Side, Subject};

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

/// Splits prose after every run of `.`, `!` or `?`, keeping the punctuation.
///
/// This is a plain character tokenizer, not a sentence boundary detector:
/// abbreviations, decimals and quoted punctuation split like any other
/// terminator.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if is_terminator(c) {
            while let Some(&next) = chars.peek() {
                if !is_terminator(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

struct QueueBuilder {
    units: Vec<NarrationUnit>,
}

impl QueueBuilder {
    fn line(&mut self, section_id: SectionId, text: impl Into<String>) {
        let text = text.into();
        let text = text.trim();
        if !text.is_empty() {
            self.units.push(NarrationUnit { section_id, text: text.to_string() });
        }
    }

    fn prose(&mut self, section_id: SectionId, text: &str) {
        for sentence in split_sentences(text) {
            self.line(section_id, sentence);
        }
    }

    fn points(&mut self, section_id: SectionId, points: &[String]) {
        if points.iter().all(|p| p.trim().is_empty()) {
            return;
        }
        self.line(section_id, "Key talking points.");
        for point in points {
            self.line(section_id, point.as_str());
        }
    }

    fn article(&mut self, analysis: &ArticleAnalysis) {
        let section = SectionId::Article(analysis.side);
        let (lean, framing_lead) = match analysis.side {
            Side::Right => ("Right-leaning", "Spin analysis."),
            Side::Left => ("Left-leaning", "Portrayal of the right."),
        };
        self.line(
            section,
            format!("{} coverage from {}: {}.", lean, analysis.article.source, analysis.article.title.trim_end_matches('.')),
        );
        self.prose(section, &analysis.summary);
        if !analysis.framing.trim().is_empty() {
            self.line(section, framing_lead);
            self.prose(section, &analysis.framing);
        }
    }
}

/// Decomposes an analysis into speakable units, in this fixed order:
///
/// 1. header (topic headline, or the two outlets being compared)
/// 2. metadata (category, popularity, edit status) when classified
/// 3. the right-leaning then the left-leaning article, when searched
/// 4. right-wing, left-wing and socialist perspectives that are present:
///    intro, summary sentences, talking point lead-in, one unit per point
/// 5. spectrum score and justification
pub fn build_queue(result: &AnalysisResult) -> Vec<NarrationUnit> {
    let mut builder = QueueBuilder { units: Vec::new() };

    match &result.subject {
        Subject::Topic(topic) => {
            builder.line(SectionId::Header, format!("Analysis of: {}", topic.text));
            if let Some(source) = &topic.source {
                builder.line(SectionId::Header, format!("Reported by {}.", source));
            }
        }
        Subject::Articles { right, left } => {
            builder.line(
                SectionId::Header,
                format!("Comparing coverage from {} and {}.", right.article.source, left.article.source),
            );
        }
    }

    if let Some(classification) = &result.classification {
        let section = SectionId::Metadata;
        builder.line(section, format!("Category: {}.", classification.category));
        builder.line(section, format!("Popularity: {} out of 10.", classification.popularity.score));
        builder.prose(section, &classification.popularity.justification);
        builder.line(
            section,
            if classification.was_edited.status {
                "The headline appears to have been edited."
            } else {
                "The headline does not appear to have been edited."
            },
        );
        builder.prose(section, &classification.was_edited.reasoning);
    }

    if let Subject::Articles { right, left } = &result.subject {
        builder.article(right);
        builder.article(left);
    }

    for kind in PerspectiveKind::ALL {
        let Some(perspective) = result.perspective(kind) else { continue };
        let section = SectionId::Perspective(kind);
        builder.line(section, format!("The {} perspective.", kind.label()));
        if let Some(summary) = &perspective.summary {
            builder.prose(section, summary);
        }
        builder.points(section, &perspective.talking_points);
    }

    builder.line(
        SectionId::Spectrum,
        format!("Spectrum score: {} on a scale from minus 10 to 10.", format_score(result.spectrum.score)),
    );
    builder.prose(SectionId::Spectrum, &result.spectrum.justification);

    builder.units
}

fn format_score(score: f32) -> String {
    let rounded = (score * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i32)
    } else {
        format!("{:.1}", rounded)
    }
}
