use spin_core::{AnalysisResult, Headline, HeadlineSet, SectionId};
use spin_narration::build_queue;

fn headline_line(index: usize, headline: &Headline) -> String {
    let when = headline
        .published_at
        .map(|at| format!(" ({})", at.format("%Y-%m-%d %H:%M")))
        .unwrap_or_default();
    format!("{:>3}. {} {} [{}]{}", index, headline.tone_emoji, headline.text, headline.source, when)
}

/// Numbered in the same order as `HeadlineSet::iter`, so `analyze --headline N`
/// picks what was shown.
pub fn headlines(set: &HeadlineSet) -> String {
    let mut out = String::new();
    let mut index = 0;
    for (title, group) in [("Latest", &set.latest), ("Left-leaning", &set.left_leaning), ("Right-leaning", &set.right_leaning)] {
        out.push_str(&format!("\n{}\n", title));
        if group.is_empty() {
            out.push_str("    (none)\n");
        }
        for headline in group {
            out.push_str(&headline_line(index, headline));
            out.push('\n');
            index += 1;
        }
    }
    out
}

/// Renders an analysis as the narration would read it, one block per section.
pub fn analysis(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let mut section: Option<SectionId> = None;
    for unit in build_queue(result) {
        if section != Some(unit.section_id) {
            out.push_str(&format!("\n[{}]\n", unit.section_id));
            section = Some(unit.section_id);
        }
        out.push_str("  ");
        out.push_str(&unit.text);
        out.push('\n');
    }
    out
}
