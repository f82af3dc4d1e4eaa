use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use serde::Serialize;
use spin_core::{AnalysisResult, SectionId, Voice};
use spin_inference::{AnalysisPipeline, HeadlineFeed};
use spin_narration::{NarrationHandle, NarrationSnapshot, SpeechState};

/// What the page shows outside of speech.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub loading: bool,
    pub loading_message: Option<String>,
    pub analysis_error: Option<String>,
    pub headlines_error: Option<String>,
    pub analysis: Option<AnalysisResult>,
}

/// The observable state served by `GET /api/state`.
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub loading: bool,
    pub loading_message: Option<String>,
    pub analysis_error: Option<String>,
    pub headlines_error: Option<String>,
    pub has_analysis: bool,
    pub speech_state: SpeechState,
    pub active_section_id: Option<SectionId>,
    pub narration_error: Option<String>,
    pub narration_available: bool,
    pub voices: Vec<Voice>,
    pub selected_voice_id: Option<String>,
}

/// A claim on the result slot. Only the newest ticket may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub narration: Option<NarrationHandle>,
    pub feed: Option<HeadlineFeed>,
    view: Mutex<ViewModel>,
    generation: AtomicU64,
}

impl AppState {
    pub fn new(pipeline: Arc<AnalysisPipeline>, narration: Option<NarrationHandle>) -> Self {
        Self { pipeline, narration, feed: None, view: Mutex::new(ViewModel::default()), generation: AtomicU64::new(0) }
    }

    pub fn with_feed(mut self, feed: HeadlineFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn view(&self) -> MutexGuard<'_, ViewModel> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Invalidates every outstanding ticket and hands out a new one.
    pub fn next_ticket(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidates every outstanding ticket.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Marks the view as loading for `ticket`, unless it was superseded.
    /// The ticket is checked under the view lock, so a navigation that
    /// already cleared the view is never overwritten.
    pub fn begin_analysis(&self, ticket: Ticket, message: String) -> bool {
        let mut view = self.view();
        if !self.is_current(ticket) {
            return false;
        }
        view.loading = true;
        view.loading_message = Some(message);
        view.analysis_error = None;
        view.analysis = None;
        true
    }

    pub fn narration_snapshot(&self) -> Option<NarrationSnapshot> {
        self.narration.as_ref().map(|n| n.snapshot())
    }

    pub fn state_view(&self) -> StateView {
        let view = self.view().clone();
        let narration = self.narration_snapshot();
        StateView {
            loading: view.loading,
            loading_message: view.loading_message,
            analysis_error: view.analysis_error,
            headlines_error: view.headlines_error,
            has_analysis: view.analysis.is_some(),
            speech_state: narration.as_ref().map_or(SpeechState::Stopped, |n| n.state),
            active_section_id: narration.as_ref().and_then(|n| n.active_section),
            narration_error: narration.as_ref().and_then(|n| n.last_error.clone()),
            narration_available: narration.is_some(),
            voices: narration.as_ref().map(|n| n.voices.clone()).unwrap_or_default(),
            selected_voice_id: narration.and_then(|n| n.preferred_voice),
        }
    }
}
