//! Analysis Session: the Idle → Loading → Result | Failed state machine for one
//! browser tab.
//!
//! Every accepted analyze mints a generation number. A completion is applied only
//! when its generation is still the latest and the session is still Loading, so a
//! response that lands after a clear (or after a newer analyze) is dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::extraction::job::ExtractedJob;
use crate::extraction::{ExtractionError, Extractor};
use crate::matching::skill_match::{match_skills, MatchResult};
use crate::profile::{SkillProfileStore, SkillSet};
use crate::session::notice::{failure_message, Notice};
use crate::session::registry::SharedSession;

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub job: Arc<ExtractedJob>,
    pub skill_match: MatchResult,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum AnalysisState {
    Idle,
    Loading { started_at: DateTime<Utc> },
    Result(AnalysisOutcome),
    Failed { message: String },
}

/// Proof that an analyze was accepted; hand it back to `complete`.
#[derive(Debug, Clone)]
pub struct AnalyzeTicket {
    generation: u64,
    description: String,
}

impl AnalyzeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeRejected {
    #[error("input is empty")]
    EmptyInput,
    #[error("an analysis is already in flight")]
    AlreadyLoading,
}

/// The browser could not read the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("clipboard access denied")]
pub struct ClipboardDenied;

#[derive(Debug)]
pub struct AnalysisSession {
    input: String,
    state: AnalysisState,
    generation: u64,
    updated_at: DateTime<Utc>,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            state: AnalysisState::Idle,
            generation: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AnalysisState::Loading { .. })
    }

    /// Whether the analyze action should be offered right now.
    pub fn can_analyze(&self) -> bool {
        !self.is_loading() && !self.input.trim().is_empty()
    }

    /// Replaces the input text. Never changes state, so a Result may sit beside
    /// text that has not been analyzed yet.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.touch();
    }

    /// Applies the outcome of a clipboard read reported by the browser.
    pub fn paste(&mut self, clipboard: Result<String, ClipboardDenied>) -> Notice {
        match clipboard {
            Ok(text) => {
                self.set_input(text);
                Notice::pasted()
            }
            Err(ClipboardDenied) => Notice::paste_unavailable(),
        }
    }

    /// Moves to Loading and returns the ticket for the request to issue.
    pub fn begin_analyze(&mut self) -> Result<AnalyzeTicket, AnalyzeRejected> {
        if self.is_loading() {
            return Err(AnalyzeRejected::AlreadyLoading);
        }
        if self.input.trim().is_empty() {
            return Err(AnalyzeRejected::EmptyInput);
        }

        self.generation += 1;
        self.state = AnalysisState::Loading {
            started_at: Utc::now(),
        };
        self.touch();

        Ok(AnalyzeTicket {
            generation: self.generation,
            description: self.input.clone(),
        })
    }

    /// Applies an extraction outcome. Returns `None` when the ticket is stale and
    /// the outcome was discarded.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<ExtractedJob, ExtractionError>,
        user_skills: &SkillSet,
    ) -> Option<Notice> {
        if generation != self.generation || !self.is_loading() {
            debug!(
                "Discarding stale extraction response (generation {generation}, current {})",
                self.generation
            );
            return None;
        }

        let notice = match outcome {
            Ok(job) => {
                let skill_match = match_skills(user_skills, &job.skills);
                self.state = AnalysisState::Result(AnalysisOutcome {
                    job: Arc::new(job),
                    skill_match,
                    analyzed_at: Utc::now(),
                });
                Notice::analysis_complete()
            }
            Err(e) => {
                warn!("Extraction failed: {e}");
                let notice = Notice::analysis_failed(&e);
                self.state = AnalysisState::Failed {
                    message: failure_message(&e),
                };
                notice
            }
        };
        self.touch();
        Some(notice)
    }

    /// Back to Idle, dropping input, job and match. Any in-flight request becomes stale.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.input.clear();
        self.state = AnalysisState::Idle;
        self.touch();
    }

    /// Fails an in-flight analysis whose request ended without an outcome. The input
    /// is kept so the user can analyze again. Stale generations are ignored.
    pub fn abandon(&mut self, generation: u64) -> Option<Notice> {
        if generation != self.generation || !self.is_loading() {
            return None;
        }
        let notice = Notice::analysis_interrupted();
        self.state = AnalysisState::Failed {
            message: notice.description.clone(),
        };
        self.touch();
        Some(notice)
    }

    /// Recomputes the match of a displayed Result against the given profile.
    pub fn refresh_match(&mut self, user_skills: &SkillSet) {
        if let AnalysisState::Result(outcome) = &mut self.state {
            let skill_match = match_skills(user_skills, &outcome.job.skills);
            if skill_match != outcome.skill_match {
                outcome.skill_match = skill_match;
                self.updated_at = Utc::now();
            }
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Async driver
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    Completed(Notice),
    Failed(Notice),
    /// Blank input; nothing was sent.
    Rejected(Notice),
    /// Another analysis is in flight; nothing was sent.
    Ignored,
    /// The response arrived after the session moved on and was dropped.
    Superseded,
}

/// Runs one analyze cycle. The session lock is released for the network call.
///
/// The request and its completion run on a detached task, so the session leaves
/// Loading even if the caller is dropped mid-flight.
pub async fn run_analysis(
    session: SharedSession,
    extractor: Arc<dyn Extractor>,
    profile: SkillProfileStore,
) -> AnalyzeOutcome {
    let ticket = {
        let mut guard = session.lock().await;
        match guard.begin_analyze() {
            Ok(ticket) => ticket,
            Err(AnalyzeRejected::EmptyInput) => {
                return AnalyzeOutcome::Rejected(Notice::empty_input())
            }
            Err(AnalyzeRejected::AlreadyLoading) => {
                debug!("Analyze ignored: request already in flight");
                return AnalyzeOutcome::Ignored;
            }
        }
    };

    let generation = ticket.generation();
    info!("Analysis started (generation {generation})");

    let task = tokio::spawn(complete_analysis(
        session.clone(),
        extractor,
        profile,
        ticket,
    ));

    match task.await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Analysis task for generation {generation} ended abnormally: {e}");
            let abandoned = session.lock().await.abandon(generation);
            match abandoned {
                Some(notice) => AnalyzeOutcome::Failed(notice),
                None => AnalyzeOutcome::Superseded,
            }
        }
    }
}

async fn complete_analysis(
    session: SharedSession,
    extractor: Arc<dyn Extractor>,
    profile: SkillProfileStore,
    ticket: AnalyzeTicket,
) -> AnalyzeOutcome {
    let result = extractor.extract(ticket.description()).await;

    // The profile is read at completion time so edits made meanwhile count.
    let user_skills = match &result {
        Ok(_) => profile.get_skills().await,
        Err(_) => SkillSet::new(),
    };
    let succeeded = result.is_ok();

    let mut guard = session.lock().await;
    match guard.complete(ticket.generation(), result, &user_skills) {
        Some(notice) if succeeded => AnalyzeOutcome::Completed(notice),
        Some(notice) => AnalyzeOutcome::Failed(notice),
        None => AnalyzeOutcome::Superseded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::storage::MemorySlot;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{Mutex, Notify};

    /// Returns a fixed job and counts calls. When gated, waits for `release`.
    struct FakeExtractor {
        calls: AtomicUsize,
        skills: Vec<String>,
        gate: Option<Arc<Notify>>,
        fail: bool,
    }

    impl FakeExtractor {
        fn returning(skills: &[&str]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                gate: None,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::returning(&[])
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Extractor for FakeExtractor {
        async fn extract(&self, _description: &str) -> Result<ExtractedJob, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(ExtractionError::Status {
                    status: 500,
                    message: "model not loaded".to_string(),
                });
            }
            Ok(ExtractedJob {
                skills: self.skills.clone(),
                ..ExtractedJob::default()
            })
        }
    }

    async fn profile_with(skills: &[&str]) -> SkillProfileStore {
        let store = SkillProfileStore::new(Arc::new(MemorySlot::new()));
        for skill in skills {
            store.add_skill(skill).await;
        }
        store
    }

    fn job(skills: &[&str]) -> ExtractedJob {
        ExtractedJob {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..ExtractedJob::default()
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = AnalysisSession::new();
        assert!(matches!(session.state(), AnalysisState::Idle));
        assert!(!session.can_analyze());
    }

    #[test]
    fn test_blank_input_is_rejected_without_state_change() {
        let mut session = AnalysisSession::new();
        session.set_input("   \n\t ");
        assert_eq!(session.begin_analyze().unwrap_err(), AnalyzeRejected::EmptyInput);
        assert!(matches!(session.state(), AnalysisState::Idle));
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_analyze_while_loading_is_rejected() {
        let mut session = AnalysisSession::new();
        session.set_input("Rust engineer");
        let first = session.begin_analyze().unwrap();
        assert_eq!(session.begin_analyze().unwrap_err(), AnalyzeRejected::AlreadyLoading);
        assert_eq!(session.generation(), first.generation());
        assert!(!session.can_analyze());
    }

    #[test]
    fn test_success_moves_to_result_with_match() {
        let mut session = AnalysisSession::new();
        session.set_input("We need Python, AWS, SQL and Docker");
        let ticket = session.begin_analyze().unwrap();

        let skills: SkillSet = ["python", "sql"].into_iter().collect();
        let notice = session
            .complete(
                ticket.generation(),
                Ok(job(&["Python", "AWS", "SQL", "Docker"])),
                &skills,
            )
            .unwrap();

        assert_eq!(notice, Notice::analysis_complete());
        match session.state() {
            AnalysisState::Result(outcome) => {
                assert_eq!(outcome.skill_match.match_percentage, 50);
                assert_eq!(outcome.skill_match.missing_skills, vec!["AWS", "Docker"]);
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_moves_to_failed_and_keeps_input() {
        let mut session = AnalysisSession::new();
        session.set_input("Staff engineer");
        let ticket = session.begin_analyze().unwrap();

        let err = ExtractionError::Status {
            status: 503,
            message: "down".to_string(),
        };
        let notice = session
            .complete(ticket.generation(), Err(err), &SkillSet::new())
            .unwrap();

        assert_eq!(notice.title, "Analysis failed");
        assert!(matches!(session.state(), AnalysisState::Failed { .. }));
        assert_eq!(session.input(), "Staff engineer");
        assert!(session.can_analyze());
    }

    #[test]
    fn test_new_analyze_discards_previous_result() {
        let mut session = AnalysisSession::new();
        session.set_input("first");
        let ticket = session.begin_analyze().unwrap();
        session.complete(ticket.generation(), Ok(job(&["Go"])), &SkillSet::new());

        session.begin_analyze().unwrap();
        assert!(session.is_loading());
    }

    #[test]
    fn test_editing_input_keeps_result() {
        let mut session = AnalysisSession::new();
        session.set_input("first posting");
        let ticket = session.begin_analyze().unwrap();
        session.complete(ticket.generation(), Ok(job(&["Go"])), &SkillSet::new());

        session.set_input("second posting, not analyzed");
        assert!(matches!(session.state(), AnalysisState::Result(_)));
    }

    #[test]
    fn test_clear_from_every_state_returns_to_idle() {
        // Idle
        let mut idle = AnalysisSession::new();
        idle.set_input("text");
        idle.clear();
        assert!(matches!(idle.state(), AnalysisState::Idle));
        assert!(idle.input().is_empty());

        // Loading
        let mut loading = AnalysisSession::new();
        loading.set_input("text");
        loading.begin_analyze().unwrap();
        loading.clear();
        assert!(matches!(loading.state(), AnalysisState::Idle));

        // Result
        let mut result = AnalysisSession::new();
        result.set_input("text");
        let t = result.begin_analyze().unwrap();
        result.complete(t.generation(), Ok(job(&["Rust"])), &SkillSet::new());
        result.clear();
        assert!(matches!(result.state(), AnalysisState::Idle));
        assert!(result.input().is_empty());

        // Failed
        let mut failed = AnalysisSession::new();
        failed.set_input("text");
        let t = failed.begin_analyze().unwrap();
        failed.complete(
            t.generation(),
            Err(ExtractionError::Status {
                status: 500,
                message: String::new(),
            }),
            &SkillSet::new(),
        );
        failed.clear();
        assert!(matches!(failed.state(), AnalysisState::Idle));
    }

    #[test]
    fn test_response_after_clear_is_discarded() {
        let mut session = AnalysisSession::new();
        session.set_input("text");
        let ticket = session.begin_analyze().unwrap();
        session.clear();

        let applied = session.complete(ticket.generation(), Ok(job(&["Rust"])), &SkillSet::new());
        assert!(applied.is_none());
        assert!(matches!(session.state(), AnalysisState::Idle));
    }

    #[test]
    fn test_only_latest_generation_applies() {
        let mut session = AnalysisSession::new();
        session.set_input("text");
        let stale = session.begin_analyze().unwrap();
        session.clear();
        session.set_input("newer text");
        let fresh = session.begin_analyze().unwrap();

        assert!(session
            .complete(stale.generation(), Ok(job(&["Old"])), &SkillSet::new())
            .is_none());
        assert!(session.is_loading());

        assert!(session
            .complete(fresh.generation(), Ok(job(&["New"])), &SkillSet::new())
            .is_some());
        match session.state() {
            AnalysisState::Result(outcome) => assert_eq!(outcome.job.skills, vec!["New"]),
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn test_refresh_match_follows_profile() {
        let mut session = AnalysisSession::new();
        session.set_input("text");
        let t = session.begin_analyze().unwrap();
        session.complete(t.generation(), Ok(job(&["Rust", "Go"])), &SkillSet::new());

        let profile: SkillSet = ["rust"].into_iter().collect();
        session.refresh_match(&profile);

        match session.state() {
            AnalysisState::Result(outcome) => assert_eq!(outcome.skill_match.match_percentage, 50),
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[test]
    fn test_paste_replaces_input_or_reports_denial() {
        let mut session = AnalysisSession::new();
        session.set_input("old");

        assert_eq!(session.paste(Err(ClipboardDenied)), Notice::paste_unavailable());
        assert_eq!(session.input(), "old");

        assert_eq!(session.paste(Ok("new".to_string())), Notice::pasted());
        assert_eq!(session.input(), "new");
        assert!(matches!(session.state(), AnalysisState::Idle));
    }

    /// Panics mid-request, standing in for a task that dies without an outcome.
    struct PanickingExtractor;

    #[async_trait]
    impl Extractor for PanickingExtractor {
        async fn extract(&self, _description: &str) -> Result<ExtractedJob, ExtractionError> {
            panic!("extractor crashed");
        }
    }

    async fn shared_session(input: &str) -> SharedSession {
        let session = Arc::new(Mutex::new(AnalysisSession::new()));
        session.lock().await.set_input(input);
        session
    }

    async fn wait_for_call(extractor: &FakeExtractor) {
        while extractor.calls() == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_abandon_fails_loading_and_keeps_input() {
        let mut session = AnalysisSession::new();
        session.set_input("Platform engineer");
        let ticket = session.begin_analyze().unwrap();

        let notice = session.abandon(ticket.generation()).unwrap();

        assert_eq!(notice, Notice::analysis_interrupted());
        assert!(matches!(session.state(), AnalysisState::Failed { .. }));
        assert_eq!(session.input(), "Platform engineer");
        assert!(session.can_analyze());
    }

    #[test]
    fn test_abandon_ignores_stale_generation() {
        let mut session = AnalysisSession::new();
        session.set_input("text");
        let stale = session.begin_analyze().unwrap();
        session.clear();

        assert!(session.abandon(stale.generation()).is_none());
        assert!(matches!(session.state(), AnalysisState::Idle));
    }

    #[tokio::test]
    async fn test_run_analysis_blank_input_makes_no_call() {
        let session = shared_session("    ").await;
        let extractor = Arc::new(FakeExtractor::returning(&["Rust"]));
        let profile = profile_with(&[]).await;

        let outcome = run_analysis(session.clone(), extractor.clone(), profile).await;

        assert_eq!(outcome, AnalyzeOutcome::Rejected(Notice::empty_input()));
        assert_eq!(extractor.calls(), 0);
        let guard = session.lock().await;
        assert!(matches!(guard.state(), AnalysisState::Idle));
    }

    #[tokio::test]
    async fn test_run_analysis_reads_profile_at_completion() {
        let session = shared_session("Python, AWS, SQL, Docker").await;
        let extractor = Arc::new(FakeExtractor::returning(&["Python", "AWS", "SQL", "Docker"]));
        let profile = profile_with(&["python", "sql"]).await;

        let outcome = run_analysis(session.clone(), extractor, profile).await;

        assert_eq!(outcome, AnalyzeOutcome::Completed(Notice::analysis_complete()));
        let guard = session.lock().await;
        match guard.state() {
            AnalysisState::Result(outcome) => {
                assert_eq!(outcome.skill_match.matched_skills, vec!["Python", "SQL"]);
            }
            other => panic!("expected Result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_analysis_failure_goes_to_failed() {
        let session = shared_session("anything").await;
        let extractor = Arc::new(FakeExtractor::failing());
        let profile = profile_with(&[]).await;

        let outcome = run_analysis(session.clone(), extractor, profile).await;

        assert!(matches!(outcome, AnalyzeOutcome::Failed(_)));
        let guard = session.lock().await;
        assert!(matches!(guard.state(), AnalysisState::Failed { .. }));
        assert_eq!(guard.input(), "anything");
    }

    #[tokio::test]
    async fn test_second_analyze_while_loading_is_ignored() {
        let session = shared_session("Rust engineer").await;
        let gate = Arc::new(Notify::new());
        let extractor = Arc::new(FakeExtractor::returning(&["Rust"]).gated(gate.clone()));
        let profile = profile_with(&["rust"]).await;

        let first = tokio::spawn(run_analysis(
            session.clone(),
            extractor.clone(),
            profile.clone(),
        ));
        wait_for_call(&extractor).await;
        assert!(session.lock().await.is_loading());

        let second = run_analysis(session.clone(), extractor.clone(), profile).await;
        assert_eq!(second, AnalyzeOutcome::Ignored);
        assert_eq!(extractor.calls(), 1);
        assert!(session.lock().await.is_loading());

        gate.notify_one();
        let first = first.await.unwrap();
        assert!(matches!(first, AnalyzeOutcome::Completed(_)));
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_clear_during_flight_supersedes_response() {
        let session = shared_session("Go developer").await;
        let gate = Arc::new(Notify::new());
        let extractor = Arc::new(FakeExtractor::returning(&["Go"]).gated(gate.clone()));
        let profile = profile_with(&[]).await;

        let in_flight = tokio::spawn(run_analysis(session.clone(), extractor.clone(), profile));
        wait_for_call(&extractor).await;
        session.lock().await.clear();
        gate.notify_one();

        assert_eq!(in_flight.await.unwrap(), AnalyzeOutcome::Superseded);
        let guard = session.lock().await;
        assert!(matches!(guard.state(), AnalysisState::Idle));
    }

    #[tokio::test]
    async fn test_dropped_caller_still_completes_session() {
        let session = shared_session("Rust engineer").await;
        let gate = Arc::new(Notify::new());
        let extractor = Arc::new(FakeExtractor::returning(&["Rust"]).gated(gate.clone()));
        let profile = profile_with(&["rust"]).await;

        let caller = tokio::spawn(run_analysis(
            session.clone(),
            extractor.clone(),
            profile.clone(),
        ));
        wait_for_call(&extractor).await;
        caller.abort();
        assert!(caller.await.unwrap_err().is_cancelled());

        // The request outlives its caller and still settles the session.
        gate.notify_one();
        while session.lock().await.is_loading() {
            tokio::task::yield_now().await;
        }
        {
            let guard = session.lock().await;
            assert!(matches!(guard.state(), AnalysisState::Result(_)));
            assert_eq!(guard.input(), "Rust engineer");
        }

        let retry = Arc::new(FakeExtractor::returning(&["Rust"]));
        let outcome = run_analysis(session.clone(), retry.clone(), profile).await;
        assert!(matches!(outcome, AnalyzeOutcome::Completed(_)));
        assert_eq!(retry.calls(), 1);
    }

    #[tokio::test]
    async fn test_crashed_request_fails_session_and_allows_retry() {
        let session = shared_session("Data engineer").await;
        let profile = profile_with(&[]).await;

        let outcome =
            run_analysis(session.clone(), Arc::new(PanickingExtractor), profile.clone()).await;

        assert_eq!(outcome, AnalyzeOutcome::Failed(Notice::analysis_interrupted()));
        {
            let guard = session.lock().await;
            assert!(matches!(guard.state(), AnalysisState::Failed { .. }));
            assert_eq!(guard.input(), "Data engineer");
        }

        let retry = Arc::new(FakeExtractor::returning(&["SQL"]));
        let outcome = run_analysis(session.clone(), retry.clone(), profile).await;
        assert!(matches!(outcome, AnalyzeOutcome::Completed(_)));
        assert_eq!(retry.calls(), 1);
    }
}
