//! Score orchestration.
//!
//! `ScoreOrchestrator` is the single owner of the current input and of the
//! published score. Every submission bumps the request epoch and spawns one
//! scoring task tagged with it; a task's outcome is applied only while its
//! epoch is still current, so the published score always belongs to the
//! latest submission regardless of response arrival order.
//!
//! Input, epoch and the in-flight handle share one mutex that is never held
//! across an await. View updates go out through a `watch` channel while that
//! mutex is held, so observers see them in epoch order.

pub mod handlers;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::graph::{build_trust_graph, TrustGraph};
use crate::models::profile::Profile;
use crate::models::resume::Resume;
use crate::models::score::ScoreResult;
use crate::scoring_client::{ScoreError, ScorePayload, ScoringClient, GENERIC_SCORE_FAILURE};

/// The input currently driving the score. A new submission of either kind
/// replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurrentInput {
    Resume(Resume),
    Profile(Profile),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum ScoreState {
    /// No score to show: nothing submitted, nothing scorable, or the last
    /// request failed.
    #[default]
    Empty,
    Loading,
    Ready(ScoreResult),
}

impl ScoreState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ScoreState::Loading)
    }
}

/// What observers see: the state for `epoch`, plus a user-facing message when
/// that epoch's request failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreView {
    pub epoch: u64,
    pub state: ScoreState,
    pub error: Option<String>,
}

/// Chooses the scoring payload for `input`.
///
/// A resume is scored by its flags joined with single spaces; a profile is
/// scored by its serialized form. A resume whose joined flags are empty has
/// nothing to score.
pub fn build_payload(input: &CurrentInput) -> Option<ScorePayload> {
    match input {
        CurrentInput::Resume(resume) => {
            let text = resume.flags.join(" ");
            (!text.is_empty()).then_some(ScorePayload::ResumeText(text))
        }
        CurrentInput::Profile(profile) => Some(ScorePayload::ProfileData(profile.clone())),
    }
}

#[derive(Default)]
struct Inner {
    epoch: u64,
    current: Option<CurrentInput>,
    in_flight: Option<JoinHandle<()>>,
}

struct Shared {
    client: Arc<dyn ScoringClient>,
    abort_superseded: bool,
    inner: Mutex<Inner>,
    view: watch::Sender<ScoreView>,
}

#[derive(Clone)]
pub struct ScoreOrchestrator {
    shared: Arc<Shared>,
}

impl ScoreOrchestrator {
    /// `abort_superseded` additionally aborts the previous in-flight request on
    /// each submission. Ordering never depends on it.
    pub fn new(client: Arc<dyn ScoringClient>, abort_superseded: bool) -> Self {
        let (view, _) = watch::channel(ScoreView::default());
        Self {
            shared: Arc::new(Shared {
                client,
                abort_superseded,
                inner: Mutex::new(Inner::default()),
                view,
            }),
        }
    }

    /// Makes `resume` the current input and starts scoring it. Returns the new epoch.
    /// Must be called from within a tokio runtime.
    pub fn submit_resume(&self, resume: Resume) -> u64 {
        self.submit(CurrentInput::Resume(resume))
    }

    /// Makes `profile` the current input and starts scoring it. Returns the new epoch.
    /// Must be called from within a tokio runtime.
    pub fn submit_profile(&self, profile: Profile) -> u64 {
        self.submit(CurrentInput::Profile(profile))
    }

    fn submit(&self, input: CurrentInput) -> u64 {
        let mut inner = self.shared.lock();
        inner.epoch += 1;
        let epoch = inner.epoch;

        if let Some(previous) = inner.in_flight.take() {
            if self.shared.abort_superseded {
                previous.abort();
                debug!("Aborted in-flight scoring request superseded by epoch {epoch}");
            }
        }

        let payload = build_payload(&input);
        inner.current = Some(input);

        match payload {
            None => {
                info!("Epoch {epoch}: nothing to score, clearing score");
                self.shared.publish(epoch, ScoreState::Empty, None);
            }
            Some(payload) => {
                info!("Epoch {epoch}: scoring by {}", payload.kind());
                self.shared.publish(epoch, ScoreState::Loading, None);
                let shared = Arc::clone(&self.shared);
                inner.in_flight = Some(tokio::spawn(async move {
                    shared.fetch_score(payload, epoch).await;
                }));
            }
        }

        epoch
    }

    pub fn view(&self) -> ScoreView {
        self.shared.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScoreView> {
        self.shared.view.subscribe()
    }

    pub fn current_input(&self) -> Option<CurrentInput> {
        self.shared.lock().current.clone()
    }

    /// Trust graph of the current input, when it is a profile.
    pub fn trust_graph(&self) -> Option<TrustGraph> {
        match &self.shared.lock().current {
            Some(CurrentInput::Profile(profile)) => Some(build_trust_graph(profile)),
            _ => None,
        }
    }

    /// Waits until the view has left `Loading` for `epoch`, or a later epoch
    /// has been published, and returns that view.
    pub async fn settled(&self, epoch: u64) -> ScoreView {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|v| v.epoch > epoch || (v.epoch == epoch && !v.state.is_loading()))
            .await
            .map(|v| ScoreView::clone(&v));
        // The sender lives as long as `self`, so the wait cannot fail here.
        settled.unwrap_or_else(|_| self.view())
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, epoch: u64, state: ScoreState, error: Option<String>) {
        self.view.send_replace(ScoreView {
            epoch,
            state,
            error,
        });
    }

    async fn fetch_score(&self, payload: ScorePayload, epoch: u64) {
        let outcome = self.client.fetch_score(&payload).await;
        self.apply(epoch, outcome);
    }

    /// Publishes `outcome` if `epoch` is still current. Returns whether it was applied.
    fn apply(&self, epoch: u64, outcome: Result<ScoreResult, ScoreError>) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!(
                "Discarding stale scoring response for epoch {epoch} (current {})",
                inner.epoch
            );
            return false;
        }
        inner.in_flight = None;

        match outcome {
            Ok(result) => {
                info!(
                    "Epoch {epoch}: realness score {}",
                    result.realness_score
                );
                self.publish(epoch, ScoreState::Ready(result), None);
            }
            Err(e) => {
                warn!("Epoch {epoch}: scoring failed: {e}");
                self.publish(
                    epoch,
                    ScoreState::Empty,
                    Some(e.user_message(GENERIC_SCORE_FAILURE)),
                );
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::input::ResumeDocument;
    use crate::models::profile::{Education, Experience};
    use crate::models::resume::ResumeAnalysis;
    use crate::models::score::{DetailMode, ExperienceBreakdown, ScoreBreakdown};
    use crate::presenter::{present, ScoreDisplay};

    type Reply = Result<ScoreResult, ScoreError>;

    /// Scoring client whose responses are released by the test. Replies are
    /// keyed by resume text or profile name.
    #[derive(Default)]
    struct ScriptedClient {
        calls: Mutex<Vec<ScorePayload>>,
        replies: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl ScriptedClient {
        fn script(&self, key: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.replies.lock().unwrap().insert(key.to_string(), rx);
            tx
        }

        fn calls(&self) -> Vec<ScorePayload> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn key(payload: &ScorePayload) -> String {
        match payload {
            ScorePayload::ResumeText(text) => text.clone(),
            ScorePayload::ProfileData(profile) => profile.name.clone(),
        }
    }

    #[async_trait]
    impl ScoringClient for ScriptedClient {
        async fn fetch_score(&self, payload: &ScorePayload) -> Reply {
            self.calls.lock().unwrap().push(payload.clone());
            let rx = self.replies.lock().unwrap().remove(&key(payload));
            match rx {
                Some(rx) => rx.await.unwrap_or(Err(ScoreError::Api {
                    status: 499,
                    detail: None,
                })),
                None => panic!("no reply scripted for {payload:?}"),
            }
        }

        async fn score_profile(&self, _profile: &Profile) -> Reply {
            panic!("orchestrator must score through fetch_score")
        }

        async fn upload_resume(&self, _document: &ResumeDocument) -> Result<ResumeAnalysis, ScoreError> {
            panic!("orchestrator never uploads")
        }
    }

    fn profile(name: &str) -> Profile {
        Profile {
            name: name.to_string(),
            experience: vec![Experience {
                role: "Eng".to_string(),
                company: "Acme".to_string(),
                years: 4,
            }],
            education: vec![Education {
                degree: "BS".to_string(),
                university: "X".to_string(),
                year: 2020,
            }],
            skills: ["Python".to_string()].into(),
        }
    }

    fn resume(flags: &[&str]) -> Resume {
        Resume {
            file_name: "cv.txt".to_string(),
            flags: flags.iter().map(|s| s.to_string()).collect(),
            ai_likelihood_score: None,
        }
    }

    fn score(value: f64) -> ScoreResult {
        ScoreResult {
            realness_score: value,
            details: ScoreBreakdown::default(),
        }
    }

    async fn let_tasks_run() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn setup(abort_superseded: bool) -> (Arc<ScriptedClient>, ScoreOrchestrator) {
        let client = Arc::new(ScriptedClient::default());
        let orchestrator = ScoreOrchestrator::new(client.clone(), abort_superseded);
        (client, orchestrator)
    }

    #[test]
    fn test_payload_prefers_resume_flags() {
        let payload = build_payload(&CurrentInput::Resume(resume(&["Overuse of buzzwords", "Vague"])));
        assert_eq!(
            payload,
            Some(ScorePayload::ResumeText("Overuse of buzzwords Vague".to_string()))
        );
    }

    #[test]
    fn test_payload_for_profile() {
        let payload = build_payload(&CurrentInput::Profile(profile("Jo")));
        assert_eq!(payload, Some(ScorePayload::ProfileData(profile("Jo"))));
    }

    #[test]
    fn test_resume_without_flags_has_no_payload() {
        assert_eq!(build_payload(&CurrentInput::Resume(resume(&[]))), None);
    }

    #[test]
    fn test_resume_with_only_empty_flag_has_no_payload() {
        assert_eq!(build_payload(&CurrentInput::Resume(resume(&[""]))), None);
    }

    #[tokio::test]
    async fn test_initial_view_is_empty() {
        let (_, orchestrator) = setup(true);
        assert_eq!(orchestrator.view(), ScoreView::default());
        assert_eq!(orchestrator.view().epoch, 0);
        assert!(orchestrator.current_input().is_none());
    }

    #[tokio::test]
    async fn test_last_trigger_wins_when_first_response_arrives_late() {
        let (client, orchestrator) = setup(false);
        let first = client.script("first");
        let second = client.script("second");

        let e1 = orchestrator.submit_profile(profile("first"));
        let e2 = orchestrator.submit_profile(profile("second"));
        assert_eq!((e1, e2), (1, 2));
        assert!(orchestrator.view().state.is_loading());

        second.send(Ok(score(80.0))).unwrap();
        let view = orchestrator.settled(e2).await;
        assert_eq!(view.state, ScoreState::Ready(score(80.0)));

        // The superseded request completes afterwards and must not win
        first.send(Ok(score(10.0))).unwrap();
        let_tasks_run().await;

        assert_eq!(client.calls().len(), 2);
        let view = orchestrator.view();
        assert_eq!(view.epoch, 2);
        assert_eq!(view.state, ScoreState::Ready(score(80.0)));
    }

    #[tokio::test]
    async fn test_stale_failure_is_discarded() {
        let (client, orchestrator) = setup(false);
        let first = client.script("first");
        let second = client.script("second");

        orchestrator.submit_profile(profile("first"));
        let e2 = orchestrator.submit_profile(profile("second"));

        first
            .send(Err(ScoreError::Api {
                status: 500,
                detail: Some("boom".to_string()),
            }))
            .unwrap();
        let_tasks_run().await;
        let view = orchestrator.view();
        assert!(view.state.is_loading());
        assert!(view.error.is_none());

        second.send(Ok(score(55.0))).unwrap();
        assert_eq!(
            orchestrator.settled(e2).await.state,
            ScoreState::Ready(score(55.0))
        );
    }

    #[tokio::test]
    async fn test_apply_rejects_old_epoch() {
        let (client, orchestrator) = setup(false);
        let _first = client.script("first");
        let _second = client.script("second");
        orchestrator.submit_profile(profile("first"));
        orchestrator.submit_profile(profile("second"));

        assert!(!orchestrator.shared.apply(1, Ok(score(1.0))));
        assert!(orchestrator.view().state.is_loading());
        assert!(orchestrator.shared.apply(2, Ok(score(2.0))));
        assert_eq!(orchestrator.view().state, ScoreState::Ready(score(2.0)));
    }

    #[tokio::test]
    async fn test_superseded_request_is_aborted() {
        let (client, orchestrator) = setup(true);
        let _first = client.script("first");
        let second = client.script("second");

        orchestrator.submit_profile(profile("first"));
        let e2 = orchestrator.submit_profile(profile("second"));
        second.send(Ok(score(70.0))).unwrap();

        assert_eq!(
            orchestrator.settled(e2).await.state,
            ScoreState::Ready(score(70.0))
        );
        // The first task was aborted before it ever reached the client
        assert_eq!(client.calls(), vec![ScorePayload::ProfileData(profile("second"))]);
    }

    #[tokio::test]
    async fn test_resume_without_flags_clears_without_calling() {
        let (client, orchestrator) = setup(true);
        let tx = client.script("Jo");
        let e1 = orchestrator.submit_profile(profile("Jo"));
        tx.send(Ok(score(60.0))).unwrap();
        orchestrator.settled(e1).await;

        let e2 = orchestrator.submit_resume(resume(&[]));
        let_tasks_run().await;

        assert_eq!(client.calls().len(), 1);
        let view = orchestrator.view();
        assert_eq!(view.epoch, e2);
        assert_eq!(view.state, ScoreState::Empty);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_resume_with_only_empty_flag_clears_without_calling() {
        let (client, orchestrator) = setup(true);
        let epoch = orchestrator.submit_resume(resume(&[""]));
        let_tasks_run().await;

        assert!(client.calls().is_empty());
        let view = orchestrator.view();
        assert_eq!(view.epoch, epoch);
        assert_eq!(view.state, ScoreState::Empty);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_resume_flags_are_joined() {
        let (client, orchestrator) = setup(true);
        let tx = client.script("buzzwords passive voice");
        let epoch = orchestrator.submit_resume(resume(&["buzzwords", "passive voice"]));
        tx.send(Ok(score(45.0))).unwrap();
        orchestrator.settled(epoch).await;

        assert_eq!(
            client.calls(),
            vec![ScorePayload::ResumeText("buzzwords passive voice".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_surfaces_detail_and_clears_score() {
        let (client, orchestrator) = setup(true);
        let tx = client.script("Jo");
        let epoch = orchestrator.submit_profile(profile("Jo"));
        tx.send(Err(ScoreError::Api {
            status: 400,
            detail: Some("Invalid JSON: expecting value".to_string()),
        }))
        .unwrap();

        let view = orchestrator.settled(epoch).await;
        assert_eq!(view.state, ScoreState::Empty);
        assert_eq!(view.error.as_deref(), Some("Invalid JSON: expecting value"));
    }

    #[tokio::test]
    async fn test_failure_without_detail_uses_generic_message() {
        let (client, orchestrator) = setup(true);
        let tx = client.script("Jo");
        let epoch = orchestrator.submit_profile(profile("Jo"));
        tx.send(Err(ScoreError::Api {
            status: 502,
            detail: None,
        }))
        .unwrap();

        let view = orchestrator.settled(epoch).await;
        assert_eq!(view.error.as_deref(), Some(GENERIC_SCORE_FAILURE));
    }

    #[tokio::test]
    async fn test_new_submission_clears_previous_result_and_error() {
        let (client, orchestrator) = setup(true);
        let failing = client.script("first");
        let e1 = orchestrator.submit_profile(profile("first"));
        failing
            .send(Err(ScoreError::Api {
                status: 500,
                detail: None,
            }))
            .unwrap();
        assert!(orchestrator.settled(e1).await.error.is_some());

        let _pending = client.script("second");
        let e2 = orchestrator.submit_profile(profile("second"));
        let view = orchestrator.view();
        assert_eq!(view.epoch, e2);
        assert_eq!(view.state, ScoreState::Loading);
        assert!(view.error.is_none());
    }

    #[tokio::test]
    async fn test_resume_replaces_profile_and_its_graph() {
        let (client, orchestrator) = setup(true);
        let _p = client.script("Jo");
        orchestrator.submit_profile(profile("Jo"));
        assert!(orchestrator.trust_graph().is_some());

        let _r = client.script("flag");
        orchestrator.submit_resume(resume(&["flag"]));
        assert!(orchestrator.trust_graph().is_none());
        assert!(matches!(
            orchestrator.current_input(),
            Some(CurrentInput::Resume(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_scored_end_to_end() {
        let (client, orchestrator) = setup(true);
        let jo = profile("Jo");
        let tx = client.script("Jo");

        let epoch = orchestrator.submit_profile(jo.clone());
        tx.send(Ok(ScoreResult {
            realness_score: 72.0,
            details: ScoreBreakdown {
                experience: Some(ExperienceBreakdown {
                    score: 80.0,
                    years: Some(4),
                }),
                ..Default::default()
            },
        }))
        .unwrap();
        let view = orchestrator.settled(epoch).await;

        let calls = client.calls();
        assert_eq!(calls, vec![ScorePayload::ProfileData(jo.clone())]);
        let params = calls[0].query_params().unwrap();
        let sent: Profile = serde_json::from_str(&params[0].1).unwrap();
        assert_eq!(sent, jo);

        match present(&view.state) {
            ScoreDisplay::Score {
                headline,
                breakdown,
            } => {
                assert!(headline.contains("72 / 100"));
                assert_eq!(breakdown.len(), 1);
                assert_eq!(breakdown[0].mode, DetailMode::Experience);
            }
            other => panic!("expected a score display, got {other:?}"),
        }
    }
}
