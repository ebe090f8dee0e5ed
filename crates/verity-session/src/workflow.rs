//! The predict-and-record state machine.
//!
//! [`PredictionWorkflow`] is synchronous: [`Session`](crate::Session) calls
//! [`PredictionWorkflow::begin`] before awaiting the gateway and one of
//! [`PredictionWorkflow::succeed`] / [`PredictionWorkflow::fail`] after.
//! Every phase change goes through [`RequestPhase::transition_to`].

use verity_core::{CoreError, NonEmptyText, PredictionResult, RequestPhase};

use crate::history::HistoryCache;

/// Result of trying to start a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Begin {
    /// The workflow is now `Submitting`; send this text.
    Started(NonEmptyText),
    /// A request is already in flight; the submission is dropped.
    Busy,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionWorkflow {
    phase: RequestPhase,
    input: String,
    result: Option<PredictionResult>,
}

impl PredictionWorkflow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> RequestPhase {
        self.phase
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text. Allowed in every phase.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// The result to display, present only in `Succeeded`.
    #[must_use]
    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref().filter(|_| self.phase.shows_result())
    }

    /// Start a submission of the current input.
    ///
    /// While `Submitting` this returns [`Begin::Busy`] without looking at the
    /// input. Otherwise the input is validated; on success the phase moves to
    /// `Submitting` and any displayed result is cleared immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for empty or whitespace-only input;
    /// the phase is left unchanged.
    pub fn begin(&mut self) -> Result<Begin, CoreError> {
        if !self.phase.accepts_submit() {
            return Ok(Begin::Busy);
        }
        let text = NonEmptyText::parse(&self.input)?;
        self.phase = self.phase.transition_to(RequestPhase::Submitting)?;
        self.result = None;
        Ok(Begin::Started(text))
    }

    /// Record a successful prediction for `text`.
    ///
    /// Prepends the history entry, clears the input and stores the result
    /// for display, all in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] if no submission is in flight;
    /// nothing is modified in that case.
    pub fn succeed(
        &mut self,
        text: &NonEmptyText,
        result: PredictionResult,
        history: &mut HistoryCache,
    ) -> Result<(), CoreError> {
        self.phase = self.phase.transition_to(RequestPhase::Succeeded)?;
        history.prepend(result.to_history_entry(text));
        self.input.clear();
        self.result = Some(result);
        Ok(())
    }

    /// Record a failed prediction. The input is kept for a retry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] if no submission is in flight.
    pub fn fail(&mut self) -> Result<(), CoreError> {
        self.phase = self.phase.transition_to(RequestPhase::Failed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use verity_core::{Confidence, EntryKey, Label};

    fn fake(confidence: f64) -> PredictionResult {
        PredictionResult::new(Label::Fake, Confidence::from_fraction(confidence).unwrap())
    }

    fn started(workflow: &mut PredictionWorkflow) -> NonEmptyText {
        match workflow.begin().unwrap() {
            Begin::Started(text) => text,
            Begin::Busy => panic!("expected a started submission"),
        }
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t")]
    fn blank_input_is_rejected_without_transition(#[case] input: &str) {
        let mut workflow = PredictionWorkflow::new();
        workflow.set_input(input);
        assert!(matches!(workflow.begin(), Err(CoreError::Validation(_))));
        assert_eq!(workflow.phase(), RequestPhase::Idle);
        assert_eq!(workflow.input(), input);
    }

    #[test]
    fn second_begin_while_submitting_is_busy() {
        let mut workflow = PredictionWorkflow::new();
        workflow.set_input("headline");
        let _ = started(&mut workflow);
        assert_eq!(workflow.begin().unwrap(), Begin::Busy);
        workflow.set_input("");
        assert_eq!(workflow.begin().unwrap(), Begin::Busy);
        assert_eq!(workflow.phase(), RequestPhase::Submitting);
    }

    #[test]
    fn success_prepends_history_and_clears_input() {
        let mut workflow = PredictionWorkflow::new();
        let mut history = HistoryCache::new();
        workflow.set_input("Breaking: moon made of cheese");
        let text = started(&mut workflow);

        workflow.succeed(&text, fake(0.87), &mut history).unwrap();

        assert_eq!(workflow.phase(), RequestPhase::Succeeded);
        assert_eq!(workflow.input(), "");
        assert_eq!(workflow.result(), Some(&fake(0.87)));
        let head = history.get(0).unwrap();
        assert_eq!(head.text, "Breaking: moon made of cheese");
        assert_eq!(head.key, EntryKey::Text("Breaking: moon made of cheese".into()));
        assert_eq!(head.label, Label::Fake);
    }

    #[test]
    fn failure_keeps_input_and_history() {
        let mut workflow = PredictionWorkflow::new();
        let history = HistoryCache::new();
        workflow.set_input("headline");
        let _ = started(&mut workflow);

        workflow.fail().unwrap();

        assert_eq!(workflow.phase(), RequestPhase::Failed);
        assert_eq!(workflow.input(), "headline");
        assert_eq!(workflow.result(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn new_submission_clears_previous_result_immediately() {
        let mut workflow = PredictionWorkflow::new();
        let mut history = HistoryCache::new();
        workflow.set_input("first");
        let text = started(&mut workflow);
        workflow.succeed(&text, fake(0.6), &mut history).unwrap();
        assert!(workflow.result().is_some());

        workflow.set_input("second");
        let _ = started(&mut workflow);

        assert_eq!(workflow.phase(), RequestPhase::Submitting);
        assert_eq!(workflow.result(), None);
    }

    #[test]
    fn completion_without_submission_is_invalid() {
        let mut workflow = PredictionWorkflow::new();
        let mut history = HistoryCache::new();
        let text = NonEmptyText::parse("x").unwrap();

        assert!(matches!(
            workflow.succeed(&text, fake(0.5), &mut history),
            Err(CoreError::InvalidTransition { .. })
        ));
        assert!(matches!(workflow.fail(), Err(CoreError::InvalidTransition { .. })));
        assert!(history.is_empty());
        assert_eq!(workflow.phase(), RequestPhase::Idle);
    }

    #[test]
    fn failed_workflow_accepts_retry() {
        let mut workflow = PredictionWorkflow::new();
        workflow.set_input("retry me");
        let _ = started(&mut workflow);
        workflow.fail().unwrap();

        let text = started(&mut workflow);
        assert_eq!(text.as_str(), "retry me");
    }
}
