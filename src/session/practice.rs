use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::morse::{self, MorseCode, MorseError};
use crate::session::input::{InputEvent, sanitize};
use crate::session::picker::TargetPicker;

pub const DEFAULT_SUCCESS_DELAY_MS: u64 = 600;
pub const DEFAULT_FAILURE_DELAY_MS: u64 = 1200;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("the practice set has no characters that can be drilled")]
    NothingToDrill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PracticeMode {
    Drill,
    FreeType,
    Quiz,
}

impl PracticeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PracticeMode::Drill => "drill",
            PracticeMode::FreeType => "free",
            PracticeMode::Quiz => "quiz",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PracticeMode::Drill => "Drill",
            PracticeMode::FreeType => "Free Typing",
            PracticeMode::Quiz => "Quiz",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AfterFailure {
    /// Clear the input and drill the same target again.
    Retry,
    /// Start a new round with a fresh target.
    Advance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeRules {
    /// Fail as soon as the input stops being a prefix of the target code.
    /// Otherwise the round fails only once the input reaches full length.
    pub fail_on_divergence: bool,
    pub after_failure: AfterFailure,
    /// Show the target's code before the learner answers.
    pub show_reference: bool,
}

impl ModeRules {
    pub fn for_mode(mode: PracticeMode) -> Self {
        match mode {
            PracticeMode::Drill => Self {
                fail_on_divergence: true,
                after_failure: AfterFailure::Retry,
                show_reference: true,
            },
            PracticeMode::FreeType => Self {
                fail_on_divergence: false,
                after_failure: AfterFailure::Advance,
                show_reference: true,
            },
            PracticeMode::Quiz => Self {
                fail_on_divergence: false,
                after_failure: AfterFailure::Advance,
                show_reference: false,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundDelays {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for RoundDelays {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(DEFAULT_SUCCESS_DELAY_MS),
            failure: Duration::from_millis(DEFAULT_FAILURE_DELAY_MS),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    LockedSuccess,
    LockedFailure,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeTarget {
    character: char,
    code: MorseCode,
}

impl PracticeTarget {
    pub fn new(character: char) -> Result<Self, MorseError> {
        let code = morse::encode(character)?;
        Ok(Self { character, code })
    }

    pub fn character(&self) -> char {
        self.character
    }

    pub fn code(&self) -> &MorseCode {
        &self.code
    }

    pub fn max_input_len(&self) -> usize {
        self.code.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundOutcome {
    pub round: u64,
    pub character: char,
    pub success: bool,
}

#[derive(Clone, Copy, Debug)]
struct PendingRound {
    due: Instant,
    generation: u64,
    follow_up: AfterFailure,
}

pub struct PracticeSession {
    mode: PracticeMode,
    rules: ModeRules,
    delays: RoundDelays,
    set: Vec<char>,
    picker: TargetPicker,
    target: Option<PracticeTarget>,
    buffer: String,
    state: SessionState,
    feedback: Feedback,
    generation: u64,
    pending: Option<PendingRound>,
    outcome_reported: bool,
    revealed: bool,
}

impl PracticeSession {
    /// Creates the session and starts its first round.
    pub fn new(
        mode: PracticeMode,
        rules: ModeRules,
        delays: RoundDelays,
        set: Vec<char>,
        picker: TargetPicker,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            mode,
            rules,
            delays,
            set,
            picker,
            target: None,
            buffer: String::new(),
            state: SessionState::AwaitingInput,
            feedback: Feedback::Neutral,
            generation: 0,
            pending: None,
            outcome_reported: false,
            revealed: false,
        };
        session.start_round()?;
        Ok(session)
    }

    pub fn start_round(&mut self) -> Result<(), SessionError> {
        let previous = self.target.as_ref().map(PracticeTarget::character);
        let character = self
            .picker
            .pick(&self.set, previous)
            .ok_or(SessionError::NothingToDrill)?;
        // The picker only returns encodable characters.
        let target = PracticeTarget::new(character).map_err(|_| SessionError::NothingToDrill)?;
        self.target = Some(target);
        self.reset_round();
        info!(
            mode = self.mode.as_str(),
            character = %character,
            round = self.generation,
            "round started"
        );
        Ok(())
    }

    fn retry_round(&mut self) {
        self.reset_round();
        debug!(round = self.generation, "retrying target");
    }

    fn reset_round(&mut self) {
        self.buffer.clear();
        self.state = SessionState::AwaitingInput;
        self.feedback = Feedback::Neutral;
        self.generation += 1;
        self.pending = None;
        self.outcome_reported = false;
        self.revealed = false;
    }

    /// Applies one input event. Returns the round's outcome the first time
    /// the round reaches a terminal state, `None` otherwise.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Option<RoundOutcome> {
        if self.state != SessionState::AwaitingInput {
            debug!(?event, "input discarded while locked");
            return None;
        }
        let max_len = self.target.as_ref()?.max_input_len();

        match event {
            InputEvent::Symbol(symbol) => {
                if self.buffer.chars().count() >= max_len {
                    return None;
                }
                self.buffer.push(symbol.as_char());
            }
            InputEvent::Backspace => {
                self.buffer.pop();
            }
            InputEvent::Clear => self.buffer.clear(),
            InputEvent::Text(text) => self.buffer = sanitize(&text, max_len),
        }

        self.evaluate(now)
    }

    fn evaluate(&mut self, now: Instant) -> Option<RoundOutcome> {
        let target = self.target.as_ref()?;
        let code = target.code();

        if self.buffer == code.as_str() {
            return self.succeed(now);
        }
        if code.starts_with(&self.buffer) {
            self.feedback = Feedback::Neutral;
            return None;
        }
        if self.rules.fail_on_divergence || self.buffer.chars().count() >= code.len() {
            return self.fail(now);
        }
        self.feedback = Feedback::Incorrect;
        None
    }

    fn succeed(&mut self, now: Instant) -> Option<RoundOutcome> {
        self.state = SessionState::LockedSuccess;
        self.feedback = Feedback::Correct;
        self.pending = Some(PendingRound {
            due: now + self.delays.success,
            generation: self.generation,
            follow_up: AfterFailure::Advance,
        });
        self.report(true)
    }

    fn fail(&mut self, now: Instant) -> Option<RoundOutcome> {
        self.state = SessionState::LockedFailure;
        self.feedback = Feedback::Incorrect;
        self.revealed = true;
        self.pending = Some(PendingRound {
            due: now + self.delays.failure,
            generation: self.generation,
            follow_up: self.rules.after_failure,
        });
        self.report(false)
    }

    fn report(&mut self, success: bool) -> Option<RoundOutcome> {
        if self.outcome_reported {
            return None;
        }
        self.outcome_reported = true;
        let character = self.target.as_ref()?.character();
        info!(character = %character, success, round = self.generation, "round finished");
        Some(RoundOutcome {
            round: self.generation,
            character,
            success,
        })
    }

    /// Fires the post-outcome timer once it is due. Returns true when a new
    /// round (or retry) began.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(pending) if now >= pending.due => self.fire(pending.generation),
            _ => false,
        }
    }

    /// Runs the timer armed in round `generation`. Timers from superseded
    /// rounds are ignored.
    pub fn fire(&mut self, generation: u64) -> bool {
        let pending = match self.pending {
            Some(p) if p.generation == generation && self.generation == generation => p,
            _ => {
                debug!(generation, current = self.generation, "stale round timer ignored");
                return false;
            }
        };
        self.pending = None;
        match pending.follow_up {
            AfterFailure::Retry => {
                self.retry_round();
                true
            }
            AfterFailure::Advance => {
                if let Err(e) = self.start_round() {
                    // An emptied set keeps the current target so the round unlocks.
                    warn!("could not start next round, retrying target: {e}");
                    self.retry_round();
                }
                true
            }
        }
    }

    /// Replaces the candidate set. The current round is left alone.
    pub fn set_practice_set(&mut self, set: Vec<char>) {
        self.set = set;
    }

    pub fn practice_set(&self) -> &[char] {
        &self.set
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    pub fn rules(&self) -> &ModeRules {
        &self.rules
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn feedback(&self) -> Feedback {
        self.feedback
    }

    pub fn target(&self) -> Option<&PracticeTarget> {
        self.target.as_ref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn accepts_input(&self) -> bool {
        self.state == SessionState::AwaitingInput
    }

    /// Symbols entered and symbols required.
    pub fn progress(&self) -> (usize, usize) {
        let required = self.target.as_ref().map_or(0, PracticeTarget::max_input_len);
        (self.buffer.chars().count(), required)
    }

    /// Whether the target's code should be on screen.
    pub fn shows_code(&self) -> bool {
        self.rules.show_reference || self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morse::MorseSymbol;

    const DOT: InputEvent = InputEvent::Symbol(MorseSymbol::Dot);
    const DASH: InputEvent = InputEvent::Symbol(MorseSymbol::Dash);

    fn session(mode: PracticeMode, set: &[char]) -> PracticeSession {
        PracticeSession::new(
            mode,
            ModeRules::for_mode(mode),
            RoundDelays::default(),
            set.to_vec(),
            TargetPicker::with_seed(42),
        )
        .unwrap()
    }

    fn target_a() -> PracticeSession {
        session(PracticeMode::Drill, &['A'])
    }

    #[test]
    fn valid_prefix_is_neutral() {
        let mut s = target_a();
        let now = Instant::now();
        assert_eq!(s.handle_input(DOT, now), None);
        assert_eq!(s.feedback(), Feedback::Neutral);
        assert_eq!(s.state(), SessionState::AwaitingInput);
        assert_eq!(s.progress(), (1, 2));
    }

    #[test]
    fn non_prefix_fails_in_drill_mode() {
        let mut s = target_a();
        let now = Instant::now();
        s.handle_input(DOT, now);
        let outcome = s.handle_input(DOT, now).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.character, 'A');
        assert_eq!(s.state(), SessionState::LockedFailure);
        assert!(s.shows_code());
    }

    #[test]
    fn exact_code_succeeds() {
        let mut s = target_a();
        let now = Instant::now();
        s.handle_input(DOT, now);
        let outcome = s.handle_input(DASH, now).unwrap();
        assert!(outcome.success);
        assert_eq!(s.state(), SessionState::LockedSuccess);
        assert_eq!(s.feedback(), Feedback::Correct);
        assert!(!s.accepts_input());
    }

    #[test]
    fn overlong_text_is_truncated_before_evaluation() {
        let mut s = target_a();
        let outcome = s
            .handle_input(InputEvent::Text(".-.".to_string()), Instant::now())
            .unwrap();
        assert!(outcome.success);
        assert_eq!(s.buffer(), ".-");
    }

    #[test]
    fn divergence_at_full_length_fails_in_free_mode() {
        let mut s = session(PracticeMode::FreeType, &['E']);
        let now = Instant::now();
        // 'E' is a single dot; a dash first diverges at full length
        let outcome = s.handle_input(DASH, now).unwrap();
        assert!(!outcome.success);
        assert_eq!(s.buffer(), "-");
    }

    #[test]
    fn locked_session_discards_input_and_reports_once() {
        let mut s = target_a();
        let now = Instant::now();
        s.handle_input(DOT, now);
        assert!(s.handle_input(DASH, now).is_some());
        assert_eq!(s.handle_input(DASH, now), None);
        assert_eq!(s.handle_input(InputEvent::Text(".-".into()), now), None);
        assert_eq!(s.buffer(), ".-");
    }

    #[test]
    fn free_mode_waits_for_full_length() {
        let mut s = session(PracticeMode::FreeType, &['B']); // -...
        let now = Instant::now();
        s.handle_input(DOT, now);
        assert_eq!(s.feedback(), Feedback::Incorrect);
        assert_eq!(s.state(), SessionState::AwaitingInput);

        // Backspace recovers
        s.handle_input(InputEvent::Backspace, now);
        assert_eq!(s.feedback(), Feedback::Neutral);

        s.handle_input(DOT, now);
        s.handle_input(DOT, now);
        s.handle_input(DOT, now);
        let outcome = s.handle_input(DOT, now).unwrap();
        assert!(!outcome.success);
        assert_eq!(s.state(), SessionState::LockedFailure);
    }

    #[test]
    fn success_advances_after_delay_to_a_different_target() {
        let mut s = session(PracticeMode::Drill, &['E', 'T']);
        let now = Instant::now();
        let first = s.target().unwrap().character();
        let code = s.target().unwrap().code().clone();
        s.handle_input(InputEvent::Text(code.to_string()), now);

        assert!(!s.poll(now + Duration::from_millis(599)));
        assert_eq!(s.state(), SessionState::LockedSuccess);
        assert!(s.poll(now + Duration::from_millis(600)));
        assert_eq!(s.state(), SessionState::AwaitingInput);
        assert_ne!(s.target().unwrap().character(), first);
        assert_eq!(s.buffer(), "");
    }

    #[test]
    fn drill_failure_retries_same_target() {
        let mut s = session(PracticeMode::Drill, &['A', 'B', 'C']);
        let now = Instant::now();
        let first = s.target().unwrap().character();
        let wrong = if first == 'A' { "-" } else { "." };
        s.handle_input(InputEvent::Text(wrong.into()), now);
        assert_eq!(s.state(), SessionState::LockedFailure);

        // Failure delay is longer than the success delay
        assert!(!s.poll(now + Duration::from_millis(600)));
        assert!(s.poll(now + Duration::from_millis(1200)));
        assert_eq!(s.target().unwrap().character(), first);
        assert_eq!(s.buffer(), "");
        assert!(s.accepts_input());
    }

    #[test]
    fn free_failure_advances() {
        let mut s = session(PracticeMode::FreeType, &['E', 'T']);
        let now = Instant::now();
        let first = s.target().unwrap().character();
        let wrong = if first == 'E' { "-" } else { "." };
        s.handle_input(InputEvent::Text(wrong.into()), now);
        assert!(s.poll(now + Duration::from_secs(2)));
        assert_ne!(s.target().unwrap().character(), first);
    }

    #[test]
    fn stale_timer_is_a_no_op() {
        let mut s = session(PracticeMode::Drill, &['E', 'T']);
        let now = Instant::now();
        let code = s.target().unwrap().code().clone();
        s.handle_input(InputEvent::Text(code.to_string()), now);
        let old_generation = s.generation();
        assert!(s.poll(now + Duration::from_secs(1)));

        let current = s.target().unwrap().character();
        assert!(!s.fire(old_generation));
        assert_eq!(s.target().unwrap().character(), current);
        assert!(s.accepts_input());
    }

    #[test]
    fn quiz_hides_reference_until_failure() {
        let mut s = session(PracticeMode::Quiz, &['M']); // --
        let now = Instant::now();
        assert!(!s.shows_code());
        s.handle_input(DOT, now);
        s.handle_input(DOT, now);
        assert!(s.shows_code());
    }

    #[test]
    fn emptied_set_retries_instead_of_staying_locked() {
        let mut s = session(PracticeMode::Quiz, &['E']);
        let now = Instant::now();
        s.handle_input(DASH, now);
        assert_eq!(s.state(), SessionState::LockedFailure);

        s.set_practice_set(Vec::new());
        assert!(s.poll(now + Duration::from_secs(2)));
        assert_eq!(s.state(), SessionState::AwaitingInput);
        assert_eq!(s.target().unwrap().character(), 'E');
        assert!(s.accepts_input());
    }

    #[test]
    fn empty_set_cannot_start() {
        let result = PracticeSession::new(
            PracticeMode::Drill,
            ModeRules::for_mode(PracticeMode::Drill),
            RoundDelays::default(),
            vec!['#'],
            TargetPicker::with_seed(1),
        );
        assert_eq!(result.err(), Some(SessionError::NothingToDrill));
    }
}
