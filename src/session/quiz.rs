use std::time::Duration;

use rand::rngs::SmallRng;

use crate::engine::matcher;
use crate::engine::review::{DEFAULT_REVIEW_CAPACITY, ReviewItem, ReviewQueue};
use crate::engine::scoring::SessionStats;
use crate::generator::question::DEFAULT_REVIEW_BIAS;
use crate::generator::{PracticeFilter, Question, QuestionGenerator};
use crate::lexicon::{Lexicon, LexiconError, TenseNotes};
use crate::session::timer::{Scheduler, TaskHandle};
use crate::store::schema::ProgressSnapshot;

pub const DEFAULT_SPRINT_SECS: u32 = 60;
/// Number of distinct encouragement messages shown on a correct answer.
pub const CHEER_COUNT: usize = 5;

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Practice,
    Timed,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Practice => "practice",
            Mode::Timed => "timed",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Mode::Practice => Mode::Timed,
            Mode::Timed => Mode::Practice,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingAnswer,
    Answered(Verdict),
    Skipped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Countdown {
    Inactive,
    Running(u32),
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    Skip,
    SwitchMode(Mode),
    /// Time elapsed since the previous tick.
    Tick(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// A transition is already pending for the current question.
    Locked,
    SprintOver,
    NoQuestion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Answered(Verdict),
    Skipped,
    ModeSwitched(Mode),
    Ticked,
    Rejected(Rejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Feedback {
    None,
    Correct { xp: u32, cheer: usize },
    Incorrect { expected: String },
    Skipped { expected: String },
    SprintOver { score: u32 },
}

impl Feedback {
    pub fn tone(&self) -> Tone {
        match self {
            Feedback::Correct { .. } => Tone::Correct,
            Feedback::Incorrect { .. } | Feedback::Skipped { .. } => Tone::Incorrect,
            Feedback::None | Feedback::SprintOver { .. } => Tone::Neutral,
        }
    }
}

#[derive(Clone, Debug)]
pub struct QuizOptions {
    pub review_bias: f64,
    pub review_capacity: usize,
    pub sprint_secs: u32,
    pub correct_delay: Duration,
    pub incorrect_delay: Duration,
    pub skip_delay: Duration,
    pub filter: PracticeFilter,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            review_bias: DEFAULT_REVIEW_BIAS,
            review_capacity: DEFAULT_REVIEW_CAPACITY,
            sprint_secs: DEFAULT_SPRINT_SECS,
            correct_delay: Duration::from_millis(800),
            incorrect_delay: Duration::from_millis(2000),
            skip_delay: Duration::from_millis(1500),
            filter: PracticeFilter::default(),
        }
    }
}

/// Everything the UI needs to print the current question.
pub struct QuestionView<'a> {
    pub verb: &'a str,
    pub verb_english: &'a str,
    pub verb_group: &'a str,
    pub tense: &'a str,
    pub tense_english: &'a str,
    pub tense_notes: &'a TenseNotes,
    pub pronoun: &'a str,
    /// Elided when the expected form starts with a vowel sound.
    pub pronoun_display: &'a str,
    pub pronoun_english: &'a str,
    pub from_review: bool,
}

#[derive(Clone, Copy, Debug)]
enum Timer {
    Advance,
    CountdownTick,
}

pub struct QuizSession {
    lexicon: Lexicon,
    generator: QuestionGenerator,
    review: ReviewQueue,
    stats: SessionStats,
    options: QuizOptions,
    mode: Mode,
    phase: Phase,
    countdown: Countdown,
    question: Option<Question>,
    question_serial: u64,
    locked: bool,
    feedback: Feedback,
    scheduler: Scheduler<Timer>,
    pending_advance: Option<TaskHandle>,
    countdown_tick: Option<TaskHandle>,
    dirty: bool,
}

impl QuizSession {
    pub fn new(
        lexicon: Lexicon,
        options: QuizOptions,
        progress: ProgressSnapshot,
        rng: SmallRng,
    ) -> Result<Self, LexiconError> {
        let generator =
            QuestionGenerator::new(&lexicon, &options.filter, options.review_bias, rng)?;
        let review = ReviewQueue::from_items(progress.review_list, options.review_capacity);
        let stats = SessionStats::restored(progress.xp, progress.level, progress.max_streak);
        Ok(Self {
            lexicon,
            generator,
            review,
            stats,
            options,
            mode: Mode::Practice,
            phase: Phase::Idle,
            countdown: Countdown::Inactive,
            question: None,
            question_serial: 0,
            locked: false,
            feedback: Feedback::None,
            scheduler: Scheduler::default(),
            pending_advance: None,
            countdown_tick: None,
            dirty: false,
        })
    }

    pub fn handle(&mut self, command: Command) -> Outcome {
        match command {
            Command::Submit(answer) => self.submit(&answer),
            Command::Skip => self.skip(),
            Command::SwitchMode(mode) => self.switch_mode(mode),
            Command::Tick(elapsed) => self.tick(elapsed),
        }
    }

    fn guard(&mut self) -> Result<Question, Rejection> {
        if self.countdown == Countdown::Expired {
            self.feedback = Feedback::SprintOver {
                score: self.stats.score,
            };
            return Err(Rejection::SprintOver);
        }
        if self.locked {
            return Err(Rejection::Locked);
        }
        self.question.clone().ok_or(Rejection::NoQuestion)
    }

    fn submit(&mut self, answer: &str) -> Outcome {
        let question = match self.guard() {
            Ok(question) => question,
            Err(rejection) => return Outcome::Rejected(rejection),
        };
        self.locked = true;

        let pronoun = &self.lexicon.pronouns()[question.pronoun];
        let verdict = if matcher::matches(answer, &question.expected, pronoun) {
            let xp = self.stats.record_correct();
            let cheer = (self.stats.correct as usize).saturating_sub(1) % CHEER_COUNT;
            self.feedback = Feedback::Correct { xp, cheer };
            self.schedule_advance(self.options.correct_delay);
            Verdict::Correct
        } else {
            self.stats.record_miss();
            self.review.add(question.review_item(&self.lexicon));
            self.feedback = Feedback::Incorrect {
                expected: question.expected.clone(),
            };
            self.schedule_advance(self.options.incorrect_delay);
            Verdict::Incorrect
        };
        tracing::debug!(?verdict, streak = self.stats.streak, xp = self.stats.xp, "answer checked");

        self.phase = Phase::Answered(verdict);
        self.dirty = true;
        Outcome::Answered(verdict)
    }

    fn skip(&mut self) -> Outcome {
        let question = match self.guard() {
            Ok(question) => question,
            Err(rejection) => return Outcome::Rejected(rejection),
        };
        self.locked = true;
        self.stats.record_skip();
        self.review.add(question.review_item(&self.lexicon));
        self.feedback = Feedback::Skipped {
            expected: question.expected,
        };
        self.schedule_advance(self.options.skip_delay);
        self.phase = Phase::Skipped;
        self.dirty = true;
        Outcome::Skipped
    }

    fn switch_mode(&mut self, mode: Mode) -> Outcome {
        self.cancel_timers();
        self.stats.reset_session();
        self.mode = mode;
        self.countdown = match mode {
            Mode::Timed => {
                self.countdown_tick = Some(self.scheduler.schedule(COUNTDOWN_STEP, Timer::CountdownTick));
                Countdown::Running(self.options.sprint_secs)
            }
            Mode::Practice => Countdown::Inactive,
        };
        tracing::info!(mode = mode.as_str(), "quiz mode switched");
        self.next_question();
        Outcome::ModeSwitched(mode)
    }

    fn tick(&mut self, elapsed: Duration) -> Outcome {
        let until = self.scheduler.now() + elapsed;
        while let Some(timer) = self.scheduler.pop_due(until) {
            match timer {
                Timer::Advance => {
                    self.pending_advance = None;
                    self.next_question();
                }
                Timer::CountdownTick => {
                    self.countdown_tick = None;
                    self.on_countdown_tick();
                }
            }
        }
        self.scheduler.settle(until);
        Outcome::Ticked
    }

    fn on_countdown_tick(&mut self) {
        let Countdown::Running(remaining) = self.countdown else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        if remaining == 0 {
            self.countdown = Countdown::Expired;
            if let Some(handle) = self.pending_advance.take() {
                self.scheduler.cancel(handle);
            }
            self.locked = true;
            self.feedback = Feedback::SprintOver {
                score: self.stats.score,
            };
            tracing::info!(score = self.stats.score, correct = self.stats.correct, "sprint finished");
        } else {
            self.countdown = Countdown::Running(remaining);
            self.countdown_tick = Some(self.scheduler.schedule(COUNTDOWN_STEP, Timer::CountdownTick));
        }
    }

    fn schedule_advance(&mut self, delay: Duration) {
        if let Some(handle) = self.pending_advance.take() {
            self.scheduler.cancel(handle);
        }
        self.pending_advance = Some(self.scheduler.schedule(delay, Timer::Advance));
    }

    fn cancel_timers(&mut self) {
        for handle in [self.pending_advance.take(), self.countdown_tick.take()]
            .into_iter()
            .flatten()
        {
            self.scheduler.cancel(handle);
        }
    }

    fn next_question(&mut self) {
        if let Some(handle) = self.pending_advance.take() {
            self.scheduler.cancel(handle);
        }
        let question = self.generator.next(&self.lexicon, &mut self.review);
        if question.from_review {
            self.dirty = true;
        }
        self.question = Some(question);
        self.question_serial += 1;
        self.locked = false;
        self.feedback = Feedback::None;
        self.phase = Phase::AwaitingAnswer;
    }

    /// Drop every pending task and go back to idle, keeping progression.
    pub fn reset(&mut self) {
        self.cancel_timers();
        self.scheduler.clear();
        self.stats.reset_session();
        self.mode = Mode::Practice;
        self.countdown = Countdown::Inactive;
        self.phase = Phase::Idle;
        self.question = None;
        self.locked = false;
        self.feedback = Feedback::None;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn countdown_state(&self) -> Countdown {
        self.countdown
    }

    /// Seconds left in timed mode; `None` in practice mode.
    pub fn countdown(&self) -> Option<u32> {
        match self.countdown {
            Countdown::Inactive => None,
            Countdown::Running(secs) => Some(secs),
            Countdown::Expired => Some(0),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// Changes every time a new question is shown.
    pub fn question_serial(&self) -> u64 {
        self.question_serial
    }

    pub fn question_view(&self) -> Option<QuestionView<'_>> {
        let question = self.question.as_ref()?;
        let verb = &self.lexicon.verbs()[question.verb];
        let tense = &self.lexicon.tenses()[question.tense];
        let pronoun = &self.lexicon.pronouns()[question.pronoun];
        Some(QuestionView {
            verb: &verb.infinitive,
            verb_english: &verb.english,
            verb_group: &verb.group,
            tense: &tense.fr,
            tense_english: &tense.en,
            tense_notes: &tense.notes,
            pronoun: &pronoun.fr,
            pronoun_display: pronoun.display_before(&question.expected),
            pronoun_english: &pronoun.en,
            from_review: question.from_review,
        })
    }

    pub fn recent_mistakes(&self, n: usize) -> impl Iterator<Item = &ReviewItem> {
        self.review.recent(n)
    }

    pub fn review_len(&self) -> usize {
        self.review.len()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            xp: self.stats.xp,
            level: self.stats.level,
            max_streak: self.stats.max_streak,
            review_list: self.review.to_vec(),
            ..ProgressSnapshot::default()
        }
    }

    /// True once after any change that should be persisted.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
