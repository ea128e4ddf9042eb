pub mod quiz;
pub mod timer;

pub use quiz::{Command, Feedback, Mode, Outcome, QuizOptions, QuizSession, Tone};
