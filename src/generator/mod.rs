pub mod question;

pub use question::{PracticeFilter, Question, QuestionGenerator};
