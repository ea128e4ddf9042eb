pub mod model;

pub use model::{Lexicon, LexiconError, PRONOUN_SLOTS, Pronoun, Tense, TenseNotes, Verb};
