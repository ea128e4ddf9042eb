use rand::Rng;
use rand::rngs::SmallRng;

use crate::engine::review::{ReviewItem, ReviewQueue};
use crate::lexicon::{Lexicon, LexiconError, PRONOUN_SLOTS};

pub const DEFAULT_REVIEW_BIAS: f64 = 0.35;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub verb: usize,
    pub tense: usize,
    pub pronoun: usize,
    pub expected: String,
    pub from_review: bool,
}

impl Question {
    pub fn review_item(&self, lexicon: &Lexicon) -> ReviewItem {
        let verb = &lexicon.verbs()[self.verb];
        let tense = &lexicon.tenses()[self.tense];
        let pronoun = &lexicon.pronouns()[self.pronoun];
        ReviewItem {
            verb: verb.infinitive.clone(),
            tense: tense.fr.clone(),
            pronoun: pronoun.fr.clone(),
            answer: self.expected.clone(),
            timestamp: chrono::Utc::now(),
            verb_id: verb.id.clone(),
            tense_id: tense.id.clone(),
            pronoun_index: self.pronoun,
        }
    }
}

/// Restricts practice to some verb and tense ids. Empty lists allow everything.
#[derive(Clone, Debug, Default)]
pub struct PracticeFilter {
    pub verbs: Vec<String>,
    pub tenses: Vec<String>,
}

impl PracticeFilter {
    pub fn allows(&self, verb_id: &str, tense_id: &str) -> bool {
        (self.verbs.is_empty() || self.verbs.iter().any(|v| v == verb_id))
            && (self.tenses.is_empty() || self.tenses.iter().any(|t| t == tense_id))
    }
}

pub struct QuestionGenerator {
    /// verb index -> tense indices with complete data
    candidates: Vec<(usize, Vec<usize>)>,
    filter: PracticeFilter,
    review_bias: f64,
    rng: SmallRng,
}

impl QuestionGenerator {
    pub fn new(
        lexicon: &Lexicon,
        filter: &PracticeFilter,
        review_bias: f64,
        rng: SmallRng,
    ) -> Result<Self, LexiconError> {
        let mut candidates: Vec<(usize, Vec<usize>)> = Vec::new();
        for (verb, tense) in lexicon.available_pairs() {
            let verb_id = &lexicon.verbs()[verb].id;
            let tense_id = &lexicon.tenses()[tense].id;
            if !filter.allows(verb_id, tense_id) {
                continue;
            }
            match candidates.last_mut() {
                Some((v, tenses)) if *v == verb => tenses.push(tense),
                _ => candidates.push((verb, vec![tense])),
            }
        }
        if candidates.is_empty() {
            return Err(LexiconError::NoQuestions);
        }
        Ok(Self {
            candidates,
            filter: filter.clone(),
            review_bias: review_bias.clamp(0.0, 1.0),
            rng,
        })
    }

    pub fn next(&mut self, lexicon: &Lexicon, review: &mut ReviewQueue) -> Question {
        if !review.is_empty() && self.rng.gen_bool(self.review_bias) {
            // Misses outside the current filter stay queued for a wider one.
            let filter = &self.filter;
            while let Some(item) =
                review.take_first_where(|item| filter.allows(&item.verb_id, &item.tense_id))
            {
                if let Some(question) = resolve(lexicon, &item) {
                    tracing::debug!(verb = %item.verb_id, tense = %item.tense_id, "re-asking missed question");
                    return question;
                }
                tracing::debug!(verb = %item.verb, "dropping stale review item");
            }
        }
        self.sample(lexicon)
    }

    fn sample(&mut self, lexicon: &Lexicon) -> Question {
        let (verb, tenses) = &self.candidates[self.rng.gen_range(0..self.candidates.len())];
        let tense = tenses[self.rng.gen_range(0..tenses.len())];
        let pronoun = self.rng.gen_range(0..PRONOUN_SLOTS);
        let expected = lexicon
            .form(*verb, tense, pronoun)
            .unwrap_or_default()
            .to_string();
        Question {
            verb: *verb,
            tense,
            pronoun,
            expected,
            from_review: false,
        }
    }
}

fn resolve(lexicon: &Lexicon, item: &ReviewItem) -> Option<Question> {
    let verb = lexicon.verb_index(&item.verb_id)?;
    let tense = lexicon.tense_index(&item.tense_id)?;
    let expected = lexicon.form(verb, tense, item.pronoun_index)?;
    Some(Question {
        verb,
        tense,
        pronoun: item.pronoun_index,
        expected: expected.to_string(),
        from_review: true,
    })
}
