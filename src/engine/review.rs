use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_REVIEW_CAPACITY: usize = 20;

/// A missed question, kept for the mistakes list and for re-asking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub verb: String,
    pub tense: String,
    pub pronoun: String,
    #[serde(alias = "correct")]
    pub answer: String,
    /// RFC 3339 when written here; older progress files store epoch milliseconds.
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub verb_id: String,
    #[serde(default)]
    pub tense_id: String,
    #[serde(default)]
    pub pronoun_index: usize,
}

mod lenient_timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Rfc3339(DateTime<Utc>),
        Millis(i64),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Rfc3339(ts) => Ok(ts),
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
        }
    }
}

impl ReviewItem {
    fn same_question(&self, other: &ReviewItem) -> bool {
        !self.verb_id.is_empty()
            && self.verb_id == other.verb_id
            && self.tense_id == other.tense_id
            && self.pronoun_index == other.pronoun_index
    }
}

/// Bounded FIFO of misses: oldest entries are re-served and evicted first.
#[derive(Clone, Debug)]
pub struct ReviewQueue {
    items: VecDeque<ReviewItem>,
    capacity: usize,
}

impl Default for ReviewQueue {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_CAPACITY)
    }
}

impl ReviewQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from persisted items, listed oldest first.
    pub fn from_items(items: Vec<ReviewItem>, capacity: usize) -> Self {
        let mut queue = Self::new(capacity);
        for item in items {
            queue.add(item);
        }
        queue
    }

    pub fn add(&mut self, item: ReviewItem) {
        self.items.retain(|queued| !queued.same_question(&item));
        self.items.push_back(item);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn take_next(&mut self) -> Option<ReviewItem> {
        self.items.pop_front()
    }

    /// Remove and return the oldest item accepted by `pred`, leaving the rest in order.
    pub fn take_first_where(&mut self, pred: impl Fn(&ReviewItem) -> bool) -> Option<ReviewItem> {
        let index = self.items.iter().position(pred)?;
        self.items.remove(index)
    }

    /// Most recent misses first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ReviewItem> {
        self.items.iter().rev().take(n)
    }

    /// Oldest first, the order `from_items` expects.
    pub fn to_vec(&self) -> Vec<ReviewItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> ReviewItem {
        ReviewItem {
            verb: format!("verb{n}"),
            tense: "Présent".to_string(),
            pronoun: "je".to_string(),
            answer: format!("answer{n}"),
            timestamp: Utc::now(),
            verb_id: format!("verb{n}"),
            tense_id: "present".to_string(),
            pronoun_index: 0,
        }
    }

    #[test]
    fn test_bounded_keeps_most_recent() {
        let cap = 12;
        let mut queue = ReviewQueue::new(cap);
        for n in 0..cap + 5 {
            queue.add(item(n));
        }
        assert_eq!(queue.len(), cap);
        let kept: Vec<String> = queue.to_vec().into_iter().map(|i| i.verb).collect();
        let expected: Vec<String> = (5..cap + 5).map(|n| format!("verb{n}")).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_take_next_is_fifo_and_removes() {
        let mut queue = ReviewQueue::new(5);
        queue.add(item(1));
        queue.add(item(2));
        assert_eq!(queue.take_next().unwrap().verb, "verb1");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.take_next().unwrap().verb, "verb2");
        assert!(queue.take_next().is_none());
    }

    #[test]
    fn test_take_first_where_skips_without_removing() {
        let mut queue = ReviewQueue::new(5);
        for n in 0..3 {
            queue.add(item(n));
        }
        let taken = queue.take_first_where(|i| i.verb_id != "verb0").unwrap();
        assert_eq!(taken.verb, "verb1");
        assert!(queue.take_first_where(|i| i.verb_id == "missing").is_none());
        let left: Vec<String> = queue.to_vec().into_iter().map(|i| i.verb).collect();
        assert_eq!(left, vec!["verb0", "verb2"]);
    }

    #[test]
    fn test_deserialize_accepts_older_item_shape() {
        let json = r#"{"verb": "être", "tense": "Imparfait", "pronoun": "je",
                       "correct": "étais", "timestamp": 1700000000000}"#;
        let legacy: ReviewItem = serde_json::from_str(json).unwrap();
        assert_eq!(legacy.answer, "étais");
        assert_eq!(legacy.timestamp.timestamp_millis(), 1_700_000_000_000);
        assert!(legacy.verb_id.is_empty());
        assert_eq!(legacy.pronoun_index, 0);

        let current = item(4);
        let round: ReviewItem =
            serde_json::from_str(&serde_json::to_string(&current).unwrap()).unwrap();
        assert_eq!(round, current);
    }

    #[test]
    fn test_recent_lists_newest_first() {
        let mut queue = ReviewQueue::new(5);
        for n in 0..4 {
            queue.add(item(n));
        }
        let recent: Vec<&str> = queue.recent(2).map(|i| i.verb.as_str()).collect();
        assert_eq!(recent, vec!["verb3", "verb2"]);
    }

    #[test]
    fn test_repeat_miss_moves_to_back() {
        let mut queue = ReviewQueue::new(5);
        queue.add(item(1));
        queue.add(item(2));
        queue.add(item(1));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.take_next().unwrap().verb, "verb2");
    }

    #[test]
    fn test_items_without_ids_are_never_merged() {
        let mut queue = ReviewQueue::new(5);
        let mut legacy = item(1);
        legacy.verb_id.clear();
        queue.add(legacy.clone());
        queue.add(legacy);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_from_items_trims_to_capacity() {
        let items: Vec<ReviewItem> = (0..8).map(item).collect();
        let queue = ReviewQueue::from_items(items, 3);
        assert_eq!(queue.capacity(), 3);
        let kept: Vec<String> = queue.to_vec().into_iter().map(|i| i.verb).collect();
        assert_eq!(kept, vec!["verb5", "verb6", "verb7"]);
    }
}
