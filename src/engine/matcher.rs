use icu_normalizer::DecomposingNormalizerBorrowed;

use crate::lexicon::Pronoun;

/// Apostrophes and elision marks that learners type interchangeably.
const ELISION_MARKS: [char; 6] = ['\'', '\u{2019}', '\u{2018}', '\u{02BC}', '`', '\u{00B4}'];

fn is_combining_diacritic(ch: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&ch)
}

/// Canonical comparison form: lowercase, no accents, no apostrophes,
/// single spaces between words.
pub fn normalize(input: &str) -> String {
    let nfd = DecomposingNormalizerBorrowed::new_nfd();
    let lowered = input.to_lowercase();
    let stripped: String = nfd
        .normalize(&lowered)
        .chars()
        .filter(|ch| !is_combining_diacritic(*ch) && !ELISION_MARKS.contains(ch))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn starts_with_vowel_sound(form: &str) -> bool {
    normalize(form)
        .chars()
        .next()
        .is_some_and(|ch| matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'h'))
}

/// Remove every "(...)" annotation. An unclosed '(' drops the rest of the text.
pub fn strip_parentheticals(form: &str) -> String {
    let mut out = String::with_capacity(form.len());
    let mut depth = 0usize;
    for ch in form.chars() {
        match ch {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(ch),
            _ => {}
        }
    }
    out
}

/// All normalized spellings accepted for `expected` asked with `pronoun`.
pub fn accepted_forms(expected: &str, pronoun: &Pronoun) -> Vec<String> {
    let mut bases = vec![normalize(expected)];
    let bare = normalize(&strip_parentheticals(expected));
    if !bases.contains(&bare) {
        bases.push(bare);
    }

    let mut forms = Vec::new();
    for base in &bases {
        push_unique(&mut forms, base.clone());
        for alt in pronoun.alternatives() {
            push_unique(&mut forms, normalize(&format!("{alt} {base}")));
        }
        if let Some(elided) = &pronoun.elided
            && starts_with_vowel_sound(base)
        {
            push_unique(&mut forms, normalize(&format!("{elided}{base}")));
        }
    }
    forms
}

fn push_unique(forms: &mut Vec<String>, form: String) {
    if !forms.contains(&form) {
        forms.push(form);
    }
}

pub fn matches(user_input: &str, expected: &str, pronoun: &Pronoun) -> bool {
    let answer = normalize(user_input);
    accepted_forms(expected, pronoun)
        .iter()
        .any(|form| *form == answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn je() -> Pronoun {
        Pronoun {
            id: "je".to_string(),
            fr: "je".to_string(),
            en: "I".to_string(),
            elided: Some("j'".to_string()),
        }
    }

    fn il() -> Pronoun {
        Pronoun {
            id: "il".to_string(),
            fr: "il / elle / on".to_string(),
            en: "he / she / one".to_string(),
            elided: None,
        }
    }

    #[test]
    fn test_normalize_strips_case_accents_and_spacing() {
        assert_eq!(normalize("  ÉTAIS  "), "etais");
        assert_eq!(normalize("avons \t  parlé"), "avons parle");
        assert_eq!(normalize("j'ai"), "jai");
        assert_eq!(normalize("j\u{2019}ai"), "jai");
        assert_eq!(normalize("Noël çà"), "noel ca");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "   ",
            "Être  Là",
            "j'ÉTAIS",
            "e\u{0301}te\u{0301}",
            "İstanbul",
            "ils / elles  ont été",
            "suis (présent)",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_case_and_accent_insensitive() {
        assert!(matches("ÉTAIS", "étais", &je()));
        assert!(matches("etais", "étais", &je()));
        assert!(!matches("etait", "étais", &je()));
    }

    #[test]
    fn test_elided_and_full_pronoun_prefix_accepted() {
        assert!(matches("j'ai", "ai", &je()));
        assert!(matches("je ai", "ai", &je()));
        assert!(matches("J’ai", "ai", &je()));
        assert!(matches("ai", "ai", &je()));
        assert!(!matches("j'parle", "parle", &je()));
        assert!(matches("je parle", "parle", &je()));
    }

    #[test]
    fn test_each_pronoun_alternative_accepted() {
        assert!(matches("il a parlé", "a parlé", &il()));
        assert!(matches("elle a parle", "a parlé", &il()));
        assert!(matches("on a parlé", "a parlé", &il()));
        assert!(!matches("ils a parlé", "a parlé", &il()));
    }

    #[test]
    fn test_parenthetical_annotation_optional() {
        assert!(matches("suis", "suis (présent)", &je()));
        assert!(matches("suis (présent)", "suis (présent)", &je()));
        assert!(matches("je suis", "suis (présent)", &je()));
        assert_eq!(strip_parentheticals("a (b) c (d"), "a  c ");
    }

    #[test]
    fn test_empty_answer_never_matches() {
        assert!(!matches("", "ai", &je()));
        assert!(!matches("   ", "parle", &je()));
    }

    #[test]
    fn test_wrong_tense_rejected() {
        assert!(!matches("parlerai", "parlerais", &je()));
        assert!(!matches("je parlais", "parle", &je()));
    }

    #[test]
    fn test_vowel_sound_detection() {
        assert!(starts_with_vowel_sound("étais"));
        assert!(starts_with_vowel_sound("habite"));
        assert!(starts_with_vowel_sound("Aurai"));
        assert!(!starts_with_vowel_sound("parle"));
        assert!(!starts_with_vowel_sound(""));
    }

    #[test]
    fn test_accepted_forms_are_deduplicated() {
        let forms = accepted_forms("ai", &je());
        assert_eq!(forms, vec!["ai", "je ai", "jai"]);
    }
}
