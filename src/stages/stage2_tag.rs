/// Label for lemmas found in the deictic word set
pub const DEICTIC: &str = "deictic";
/// Label for every other lemma
pub const NON_DEICTIC: &str = "non-deictic";

/// German deictic words, deduplicated and trimmed
///
/// Matching is exact: lemmas are compared as-is, with no case folding.
pub const DEICTIC_WORDS: &[&str] = &[
    "anbei",
    "anliegend",
    "hier",
    "oben",
    "unten",
    "rechts",
    "links",
    "hiermit",
    "folgen",
    "da",
    "dort",
    "vor",
    "hinter",
    "hiesig",
    "hin",
    "her",
    "kommen",
    "gehen",
    "holen",
    "bringen",
    "hierhin",
    "dorthin",
    "vorn",
    "hinten",
    "herauf",
    "hinauf",
    "darin",
    "daraus",
    "davor",
    "dahinter",
    "darüber",
    "darunter",
    "drin",
    "drüber",
    "drunter",
];

/// Classify a lemma against the deictic word set
pub fn deictic_label(lemma: &str) -> &'static str {
    if DEICTIC_WORDS.contains(&lemma) {
        DEICTIC
    } else {
        NON_DEICTIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_round_trip() {
        for word in DEICTIC_WORDS {
            assert_eq!(deictic_label(word), DEICTIC);
        }
        for word in ["Haus", "laufen", "", "nan", "Hier", "DA"] {
            assert_eq!(deictic_label(word), NON_DEICTIC);
        }
    }

    #[test]
    fn test_no_duplicates_in_word_set() {
        let mut words: Vec<&str> = DEICTIC_WORDS.to_vec();
        words.sort_unstable();
        words.dedup();
        assert_eq!(words.len(), DEICTIC_WORDS.len());
    }

    #[test]
    fn test_words_are_trimmed() {
        for word in DEICTIC_WORDS {
            assert_eq!(*word, word.trim());
            assert!(!word.contains(','));
        }
    }
}
