//! Word Generation

use crate::{ExtendedLetter, Word};

/// All extended letters of total degree `weight` over `dim` channels
///
/// Letters are returned in ascending order.
pub fn letters_of_weight(weight: u32, dim: usize) -> Vec<ExtendedLetter> {
    let mut letters = Vec::new();
    if weight == 0 || dim == 0 {
        return letters;
    }
    let mut exponents = vec![0u32; dim];
    distribute(weight, 0, &mut exponents, &mut letters);
    letters.sort();
    letters
}

fn distribute(
    remaining: u32,
    channel: usize,
    exponents: &mut [u32],
    out: &mut Vec<ExtendedLetter>,
) {
    if channel == exponents.len() - 1 {
        exponents[channel] = remaining;
        out.push(ExtendedLetter::from_pairs(
            exponents.iter().enumerate().map(|(c, &e)| (c, e)),
        ));
        return;
    }
    for e in (0..=remaining).rev() {
        exponents[channel] = e;
        distribute(remaining - e, channel + 1, exponents, out);
    }
    exponents[channel] = 0;
}

/// Every word over `dim` channels whose total weight lies in `1..=max_weight`
///
/// The weight of a word is the sum of the exponents of all its letters, so
/// `[11]` and `[1][1]` both have weight 2. Words are returned sorted.
pub fn simple_words_by_weight(max_weight: u32, dim: usize) -> Vec<Word> {
    if max_weight == 0 || dim == 0 {
        return Vec::new();
    }
    let letters: Vec<Vec<ExtendedLetter>> = (0..=max_weight)
        .map(|w| letters_of_weight(w, dim))
        .collect();

    let mut words = Vec::new();
    let mut current = Vec::new();
    extend_words(max_weight, &letters, &mut current, &mut words);
    words.sort();
    words
}

fn extend_words(
    budget: u32,
    letters: &[Vec<ExtendedLetter>],
    current: &mut Vec<ExtendedLetter>,
    out: &mut Vec<Word>,
) {
    for weight in 1..=budget {
        for letter in &letters[weight as usize] {
            current.push(letter.clone());
            out.push(Word::from_letters(current.clone()));
            extend_words(budget - weight, letters, current, out);
            current.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_of_weight() {
        let letters = letters_of_weight(2, 2);
        let written: Vec<String> = letters
            .into_iter()
            .map(|l| Word::from_letters(vec![l]).to_string())
            .collect();
        assert_eq!(written, vec!["[12]", "[11]", "[22]"]);
    }

    #[test]
    fn test_words_by_weight_counts() {
        // weight 1: [1] / weight 2: [11], [1][1]
        assert_eq!(simple_words_by_weight(2, 1).len(), 3);
        // weight 1: 2 words / weight 2: 3 single letters + 4 two-letter words
        assert_eq!(simple_words_by_weight(2, 2).len(), 9);
    }

    #[test]
    fn test_words_are_sorted_and_unique() {
        let words = simple_words_by_weight(4, 2);
        for pair in words.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(words.iter().all(|w| (1..=4).contains(&w.weight())));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(simple_words_by_weight(0, 3).is_empty());
        assert!(simple_words_by_weight(3, 0).is_empty());
        assert!(letters_of_weight(0, 2).is_empty());
    }
}
