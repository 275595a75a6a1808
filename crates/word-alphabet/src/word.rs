//! Words (ordered sequences of extended letters)

use crate::{notation, ExtendedLetter, WordError};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// An ordered sequence of extended letters defining one iterated sum
///
/// Besides the letters, a word carries one penalization weight per gap
/// between consecutive letters (`alphas.len() == len() - 1`). A zero weight
/// means no penalization.
#[derive(Debug, Clone, Default)]
pub struct Word {
    letters: Vec<ExtendedLetter>,
    alphas: Vec<f64>,
}

impl Word {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an unpenalized word from letters
    pub fn from_letters(letters: Vec<ExtendedLetter>) -> Self {
        let alphas = vec![0.0; letters.len().saturating_sub(1)];
        Self { letters, alphas }
    }

    /// Append a letter with no gap penalization
    pub fn push(&mut self, letter: ExtendedLetter) {
        self.push_with_gap(0.0, letter);
    }

    /// Append a letter, penalizing the gap to the previous letter by `alpha`
    pub fn push_with_gap(&mut self, alpha: f64, letter: ExtendedLetter) {
        if !self.letters.is_empty() {
            self.alphas.push(normalize_alpha(alpha));
        }
        self.letters.push(letter);
    }

    /// Replace all gap weights
    pub fn with_alphas(mut self, alphas: Vec<f64>) -> Result<Self, WordError> {
        let expected = self.letters.len().saturating_sub(1);
        if alphas.len() != expected {
            return Err(WordError::malformed(
                &self.to_string(),
                format!("expected {} gap weights, got {}", expected, alphas.len()),
            ));
        }
        if let Some(bad) = alphas.iter().find(|a| !a.is_finite() || **a < 0.0) {
            return Err(WordError::malformed(
                &self.to_string(),
                format!("gap weight {} must be finite and non-negative", bad),
            ));
        }
        self.alphas = alphas.into_iter().map(normalize_alpha).collect();
        Ok(self)
    }

    /// Number of letters (the degree of the iterated sum)
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn letters(&self) -> &[ExtendedLetter] {
        &self.letters
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas
    }

    /// Gap weight between letter `index - 1` and letter `index`
    pub fn gap_before(&self, index: usize) -> f64 {
        if index == 0 {
            0.0
        } else {
            self.alphas.get(index - 1).copied().unwrap_or(0.0)
        }
    }

    /// Whether any gap is penalized
    pub fn is_weighted(&self) -> bool {
        self.alphas.iter().any(|&a| a != 0.0)
    }

    /// The first `k` letters (with their gaps) as a word
    pub fn prefix(&self, k: usize) -> Word {
        let k = k.min(self.letters.len());
        Word {
            letters: self.letters[..k].to_vec(),
            alphas: self.alphas[..k.saturating_sub(1)].to_vec(),
        }
    }

    /// Largest channel index referenced by any letter
    pub fn max_channel(&self) -> Option<usize> {
        self.letters.iter().filter_map(ExtendedLetter::max_channel).max()
    }

    /// Sum of the weights of all letters
    pub fn weight(&self) -> u32 {
        self.letters
            .iter()
            .fold(0u32, |total, letter| total.saturating_add(letter.weight()))
    }

    /// Check that every channel index is below `channels`
    pub fn validate(&self, channels: usize) -> Result<(), WordError> {
        if self.letters.iter().any(ExtendedLetter::is_empty) {
            return Err(WordError::malformed(&self.to_string(), "empty extended letter"));
        }
        match self.max_channel() {
            Some(c) if c >= channels => Err(WordError::malformed(
                &self.to_string(),
                format!(
                    "channel label {} exceeds configured channel count {}",
                    c + 1,
                    channels
                ),
            )),
            _ => Ok(()),
        }
    }
}

fn normalize_alpha(alpha: f64) -> f64 {
    // -0.0 and 0.0 must hash identically
    if alpha == 0.0 {
        0.0
    } else {
        alpha
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.letters == other.letters
            && self.alphas.len() == other.alphas.len()
            && self
                .alphas
                .iter()
                .zip(&other.alphas)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl Eq for Word {}

impl Hash for Word {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.letters.hash(state);
        for alpha in &self.alphas {
            alpha.to_bits().hash(state);
        }
    }
}

impl Ord for Word {
    fn cmp(&self, other: &Self) -> Ordering {
        self.letters.cmp(&other.letters).then_with(|| {
            for (a, b) in self.alphas.iter().zip(&other.alphas) {
                match a.total_cmp(b) {
                    Ordering::Equal => continue,
                    ord => return ord,
                }
            }
            self.alphas.len().cmp(&other.alphas.len())
        })
    }
}

impl PartialOrd for Word {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&notation::serialize_word(self))
    }
}

impl FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        notation::parse_word(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        s.parse().unwrap()
    }

    #[test]
    fn test_prefix() {
        let w = word("[1]{0.5}[12][2]");
        let p = w.prefix(2);
        assert_eq!(p, word("[1]{0.5}[12]"));
        assert_eq!(p.alphas(), &[0.5]);
        assert_eq!(w.prefix(0), Word::new());
        assert_eq!(w.prefix(10), w);
    }

    #[test]
    fn test_alphas_take_part_in_equality() {
        assert_ne!(word("[1][2]"), word("[1]{0.1}[2]"));
        assert_eq!(word("[1]{0}[2]"), word("[1][2]"));
    }

    #[test]
    fn test_with_alphas_validation() {
        let w = word("[1][2][3]");
        assert!(w.clone().with_alphas(vec![0.1]).is_err());
        assert!(w.clone().with_alphas(vec![0.1, -1.0]).is_err());
        let weighted = w.with_alphas(vec![0.1, 0.2]).unwrap();
        assert_eq!(weighted.gap_before(2), 0.2);
        assert!(weighted.is_weighted());
    }

    #[test]
    fn test_validate_channels() {
        let w = word("[13][2]");
        assert!(w.validate(3).is_ok());
        assert!(matches!(w.validate(2), Err(WordError::MalformedWord { .. })));
    }

    #[test]
    fn test_sorting_is_deterministic() {
        let mut words = vec![word("[2]"), word("[1][1]"), word("[11]"), word("[1]")];
        words.sort();
        let sorted: Vec<String> = words.iter().map(Word::to_string).collect();
        assert_eq!(sorted, vec!["[1]", "[1][1]", "[11]", "[2]"]);
    }

    #[test]
    fn test_weight_and_max_channel() {
        let w = word("[11][122]");
        assert_eq!(w.len(), 2);
        assert_eq!(w.weight(), 5);
        assert_eq!(w.max_channel(), Some(1));
    }
}
