//! Words and Alphabet
//!
//! Monomial "extended letters", the words built from them, and the bracket
//! notation used to write words down:
//!
//! ```text
//! [11][122]        letter {ch1^2} then letter {ch1 * ch2^2}
//! [(12)^3]         channel 12 cubed
//! [1]{0.5}[2]      gap penalization alpha = 0.5 between the two letters
//! ```
//!
//! Channel labels in the notation are 1-based; the structured types use
//! 0-based channel indices.

mod error;
mod generation;
mod letter;
mod notation;
mod word;

pub use error::WordError;
pub use generation::{letters_of_weight, simple_words_by_weight};
pub use letter::{ExtendedLetter, MAX_EXPONENT};
pub use notation::{parse_word, parse_word_for, serialize_word};
pub use word::Word;
