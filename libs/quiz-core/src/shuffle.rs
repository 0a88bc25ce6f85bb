//! Choice randomization for presentation.
//!
//! Only the presented order changes. The canonical answer is never touched,
//! and verification always runs against stored data.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::Question;

/// Return a uniformly shuffled copy of `choices` using the thread RNG.
pub fn shuffle_choices<T: Clone>(choices: &[T]) -> Vec<T> {
    shuffle_with(choices, &mut rand::thread_rng())
}

/// Return a uniformly shuffled copy of `choices` (Fisher-Yates).
///
/// Inputs with zero or one element come back unchanged.
pub fn shuffle_with<T: Clone, R: Rng + ?Sized>(choices: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = choices.to_vec();
    if shuffled.len() > 1 {
        shuffled.shuffle(rng);
    }
    shuffled
}

/// Shuffle a question's presented choices if its kind has any.
pub fn shuffle_for_presentation(question: &mut Question) {
    if question.kind.has_choices() {
        question.choices = shuffle_choices(&question.choices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sorted(mut items: Vec<String>) -> Vec<String> {
        items.sort();
        items
    }

    #[test]
    fn empty_and_single_are_unchanged() {
        let empty: Vec<String> = vec![];
        assert!(shuffle_choices(&empty).is_empty());
        assert_eq!(shuffle_choices(&["x".to_string()]), vec!["x".to_string()]);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let input: Vec<String> = ["a", "b", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();

        for _ in 0..50 {
            let output = shuffle_with(&input, &mut rng);
            assert_eq!(output.len(), input.len());
            assert_eq!(sorted(output), sorted(input.clone()));
        }
    }

    #[test]
    fn shuffle_eventually_reorders() {
        let mut rng = StdRng::seed_from_u64(42);
        let input: Vec<u32> = (0..8).collect();
        let reordered = (0..20).any(|_| shuffle_with(&input, &mut rng) != input);
        assert!(reordered);
    }

    #[test]
    fn every_position_is_reachable() {
        let mut rng = StdRng::seed_from_u64(1);
        let input = vec!['a', 'b', 'c'];
        let mut firsts = std::collections::HashSet::new();
        for _ in 0..200 {
            firsts.insert(shuffle_with(&input, &mut rng)[0]);
        }
        assert_eq!(firsts.len(), 3);
    }
}
