use fake::Fake;
use fake::faker::internet::en::{Password, SafeEmail};
use fake::faker::lorem::en::{Paragraph, Sentences, Words};
use rand::Rng;
use rand::seq::index;

use crate::ports::fake_data::FakeDataSource;

/// [`FakeDataSource`] backed by `fake` lorem/internet generators and the thread RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakerDataSource;

fn inclusive(min: usize, max: usize) -> std::ops::Range<usize> {
    min..max.max(min) + 1
}

impl FakeDataSource for FakerDataSource {
    fn email(&self) -> String {
        SafeEmail().fake()
    }

    fn password(&self) -> String {
        Password(12..24).fake()
    }

    fn words(&self, min: usize, max: usize) -> String {
        let words: Vec<String> = Words(inclusive(min, max)).fake();
        words.join(" ")
    }

    fn paragraph(&self, min: usize, max: usize) -> String {
        Paragraph(inclusive(min, max)).fake()
    }

    fn lines(&self, min: usize, max: usize) -> String {
        let sentences: Vec<String> = Sentences(inclusive(min, max)).fake();
        sentences.join("\n")
    }

    fn number_between(&self, min: u32, max: u32) -> u32 {
        rand::rng().random_range(min..=max.max(min))
    }

    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize> {
        index::sample(&mut rand::rng(), len, amount.min(len)).into_vec()
    }

    fn coin_flip(&self) -> bool {
        rand::rng().random_bool(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_respects_bounds() {
        let faker = FakerDataSource;
        for _ in 0..20 {
            let count = faker.words(3, 10).split(' ').count();
            assert!((3..=10).contains(&count), "got {} words", count);
        }
    }

    #[test]
    fn test_lines_one_sentence_per_line() {
        let faker = FakerDataSource;
        let lines = faker.lines(2, 2);
        assert_eq!(lines.lines().count(), 2);
    }

    #[test]
    fn test_number_between_is_inclusive() {
        let faker = FakerDataSource;
        assert_eq!(faker.number_between(4, 4), 4);
        for _ in 0..50 {
            let n = faker.number_between(1, 5);
            assert!((1..=5).contains(&n));
        }
    }

    #[test]
    fn test_sample_indices_distinct_and_capped() {
        let faker = FakerDataSource;
        let mut picked = faker.sample_indices(5, 30);
        picked.sort_unstable();
        assert_eq!(picked, vec![0, 1, 2, 3, 4]);

        let some = faker.sample_indices(10, 3);
        assert_eq!(some.len(), 3);
        assert!(some.iter().all(|i| *i < 10));
    }

    #[test]
    fn test_email_looks_like_an_email() {
        assert!(FakerDataSource.email().contains('@'));
    }
}
