/// Port trait for the random values used when seeding demo data.
///
/// The production implementation lives in `services::seed::faker`; tests use the
/// generated `MockFakeDataSource`.
#[cfg_attr(test, mockall::automock)]
pub trait FakeDataSource: Send + Sync {
    fn email(&self) -> String;

    fn password(&self) -> String;

    /// Between `min` and `max` lorem words joined by spaces.
    fn words(&self, min: usize, max: usize) -> String;

    /// A lorem paragraph of `min..=max` sentences.
    fn paragraph(&self, min: usize, max: usize) -> String;

    /// `min..=max` lorem sentences, one per line.
    fn lines(&self, min: usize, max: usize) -> String;

    /// Uniform integer in `min..=max`.
    fn number_between(&self, min: u32, max: u32) -> u32;

    /// `amount` distinct indices below `len`. `amount` is capped at `len`.
    fn sample_indices(&self, len: usize, amount: usize) -> Vec<usize>;

    fn coin_flip(&self) -> bool;
}
