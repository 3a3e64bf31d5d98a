// Pairing and scoring: match patents to abstracts and compute similarity.

pub mod metadata;
pub mod pairing;
pub mod similarity;

pub use pairing::{pair_and_score, SimilarityRecord};
