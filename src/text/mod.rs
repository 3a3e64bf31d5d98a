// Text normalization: lowercasing, tokenizing, and stopword removal.

pub mod normalizer;

pub use normalizer::TextNormalizer;
