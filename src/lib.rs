// abstract2vec: score patents against their candidate abstracts.
//
// This is the library root. Each module corresponds to a stage of the
// batch pipeline: normalize text, load the corpus, train vectors, pair and
// score, export.

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod status;
pub mod text;
