// Answer-to-option matching: normalization, edit distance, synonym and
// smart-default tables, and the tiered engine that ties them together.
// Everything here is pure and synchronous.

pub mod dates;
pub mod defaults;
pub mod engine;
pub mod levenshtein;
pub mod normalize;
pub mod synonyms;
