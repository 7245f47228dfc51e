//! Goal-guided link ranking
//!
//! Scores every outbound link of a page with fixed, additive heuristics:
//! directory and navigation vocabulary, accessibility hints and goal keywords
//! add points; foreign hosts, utility chrome and account/legal/social links
//! take them away. No model, no randomness.

pub mod keywords;
pub mod models;
pub mod ranker;

pub use keywords::{keyword_stem, GoalKeywordExtractor};
pub use models::{Candidate, RankerWeights};
pub use ranker::IntentRanker;
