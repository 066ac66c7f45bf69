// Aggregation core for the Australian speeding-fine statistics dashboard.
//
// Raw CSV/GeoJSON rows flow through the normalizer into canonical records,
// the aggregator folds them into per-state and national summaries, the
// comparator derives rankings and movement facts, and the narrative module
// renders deterministic story text. The binary in `main.rs` is a thin
// console front end over these modules.
pub mod aggregate;
pub mod domain;
pub mod loader;
pub mod narrative;
pub mod normalize;
pub mod output;
pub mod rank;
pub mod types;
pub mod util;
