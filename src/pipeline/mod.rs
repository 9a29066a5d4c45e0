//! Email classification pipeline.
//!
//! Every email, or every unit of a multi-email input, flows through:
//! 1. `normalize_text()`: whitespace and newlines collapsed
//! 2. `CategoryClassifier::classify()`: heuristic or zero-shot category
//! 3. `SubIntentDetector::detect()`: regex sub-intent with signal trace
//! 4. Greeting override: weak Productive greetings become Unproductive
//!
//! Multi-email input is segmented by `splitter::split()` first.
//! **Classification never fails.** Remote problems degrade to the heuristic.

pub mod heuristic;
pub mod normalize;
pub mod processor;
pub mod rules;
pub mod splitter;
pub mod types;
