//! Swing-trade signal module.
//!
//! Provides the technical indicator calculations and the heuristic
//! classifier that turns them into trade levels and a probability score.

pub mod classifier;
pub mod indicators;

pub use classifier::{
    classify_trend, risk_to_reward, Classification, SignalClassifier, SignalHeuristics,
    TradeLevels,
};
pub use indicators::{compute_indicators, Indicator};
