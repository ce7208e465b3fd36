//! Property-based tests for counter arithmetic, crib layering, and scene sanitization

mod counters;
