//! Sample accumulation shared by windowing stages.
//!
//! `SampleAccumulator` is owned by exactly one stage and is never shared;
//! all mutation goes through `&mut self`.

pub mod accumulator;

pub use accumulator::SampleAccumulator;
