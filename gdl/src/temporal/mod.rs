//! Intervals and the interval/timestamp relations of the temporal extension.

pub mod functions;
pub mod interval;

pub use functions::{as_of, IntervalFunction, TemporalArg, TimestampFunction};
pub use interval::{conjoin, Constrained, Interval};
