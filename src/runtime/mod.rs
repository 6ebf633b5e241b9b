pub mod task;
pub mod workflow;
pub mod catalog;
pub mod clock;
pub mod ids;
pub mod context;
pub mod delegate;
pub mod expr;
pub mod decider;
