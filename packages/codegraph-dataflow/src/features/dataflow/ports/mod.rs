//! Client port: the analysis-specific half of a dataflow run

pub mod client;

pub use client::{DataFlowClient, InvocationOutcome, InvocationSite, ValueOf, VisitContext};
