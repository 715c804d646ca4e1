pub mod analysis_context;
