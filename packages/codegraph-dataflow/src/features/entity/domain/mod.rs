pub mod analysis_entity;
