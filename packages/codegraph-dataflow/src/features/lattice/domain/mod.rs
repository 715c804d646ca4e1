pub mod analysis_data;
pub mod entity_map;
pub mod map_domain;
pub mod value_domain;
