pub mod abstract_location;
pub mod points_to_value;
