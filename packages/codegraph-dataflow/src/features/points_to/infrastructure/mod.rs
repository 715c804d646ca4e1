pub mod points_to_map;
