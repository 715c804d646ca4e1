pub mod forker;
