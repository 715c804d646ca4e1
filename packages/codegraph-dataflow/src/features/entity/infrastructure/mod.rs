pub mod entity_factory;
