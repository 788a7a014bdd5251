mod field_bus;

pub use field_bus::FieldBus;
