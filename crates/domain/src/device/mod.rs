mod unit_id;

pub use unit_id::UnitId;
