pub mod field_types;
pub mod health;
pub mod submissions;
