pub mod analyze;
pub mod apps;
pub mod health;
