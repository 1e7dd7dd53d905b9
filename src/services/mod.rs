pub mod analysis;
pub mod insights;
pub mod itunes;
pub mod phrases;
pub mod reviews;
pub mod sentiment;
