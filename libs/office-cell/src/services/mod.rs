pub mod calendar;
pub mod directory;
