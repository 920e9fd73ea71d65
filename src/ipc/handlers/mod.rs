pub mod auth;
pub mod core;
pub mod payments;
pub mod private;
pub mod students;
pub mod subjects;
pub mod teachers;
