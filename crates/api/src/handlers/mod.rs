pub mod dashboard;
pub mod todo;
