pub mod feedback;
pub mod handlers;
pub mod questions;
pub mod session;
