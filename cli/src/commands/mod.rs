pub mod cli;
pub mod portal;
pub mod session;
