pub mod ensemble;
pub mod session;
pub mod submission;
