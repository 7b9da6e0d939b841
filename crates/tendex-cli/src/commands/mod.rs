pub mod batch;
pub mod corpus;
pub mod process;
