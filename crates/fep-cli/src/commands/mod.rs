pub mod merge;
pub mod prepare;
