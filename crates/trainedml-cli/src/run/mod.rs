pub mod input;
pub mod pipeline;
