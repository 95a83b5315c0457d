pub mod dot;
pub mod order;
pub mod render;
pub mod report;
