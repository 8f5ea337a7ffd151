pub mod engine;
pub mod log;
pub mod margin;
pub mod registry;
pub mod scheduler;
