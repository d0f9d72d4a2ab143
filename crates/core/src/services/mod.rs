pub mod analysis;
pub mod decompile;
pub mod fuzz;
pub mod generator;
pub mod probe;
pub mod report;
pub mod selector;
pub mod stubs;
pub mod workflow;
