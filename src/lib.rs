pub mod cli;
pub mod consolidate;
pub mod ctx;
pub mod groups;
pub mod input;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod schema;
pub mod trend;
