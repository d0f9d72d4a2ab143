pub mod files;
pub mod pipeline;
pub mod projects;
pub mod reports;
pub mod util;
pub mod workspace;

pub use files::*;
pub use pipeline::*;
pub use projects::*;
pub use reports::*;
pub use util::*;
pub use workspace::*;
