mod permalinks;
mod resolve;
mod selectors;

pub use permalinks::cmd_permalinks;
pub use resolve::cmd_resolve;
pub use selectors::cmd_selectors;
