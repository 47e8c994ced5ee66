pub mod app;
pub mod common;

pub use app::AppContext;
