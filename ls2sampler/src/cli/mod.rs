pub mod app;
pub mod convert;

pub use app::Cli;
