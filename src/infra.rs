pub mod cli_driver;
pub mod config;
pub mod shell_hooks;

pub use cli_driver::CliDriver;
pub use config::{Config, load_config};
pub use shell_hooks::ShellHookRunner;
