//! Command handlers for the specfall CLI.

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod view;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use view::handle_view;
