pub use address::*;
pub use errors::*;
pub use server_settings::*;

mod address;
mod errors;
mod server_settings;
