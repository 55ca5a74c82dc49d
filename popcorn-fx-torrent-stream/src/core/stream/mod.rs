pub use errors::*;
pub use handler::*;
pub use media_type::*;
pub use quirks::*;
pub use range::*;
pub use server::*;
pub use window::*;

mod errors;
mod handler;
mod media_type;
mod quirks;
mod range;
mod server;
mod window;
