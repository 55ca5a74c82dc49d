pub use errors::*;
pub use file::*;
pub use registry::*;
pub use service::*;
pub use torrent::*;
pub use torrent_stream::*;

mod errors;
mod file;
mod registry;
mod service;
mod torrent;
mod torrent_stream;
