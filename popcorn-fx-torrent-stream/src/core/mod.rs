pub mod config;
pub mod stream;
pub mod torrents;
pub mod utils;
