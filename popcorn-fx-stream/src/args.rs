use clap::Parser;
use derive_more::Display;
use log::LevelFilter;
use popcorn_fx_torrent_stream::core::config;
use popcorn_fx_torrent_stream::core::config::ServerSettings;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// The options of the stream application.
#[derive(Debug, Clone, Display, Parser)]
#[command(name = "popcorn-fx-stream", version, about)]
#[display("port: {:?}, host: {:?}, config: {:?}, files: {:?}", port, host, config, files)]
pub struct StreamArgs {
    /// The port to listen on, the OS assigns a free port when omitted.
    #[arg(short, long)]
    pub port: Option<u16>,
    /// The host which is advertised within the stream urls.
    /// The local network address is used when omitted.
    #[arg(long)]
    pub host: Option<IpAddr>,
    /// The YAML file containing the server settings.
    /// The `--port` and `--host` options take precedence over the file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// The root log level.
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,
    /// The rolling log file to write to, next to the console.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// The video files to stream.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl StreamArgs {
    /// Returns the server settings of the arguments.
    pub fn settings(&self) -> config::Result<ServerSettings> {
        let mut settings = match self.config.as_ref() {
            None => ServerSettings::default(),
            Some(path) => ServerSettings::from_file(path)?,
        };

        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(host) = self.host {
            settings.host = Some(host);
        }

        Ok(settings)
    }
}

fn parse_log_level(value: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(value).map_err(|e| e.to_string())
}
