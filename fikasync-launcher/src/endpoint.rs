//! Server address discovery and port probing.

use std::fmt;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;

use crate::error::LaunchError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 6969;

/// Connect timeout used while waiting for the server.
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Config files consulted in order, relative to the server directory.
const CONFIG_CANDIDATES: [&[&str]; 2] = [
    &["user", "mods", "fika-server", "assets", "configs", "fika.jsonc"],
    &["SPT_data", "Server", "configs", "http.json"],
];

const PORT_PATTERN: &str = r#""port"\s*:\s*(\d+)"#;
const IP_PATTERN: &str = r#""ip"\s*:\s*"([^"]+)""#;
const WILDCARD_IP: &str = "0.0.0.0";

/// Address the SPT server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    /// Config file the address was read from, if any.
    pub source: Option<PathBuf>,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            source: None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Find the server address in the first existing config under `server_dir`.
///
/// Config files are loosely structured (`.jsonc`), so the `"port"` and
/// `"ip"` values are picked out with patterns instead of a JSON parser.
/// Missing values keep their defaults; a wildcard bind address maps to
/// loopback.
pub fn detect_endpoint(server_dir: &Path) -> Endpoint {
    for parts in CONFIG_CANDIDATES {
        let path = parts.iter().fold(server_dir.to_path_buf(), |p, part| p.join(part));
        if !path.is_file() {
            continue;
        }
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "server config unreadable");
                continue;
            }
        };
        match parse_endpoint(&content) {
            Ok(mut endpoint) => {
                endpoint.source = Some(path);
                tracing::info!(%endpoint, "server config found");
                return endpoint;
            }
            Err(err) => tracing::debug!(path = %path.display(), error = %err, "server config not parsed"),
        }
    }
    let endpoint = Endpoint::default();
    tracing::info!(%endpoint, "no server config found, using default address");
    endpoint
}

/// Extract the address from config text, defaulting missing parts.
pub fn parse_endpoint(content: &str) -> Result<Endpoint, LaunchError> {
    let mut endpoint = Endpoint::default();

    let port = Regex::new(PORT_PATTERN)?;
    if let Some(found) = port
        .captures(content)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
    {
        endpoint.port = found;
    }

    let ip = Regex::new(IP_PATTERN)?;
    if let Some(found) = ip.captures(content).and_then(|c| c.get(1)) {
        endpoint.host = match found.as_str() {
            WILDCARD_IP => DEFAULT_HOST.to_string(),
            other => other.to_string(),
        };
    }
    Ok(endpoint)
}

/// Whether a TCP connection to `endpoint` succeeds within `timeout`.
pub fn port_open(endpoint: &Endpoint, timeout: Duration) -> bool {
    let Ok(addrs) = (endpoint.host.as_str(), endpoint.port).to_socket_addrs() else {
        return false;
    };
    addrs
        .into_iter()
        .any(|addr| TcpStream::connect_timeout(&addr, timeout).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::TempDir;

    #[rstest]
    #[case(r#"{"ip": "192.168.1.5", "port": 7000}"#, "192.168.1.5", 7000)]
    #[case(r#"{ "port":6970, "ip":"0.0.0.0" }"#, "127.0.0.1", 6970)]
    #[case("// comment\n{\n  \"server\": {\n    \"port\": 25565\n  }\n}", "127.0.0.1", 25565)]
    #[case(r#"{"port": 99999999}"#, "127.0.0.1", 6969)]
    #[case("", "127.0.0.1", 6969)]
    fn parse_cases(#[case] content: &str, #[case] host: &str, #[case] port: u16) {
        let endpoint = parse_endpoint(content).unwrap();
        assert_eq!(endpoint.host, host);
        assert_eq!(endpoint.port, port);
    }

    #[test]
    fn fika_config_wins_over_http_config() {
        let dir = TempDir::new().unwrap();
        let fika = dir.path().join("user/mods/fika-server/assets/configs");
        let http = dir.path().join("SPT_data/Server/configs");
        fs::create_dir_all(&fika).unwrap();
        fs::create_dir_all(&http).unwrap();
        fs::write(fika.join("fika.jsonc"), r#"{"port": 7001}"#).unwrap();
        fs::write(http.join("http.json"), r#"{"port": 7002}"#).unwrap();

        let endpoint = detect_endpoint(dir.path());

        assert_eq!(endpoint.port, 7001);
        assert_eq!(endpoint.source, Some(fika.join("fika.jsonc")));
    }

    #[test]
    fn missing_configs_use_default() {
        let dir = TempDir::new().unwrap();
        let endpoint = detect_endpoint(dir.path());
        assert_eq!(endpoint, Endpoint::default());
        assert_eq!(endpoint.to_string(), "127.0.0.1:6969");
    }

    #[test]
    fn port_check_sees_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let endpoint = Endpoint {
            port,
            ..Endpoint::default()
        };

        assert!(port_open(&endpoint, CONNECT_TIMEOUT));
        drop(listener);
        assert!(!port_open(&endpoint, CONNECT_TIMEOUT));
    }
}
