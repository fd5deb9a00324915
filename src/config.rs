use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: String,
    pub backend_protocol: String,
    pub backend_host: String,
    pub backend_port: String,
    pub upstream_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let backend_protocol = env::var("BACKEND_PROTOCOL").unwrap_or_else(|_| "http".to_string());
        let backend_host = env::var("BACKEND_HOST").unwrap_or_else(|_| "localhost".to_string());
        let backend_port = env::var("BACKEND_PORT").unwrap_or_else(|_| "8000".to_string());
        let upstream_timeout_secs = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);

        Ok(Self {
            bind_addr,
            backend_protocol,
            backend_host,
            backend_port,
            upstream_timeout_secs,
        })
    }

    fn backend_base(&self) -> String {
        format!(
            "{}://{}:{}",
            self.backend_protocol, self.backend_host, self.backend_port
        )
    }

    pub fn citas_url(&self) -> String {
        format!("{}/Modulos/Citas/", self.backend_base())
    }

    pub fn catalogos_url(&self) -> String {
        format!("{}/Catalogos/", self.backend_base())
    }
}
