use tracing::warn;

/// The account and machine a run is recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub hostname: String,
}

impl Identity {
    pub fn new(username: &str, hostname: &str) -> Self {
        Self {
            username: username.to_string(),
            hostname: hostname.to_string(),
        }
    }

    /// The logged-on user and this machine's hostname.
    pub fn current() -> Self {
        let hostname = match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                warn!("Could not read hostname, using device name: {}", e);
                whoami::devicename()
            }
        };
        Self {
            username: whoami::username(),
            hostname,
        }
    }
}
