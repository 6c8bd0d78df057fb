use crate::error::Error;

/// Server and share components of a `\\server\share\...` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncPath {
    pub server: String,
    pub share: String,
}

impl UncPath {
    pub fn to_unc(&self) -> String {
        format!(r"\\{}\{}", self.server, self.share)
    }
}

/// Split a remote name into server and share.
///
/// Both `\` and `/` are accepted as separators and anything past the share
/// (a subfolder mapping) is ignored. Local paths, bare hostnames and empty
/// components are rejected rather than guessed at.
pub fn parse_unc(remote_name: &str) -> Result<UncPath, Error> {
    let trimmed = remote_name.trim();
    let rest = trimmed
        .strip_prefix(r"\\")
        .or_else(|| trimmed.strip_prefix("//"))
        .ok_or_else(|| Error::InvalidUnc(remote_name.to_string()))?;

    let mut parts = rest.split(['\\', '/']);
    let server = parts.next().unwrap_or_default().trim();
    let share = parts.next().unwrap_or_default().trim();

    if server.is_empty() || share.is_empty() {
        return Err(Error::InvalidUnc(remote_name.to_string()));
    }

    Ok(UncPath {
        server: server.to_string(),
        share: share.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_unc() {
        let unc = parse_unc(r"\\FS01\Public").unwrap();
        assert_eq!(unc.server, "FS01");
        assert_eq!(unc.share, "Public");
        assert_eq!(unc.to_unc(), r"\\FS01\Public");
    }

    #[test]
    fn test_subfolder_mapping_keeps_share() {
        let unc = parse_unc(r"\\fs01.corp.local\Dept$\Finance\2024").unwrap();
        assert_eq!(unc.server, "fs01.corp.local");
        assert_eq!(unc.share, "Dept$");
    }

    #[test]
    fn test_forward_slashes() {
        let unc = parse_unc("//nas/media/").unwrap();
        assert_eq!(unc.server, "nas");
        assert_eq!(unc.share, "media");
    }

    #[test]
    fn test_malformed_paths_rejected() {
        for bad in [r"C:\Users", r"\\server", r"\\server\", r"\\\share", "", "FS01"] {
            assert!(
                matches!(parse_unc(bad), Err(Error::InvalidUnc(_))),
                "expected rejection for {:?}",
                bad
            );
        }
    }
}
