use crate::config::BlacklistEntry;
use crate::error::Error;
use crate::pattern::WildcardPattern;
use crate::storage::Database;
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct Rule {
    server: WildcardPattern,
    share: WildcardPattern,
    domain: WildcardPattern,
}

/// Administratively blocked servers and shares.
///
/// A rule whose share is empty or `*` blocks the whole server; otherwise it
/// blocks matching shares only.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    rules: Vec<Rule>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistSummary {
    pub servers_deactivated: usize,
    pub shares_deactivated: usize,
}

impl Blacklist {
    pub fn from_entries(entries: &[BlacklistEntry]) -> Result<Self, Error> {
        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.server.trim().is_empty() && entry.share.trim().is_empty() {
                warn!("Ignoring blacklist entry with neither server nor share: {:?}", entry);
                continue;
            }
            rules.push(Rule {
                server: WildcardPattern::new(&entry.server)?,
                share: WildcardPattern::new(&entry.share)?,
                domain: WildcardPattern::new(&entry.domain)?,
            });
        }
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn blocks_server(&self, hostname: &str, domain: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.share.matches_all() && rule.server.matches(hostname) && rule.domain.matches(domain)
        })
    }

    pub fn blocks_share(&self, hostname: &str, domain: &str, share: &str) -> bool {
        self.rules.iter().any(|rule| {
            rule.server.matches(hostname) && rule.domain.matches(domain) && rule.share.matches(share)
        })
    }

    /// Deactivate every stored server and share the rules cover.
    ///
    /// Only flips active → inactive; reactivation is a manual decision.
    pub fn apply(&self, db: &Database) -> Result<BlacklistSummary, Error> {
        let mut summary = BlacklistSummary::default();
        if self.is_empty() {
            return Ok(summary);
        }

        for mut server in db.list_servers()? {
            if server.active && self.blocks_server(&server.hostname, &server.domain) {
                server.set_active(db, false)?;
                info!("Blacklisted server {} ({})", server.hostname, server.domain);
                summary.servers_deactivated += 1;
            }
        }

        for mut view in db.list_shares()? {
            let server = &view.server;
            if !server.active || !view.share.active {
                continue;
            }
            if self.blocks_share(&server.hostname, &server.domain, &view.share.share_name) {
                view.share.set_active(db, false)?;
                info!(
                    r"Blacklisted share \\{}\{}",
                    server.hostname, view.share.share_name
                );
                summary.shares_deactivated += 1;
            }
        }

        Ok(summary)
    }
}

/// Set `active` on every stored server matching the wildcard patterns.
/// Returns how many servers changed state.
pub fn set_servers_active(
    db: &Database,
    hostname: &str,
    domain: &str,
    active: bool,
) -> Result<usize, Error> {
    let hostname = WildcardPattern::new(hostname)?;
    let domain = WildcardPattern::new(domain)?;
    let mut changed = 0;
    for mut server in db.list_servers()? {
        if server.active != active
            && hostname.matches(&server.hostname)
            && domain.matches(&server.domain)
        {
            server.set_active(db, active)?;
            info!(
                "Server {} ({}) marked {}",
                server.hostname,
                server.domain,
                if active { "active" } else { "inactive" }
            );
            changed += 1;
        }
    }
    Ok(changed)
}

/// Set `active` on every stored share matching the wildcard patterns.
pub fn set_shares_active(
    db: &Database,
    hostname: &str,
    share: &str,
    active: bool,
) -> Result<usize, Error> {
    let hostname = WildcardPattern::new(hostname)?;
    let share_name = WildcardPattern::new(share)?;
    let mut changed = 0;
    for mut view in db.list_shares()? {
        if view.share.active != active
            && hostname.matches(&view.server.hostname)
            && share_name.matches(&view.share.share_name)
        {
            view.share.set_active(db, active)?;
            info!(
                r"Share \\{}\{} marked {}",
                view.server.hostname,
                view.share.share_name,
                if active { "active" } else { "inactive" }
            );
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(server: &str, share: &str, domain: &str) -> BlacklistEntry {
        BlacklistEntry {
            server: server.to_string(),
            share: share.to_string(),
            domain: domain.to_string(),
        }
    }

    #[test]
    fn test_whole_server_rule() {
        let list = Blacklist::from_entries(&[entry("OLDFS*", "*", "")]).unwrap();
        assert!(list.blocks_server("oldfs01", "CORP"));
        assert!(list.blocks_share("oldfs01", "CORP", "Public"));
        assert!(!list.blocks_server("FS01", "CORP"));
    }

    #[test]
    fn test_share_rule_does_not_block_server() {
        let list = Blacklist::from_entries(&[entry("FS01", "Scratch", "CORP")]).unwrap();
        assert!(!list.blocks_server("FS01", "CORP"));
        assert!(list.blocks_share("fs01", "corp", "scratch"));
        assert!(!list.blocks_share("FS01", "CORP", "Public"));
        assert!(!list.blocks_share("FS01", "LAB", "Scratch"));
    }

    #[test]
    fn test_empty_entry_ignored() {
        let list = Blacklist::from_entries(&[entry("", "", "CORP")]).unwrap();
        assert!(list.is_empty());
        assert!(!list.blocks_server("FS01", "CORP"));
    }
}
