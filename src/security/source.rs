//! Source allow-listing.
//!
//! # Responsibilities
//! - Classify allow-list entries as a literal address or a CIDR block
//! - Parse entries once, when endpoint policies are built
//! - Decide whether a client IP may call an endpoint
//!
//! # Design Decisions
//! - Empty allow-list = allow all (default-open)
//! - Entries are checked in configured order, first match wins
//! - An entry containing `/` is a CIDR block, anything else a literal address

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net};

/// Error returned when an allow-list entry is neither an IP nor a CIDR block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid allowed source {entry:?}: {reason}")]
pub struct InvalidSource {
    pub entry: String,
    pub reason: String,
}

/// A single allow-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedSource {
    /// Exact client address.
    Address(IpAddr),
    /// Address block, e.g. `10.0.0.0/24`.
    Network(IpNet),
}

impl AllowedSource {
    /// Returns true if `ip` is covered by this entry.
    pub fn matches(&self, ip: IpAddr) -> bool {
        match self {
            AllowedSource::Address(allowed) => *allowed == ip.to_canonical(),
            AllowedSource::Network(net) => net.contains(&ip.to_canonical()),
        }
    }
}

impl FromStr for AllowedSource {
    type Err = InvalidSource;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| InvalidSource {
            entry: entry.to_string(),
            reason,
        };

        if entry.contains('/') {
            entry
                .parse::<IpNet>()
                .map(|net| AllowedSource::Network(canonical_network(net)))
                .map_err(|e| invalid(e.to_string()))
        } else {
            entry
                .parse::<IpAddr>()
                .map(|ip| AllowedSource::Address(ip.to_canonical()))
                .map_err(|e| invalid(e.to_string()))
        }
    }
}

/// IPv4-mapped blocks (`::ffff:a.b.c.d/96+n`) become the IPv4 block `a.b.c.d/n`,
/// since clients are compared in canonical form.
fn canonical_network(net: IpNet) -> IpNet {
    match net {
        IpNet::V6(v6) if v6.prefix_len() >= 96 => match v6.addr().to_ipv4_mapped() {
            Some(v4) => Ipv4Net::new(v4, v6.prefix_len() - 96).map_or(net, IpNet::V4),
            None => net,
        },
        _ => net,
    }
}

impl fmt::Display for AllowedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedSource::Address(ip) => write!(f, "{}", ip),
            AllowedSource::Network(net) => write!(f, "{}", net),
        }
    }
}

/// Ordered set of sources permitted to call one endpoint.
///
/// A list configured with no entries admits every client. A list configured
/// with entries admits only clients matching one of the usable ones, even if
/// none of them survived lenient parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    sources: Vec<AllowedSource>,
    open: bool,
}

impl Default for AllowList {
    fn default() -> Self {
        Self::allow_all()
    }
}

impl AllowList {
    /// An allow-list that admits every client.
    pub fn allow_all() -> Self {
        Self {
            sources: Vec::new(),
            open: true,
        }
    }

    /// Parse every entry, failing on the first malformed one.
    pub fn parse<I, S>(entries: I) -> Result<Self, InvalidSource>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sources = entries
            .into_iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from(sources))
    }

    /// Parse entries, skipping any that are malformed.
    pub fn parse_lenient<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut configured = 0usize;
        let sources: Vec<AllowedSource> = entries
            .into_iter()
            .inspect(|_| configured += 1)
            .filter_map(|entry| match entry.as_ref().parse() {
                Ok(source) => Some(source),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping allowed source");
                    None
                }
            })
            .collect();
        Self {
            sources,
            open: configured == 0,
        }
    }

    /// Returns true if `ip` may call the endpoint.
    pub fn is_allowed(&self, ip: IpAddr) -> bool {
        self.open || self.sources.iter().any(|source| source.matches(ip))
    }

    /// True when no entries were configured.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllowedSource> {
        self.sources.iter()
    }
}

impl From<Vec<AllowedSource>> for AllowList {
    fn from(sources: Vec<AllowedSource>) -> Self {
        let open = sources.is_empty();
        Self { sources, open }
    }
}
