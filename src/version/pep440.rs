//! PEP 440 version parsing.
//!
//! Accepts every spelling PEP 440 permits (alternate separators, `alpha`/
//! `preview`/`rev` synonyms, implicit numbers, mixed case, a leading `v`) and
//! reduces it to its canonical components.

use regex::{Captures, Regex};
use std::{fmt, str::FromStr, sync::LazyLock};

use crate::error::{Result, SetVersionError};

/// Parsing pattern following PEP 440 appendix B.
const VERSION_PATTERN: &str = r"(?xi)
^\s*
v?
(?:(?P<epoch>[0-9]+)!)?                         # epoch
(?P<release>[0-9]+(?:\.[0-9]+)*)                # release segment
(?P<pre_field>                                  # pre-release
    [-_\.]?
    (?P<pre_name>alpha|a|beta|b|preview|pre|rc|c)
    [-_\.]?
    (?P<pre>[0-9]+)?
)?
(?P<post_field>                                 # post release
    (?:-(?P<post_old>[0-9]+))
    |
    (?:
        [-_\.]?
        (?P<post_l>post|rev|r)
        [-_\.]?
        (?P<post_new>[0-9]+)?
    )
)?
(?P<dev_field>                                  # dev release
    [-_\.]?
    (?P<dev_l>dev)
    [-_\.]?
    (?P<dev>[0-9]+)?
)?
(?:\+(?P<local>[a-z0-9]+(?:[-_\.][a-z0-9]+)*))? # local version
\s*$
";

static VERSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(VERSION_PATTERN).unwrap());

/// Pre-release phase, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    Rc,
}

impl PreRelease {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::Rc,
        }
    }

    /// Canonical PEP 440 spelling.
    pub fn canonical(&self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::Rc => "rc",
        }
    }
}

/// A parsed PEP 440 version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pep440Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<(PreRelease, u64)>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    /// Local label, lowercased with `.` separators.
    pub local: Option<String>,
}

impl Pep440Version {
    /// Whether this is a pre-release or a dev release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// The version without its local label.
    pub fn public(&self) -> String {
        let mut public = String::new();

        if self.epoch > 0 {
            public.push_str(&format!("{}!", self.epoch));
        }

        public.push_str(&join_release(&self.release));

        if let Some((phase, number)) = self.pre {
            public.push_str(&format!("{}{number}", phase.canonical()));
        }

        if let Some(post) = self.post {
            public.push_str(&format!(".post{post}"));
        }

        if let Some(dev) = self.dev {
            public.push_str(&format!(".dev{dev}"));
        }

        public
    }
}

pub(crate) fn join_release(release: &[u64]) -> String {
    release
        .iter()
        .map(|segment| segment.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn parse_number(
    captures: &Captures,
    name: &str,
    input: &str,
) -> Result<Option<u64>> {
    captures
        .name(name)
        .map(|m| {
            m.as_str().parse::<u64>().map_err(|_| {
                SetVersionError::InvalidVersion(format!(
                    "{input}: {name} segment '{}' is out of range",
                    m.as_str()
                ))
            })
        })
        .transpose()
}

impl FromStr for Pep440Version {
    type Err = SetVersionError;

    fn from_str(input: &str) -> Result<Self> {
        let captures = VERSION_REGEX
            .captures(input)
            .ok_or_else(|| SetVersionError::InvalidVersion(input.into()))?;

        let epoch = parse_number(&captures, "epoch", input)?.unwrap_or(0);

        let release = captures
            .name("release")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split('.')
            .map(|segment| {
                segment.parse::<u64>().map_err(|_| {
                    SetVersionError::InvalidVersion(format!(
                        "{input}: release segment '{segment}' is out of range"
                    ))
                })
            })
            .collect::<Result<Vec<u64>>>()?;

        let pre = match captures.name("pre_name") {
            Some(name) => Some((
                PreRelease::from_name(name.as_str()),
                parse_number(&captures, "pre", input)?.unwrap_or(0),
            )),
            None => None,
        };

        let post = if captures.name("post_field").is_some() {
            let number = match parse_number(&captures, "post_old", input)? {
                Some(old) => Some(old),
                None => parse_number(&captures, "post_new", input)?,
            };
            Some(number.unwrap_or(0))
        } else {
            None
        };

        let dev = if captures.name("dev_l").is_some() {
            Some(parse_number(&captures, "dev", input)?.unwrap_or(0))
        } else {
            None
        };

        let local = captures
            .name("local")
            .map(|m| m.as_str().to_ascii_lowercase().replace(['-', '_'], "."));

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl fmt::Display for Pep440Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.public())?;
        if let Some(local) = &self.local {
            write!(f, "+{local}")?;
        }
        Ok(())
    }
}
