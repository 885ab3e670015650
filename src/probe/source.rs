//! Endpoint source: loads and sanitizes the proxies file
//!
//! Lines are CRLF-separated `host:port` pairs. The host token must be a
//! dotted-decimal IPv4 literal with octets in range; lines that fail the
//! check are dropped without comment. File order is preserved.

use crate::probe::models::Endpoint;
use crate::Result;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])(\.(25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9]?[0-9])){3}$")
        .expect("IPv4 pattern is valid")
});

/// Result of reading the proxies file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// File existed and was read; the list may still be empty
    Found(Vec<Endpoint>),
    /// File was absent; an empty template was created in its place
    CreatedTemplate,
}

/// Parse a single `host:port` line, dropping anything with a non-IPv4 host
pub fn parse_line(line: &str) -> Option<Endpoint> {
    let mut tokens = line.split(':');
    let host = tokens.next()?;
    let port = tokens.next()?;

    if !IPV4_PATTERN.is_match(host) {
        return None;
    }

    Some(Endpoint::new(host, port))
}

/// Sanitize a whole file's contents into the surviving endpoint list
pub fn parse_list(content: &str) -> Vec<Endpoint> {
    content.split("\r\n").filter_map(parse_line).collect()
}

/// Load endpoints from `path`
///
/// A missing file is not an error: an empty template is created so the
/// user has something to populate, and `CreatedTemplate` is returned.
/// Any other read failure, or a failure to create the template, is fatal.
pub fn load_endpoints(path: &Path) -> Result<SourceOutcome> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(SourceOutcome::Found(parse_list(&content))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::write(path, "").with_context(|| {
                format!(
                    "unable to create {}, create it yourself or run with elevated rights",
                    path.display()
                )
            })?;
            Ok(SourceOutcome::CreatedTemplate)
        }
        Err(err) => {
            Err(err).with_context(|| format!("unable to read {}", path.display()))
        }
    }
}
