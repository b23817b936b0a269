//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/about") // -> "https://example.com/about"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", base)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Canonical URL of a content item: `{base}/{prefix}/{slug}`
pub fn canonical_url(base: &str, prefix: &str, slug: &str) -> String {
    let base = base.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{}/{}", base, encode_segment(slug))
    } else {
        format!("{}/{}/{}", base, prefix, encode_segment(slug))
    }
}

/// Percent-encode one URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Whether `url` is an absolute `http(s)` URL with a host
pub fn is_absolute_url(url: &str) -> bool {
    (url.starts_with("http://") || url.starts_with("https://"))
        && host_of(url).is_some_and(|h| !h.is_empty())
}

/// Lowercased host of an absolute URL, without port or credentials
pub fn host_of(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = match host.rsplit_once(':') {
        Some((h, port)) if port.chars().all(|c| c.is_ascii_digit()) => h,
        _ => host,
    };
    Some(host.to_ascii_lowercase())
}

/// Whether `url` points at the same site as `site_url`, treating the
/// `www.` prefix as insignificant
pub fn is_same_site(url: &str, site_url: &str) -> bool {
    match (host_of(url), host_of(site_url)) {
        (Some(a), Some(b)) => {
            a.trim_start_matches("www.") == b.trim_start_matches("www.")
        }
        _ => false,
    }
}
