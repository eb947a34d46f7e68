//! Precompiled regular expressions for common field formats.

use once_cell::sync::Lazy;
use regex::Regex;

/// Legacy 17-character document ids from imported data.
///
/// Unlike generated ids these may contain `0` and `1`; the alphabet still
/// leaves out `I O U V` and lowercase `l`.
pub static OLD_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0123456789ABCDEFGHJKLMNPQRSTWXYZabcdefghijkmnopqrstuvwxyz]{17}$")
        .expect("old id regex")
});

/// Permissive http/https/ftp URL.
///
/// The TLD is optional so hosts such as `localhost` pass. Dotted-quad hosts
/// are matched by the host-name branch as well, so private ranges are not
/// excluded.
pub static URL: Lazy<Regex> = Lazy::new(|| {
    let pattern = concat!(
        "(?i)^",
        // protocol identifier
        r"(?:(?:https?|ftp)://)",
        // user:pass authentication
        r"(?:\S+(?::\S*)?@)?",
        "(?:",
        // dotted-quad address
        r"(?:[1-9]\d?|1\d\d|2[01]\d|22[0-3])",
        r"(?:\.(?:1?\d{1,2}|2[0-4]\d|25[0-5])){2}",
        r"(?:\.(?:[1-9]\d?|1\d\d|2[0-4]\d|25[0-4]))",
        "|",
        // host name
        r"(?:(?:[a-z\x{00a1}-\x{10ffff}0-9]-*)*[a-z\x{00a1}-\x{10ffff}0-9]+)",
        // domain name
        r"(?:\.(?:[a-z\x{00a1}-\x{10ffff}0-9]-*)*[a-z\x{00a1}-\x{10ffff}0-9]+)*",
        // optional TLD
        r"(?:\.(?:[a-z\x{00a1}-\x{10ffff}]{2,}))?",
        ")",
        // port
        r"(?::\d{2,5})?",
        // resource path
        r"(?:/\S*)?",
        "$",
    );
    Regex::new(pattern).expect("url regex")
});
