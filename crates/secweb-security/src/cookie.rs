//! Cookie parsing and `Set-Cookie` formatting

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use secweb_shared::utils::is_local_path;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    #[error("Invalid SameSite value: {0}")]
    InvalidSameSite(String),
    #[error("SameSite=None requires the Secure attribute")]
    InsecureSameSiteNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl FromStr for SameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(CookieError::InvalidSameSite(other.to_string())),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Strict => write!(f, "Strict"),
            SameSite::Lax => write!(f, "Lax"),
            SameSite::None => write!(f, "None"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    pub fn new(secure: bool, same_site: &str) -> Result<Self, CookieError> {
        let same_site = same_site.parse::<SameSite>()?;
        if same_site == SameSite::None && !secure {
            return Err(CookieError::InsecureSameSiteNone);
        }
        Ok(Self { secure, same_site })
    }

    /// `name=value` scoped to `/`. `http_only` hides it from page scripts.
    pub fn set(&self, name: &str, value: &str, http_only: bool) -> String {
        self.format(name, value, http_only, None)
    }

    /// Instructs the client to drop the cookie.
    pub fn expire(&self, name: &str, http_only: bool) -> String {
        self.format(
            name,
            "",
            http_only,
            Some("Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"),
        )
    }

    fn format(&self, name: &str, value: &str, http_only: bool, lifetime: Option<&str>) -> String {
        let mut cookie = format!("{}={}; Path=/", name, value);
        if let Some(lifetime) = lifetime {
            cookie.push_str("; ");
            cookie.push_str(lifetime);
        }
        if http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site));
        cookie
    }
}

/// Finds `name` across one or more `Cookie` header values.
pub fn find_cookie<'a, I>(headers: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    headers
        .into_iter()
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim_matches('"'))
}

/// Cookie-safe encoding of a request target.
pub fn encode_saved_request(target: &str) -> String {
    URL_SAFE_NO_PAD.encode(target.as_bytes())
}

/// Decodes a saved request, accepting only same-origin relative paths.
pub fn decode_saved_request(value: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    let target = String::from_utf8(bytes).ok()?;
    is_local_path(&target).then_some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_site_parsing() {
        assert_eq!("LAX".parse::<SameSite>(), Ok(SameSite::Lax));
        assert_eq!("strict".parse::<SameSite>(), Ok(SameSite::Strict));
        assert!("sometimes".parse::<SameSite>().is_err());
        assert_eq!(
            CookieOptions::new(false, "none"),
            Err(CookieError::InsecureSameSiteNone)
        );
    }

    #[test]
    fn test_session_cookie_attributes() {
        let opts = CookieOptions::new(true, "lax").unwrap();
        assert_eq!(
            opts.set("SESSION", "abc", true),
            "SESSION=abc; Path=/; HttpOnly; Secure; SameSite=Lax"
        );
        let opts = CookieOptions::new(false, "strict").unwrap();
        assert_eq!(opts.set("XSRF-TOKEN", "t", false), "XSRF-TOKEN=t; Path=/; SameSite=Strict");
    }

    #[test]
    fn test_expire_cookie() {
        let opts = CookieOptions::new(true, "lax").unwrap();
        let cleared = opts.expire("SESSION", true);
        assert!(cleared.starts_with("SESSION=; Path=/; Max-Age=0"));
        assert!(cleared.contains("HttpOnly"));
    }

    #[test]
    fn test_find_cookie() {
        let headers = ["a=1; SESSION=abc", "XSRF-TOKEN=\"tok\""];
        assert_eq!(find_cookie(headers, "SESSION"), Some("abc"));
        assert_eq!(find_cookie(headers, "XSRF-TOKEN"), Some("tok"));
        assert_eq!(find_cookie(headers, "missing"), None);
        assert_eq!(find_cookie(["SESSIONX=1"], "SESSION"), None);
    }

    #[test]
    fn test_saved_request_only_local() {
        let encoded = encode_saved_request("/hello?x=1;y=%20");
        assert_eq!(decode_saved_request(&encoded).as_deref(), Some("/hello?x=1;y=%20"));
        assert_eq!(decode_saved_request(&encode_saved_request("/h\u{e9}llo")), None);

        let offsite = encode_saved_request("//evil.example/");
        assert_eq!(decode_saved_request(&offsite), None);
        assert_eq!(decode_saved_request("***"), None);
    }
}
