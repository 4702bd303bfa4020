//! HTTP method as a closed, typed enum.
//!
//! Only the nine RFC 9110 methods get a route tree. Anything else is rejected
//! at registration time with [`Error::UnsupportedMethod`] and answered with
//! `405 Method Not Allowed` at request time, before routing runs.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A supported HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    /// Every supported method, in the order the router allocates its tries.
    pub const ALL: [Method; 9] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::Trace,
        Self::Connect,
    ];

    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get     => "GET",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Patch   => "PATCH",
            Self::Delete  => "DELETE",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace   => "TRACE",
            Self::Connect => "CONNECT",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Parses an uppercase method string. Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET"     => Ok(Self::Get),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "PATCH"   => Ok(Self::Patch),
            "DELETE"  => Ok(Self::Delete),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "TRACE"   => Ok(Self::Trace),
            "CONNECT" => Ok(Self::Connect),
            other     => Err(Error::UnsupportedMethod(other.to_owned())),
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get     => http::Method::GET,
            Method::Post    => http::Method::POST,
            Method::Put     => http::Method::PUT,
            Method::Patch   => http::Method::PATCH,
            Method::Delete  => http::Method::DELETE,
            Method::Head    => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Trace   => http::Method::TRACE,
            Method::Connect => http::Method::CONNECT,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
