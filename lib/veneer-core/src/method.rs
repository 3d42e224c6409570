//! HTTP method types.

use std::str::FromStr;

use derive_more::Display;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// GET
    #[display("GET")]
    Get,
    /// POST
    #[display("POST")]
    Post,
    /// PUT
    #[display("PUT")]
    Put,
    /// DELETE
    #[display("DELETE")]
    Delete,
    /// PATCH
    #[display("PATCH")]
    Patch,
    /// HEAD
    #[display("HEAD")]
    Head,
    /// OPTIONS
    #[display("OPTIONS")]
    Options,
}

impl Method {
    /// Upper-case method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "PATCH" => Ok(Self::Patch),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(crate::Error::invalid_request(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
            Method::Patch => Self::PATCH,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display_matches_wire_name() {
        for method in [
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Head,
            Method::Options,
        ] {
            assert_eq!(method.to_string(), method.as_str());
        }
    }

    #[test]
    fn method_from_str() {
        assert_eq!("get".parse::<Method>().expect("GET"), Method::Get);
        assert_eq!("Patch".parse::<Method>().expect("PATCH"), Method::Patch);
        assert!("TRACE".parse::<Method>().is_err());
    }

    #[test]
    fn method_into_http() {
        assert_eq!(http::Method::from(Method::Get), http::Method::GET);
        assert_eq!(http::Method::from(Method::Delete), http::Method::DELETE);
    }
}
