//! Accept-header negotiation between JSON and XML representations.
//!
//! The users endpoints can answer in JSON or XML. An absent `Accept`
//! header or `*/*` defaults to JSON, JSON wins whenever it is acceptable,
//! and a header offering neither format is refused with 406.

use actix_web::http::header::{self, HeaderMap};
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::domain::Error;

/// Wire formats the users API can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// `application/json`, the default.
    Json,
    /// `application/xml`.
    Xml,
}

impl Representation {
    /// Content type emitted for this representation.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

fn not_acceptable() -> Error {
    Error::not_acceptable("no supported representation in Accept header; offer application/json or application/xml")
}

/// Resolve the negotiated representation from request headers.
///
/// # Errors
/// `NotAcceptable` when the header names neither JSON nor XML.
pub fn negotiate(headers: &HeaderMap) -> Result<Representation, Error> {
    let Some(raw) = headers.get(header::ACCEPT) else {
        return Ok(Representation::Json);
    };
    let raw = raw.to_str().map_err(|_| not_acceptable())?;
    if raw.trim().is_empty() {
        return Ok(Representation::Json);
    }

    let mut xml_acceptable = false;
    for entry in raw.split(',') {
        // Quality factors are ignored; JSON simply wins when acceptable.
        let media = entry.split(';').next().unwrap_or_default().trim();
        match media {
            "*/*" | "application/*" | "application/json" => return Ok(Representation::Json),
            "application/xml" | "text/xml" => xml_acceptable = true,
            _ => {}
        }
    }

    if xml_acceptable {
        Ok(Representation::Xml)
    } else {
        Err(not_acceptable())
    }
}

/// Serialise `body` into `builder` using the negotiated representation.
///
/// `root` names the XML document element; JSON ignores it.
///
/// # Errors
/// Internal error when XML serialisation fails.
pub fn respond<T>(
    mut builder: HttpResponseBuilder,
    representation: Representation,
    root: &str,
    body: &T,
) -> Result<HttpResponse, Error>
where
    T: Serialize,
{
    match representation {
        Representation::Json => Ok(builder.json(body)),
        Representation::Xml => {
            let payload = quick_xml::se::to_string_with_root(root, body)
                .map_err(|err| Error::internal(format!("failed to serialise XML response: {err}")))?;
            Ok(builder
                .content_type(Representation::Xml.content_type())
                .body(payload))
        }
    }
}
