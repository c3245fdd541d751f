use regex::Regex;

/// Pagination links advertised in a `link` response header
///
/// GitHub publishes page navigation as comma-separated
/// `<url>; rel="name"` segments. Only `next` and `last` drive
/// enumeration; other rels are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub next: Option<String>,
    pub last: Option<String>,
}

impl PageLinks {
    /// Parse a raw `link` header value
    ///
    /// Segments that do not match the `<url>; rel="name"` pattern are
    /// skipped, so a malformed header behaves exactly like a missing one.
    pub fn parse(header: Option<&str>) -> Self {
        let mut links = PageLinks::default();
        let Some(header) = header else {
            return links;
        };

        let re = Regex::new(r#"<([^>]*)>\s*;\s*rel="([^"]*)""#).unwrap();
        for segment in header.split(',') {
            if let Some(caps) = re.captures(segment) {
                let url = caps[1].to_string();
                match &caps[2] {
                    "next" => links.next = Some(url),
                    "last" => links.last = Some(url),
                    _ => {}
                }
            }
        }

        links
    }

    /// URL of the next page to fetch, if enumeration should continue
    ///
    /// Halts when no `next` remains, when `last` is absent, or when the
    /// current URL already equals `last` (guards against an upstream that
    /// keeps advertising the page it just served).
    pub fn advance(&self, current_url: &str) -> Option<&str> {
        let next = self.next.as_deref()?;
        let last = self.last.as_deref()?;

        if current_url == last {
            return None;
        }

        Some(next)
    }
}
