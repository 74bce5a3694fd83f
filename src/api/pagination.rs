use serde::Deserialize;

use crate::database::Page;

/// `?limit=&offset=` query parameters.
///
/// Values are kept as strings so that malformed input falls back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Page {
        let limit = self
            .limit
            .as_deref()
            .and_then(|l| l.parse::<i64>().ok())
            .filter(|l| (1..=Page::MAX_LIMIT).contains(l))
            .unwrap_or(Page::DEFAULT_LIMIT);

        let offset = self
            .offset
            .as_deref()
            .and_then(|o| o.parse::<i64>().ok())
            .filter(|o| *o >= 0)
            .unwrap_or(0);

        Page::new(limit, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(limit: Option<&str>, offset: Option<&str>) -> Page {
        PageQuery {
            limit: limit.map(String::from),
            offset: offset.map(String::from),
        }
        .page()
    }

    #[test]
    fn defaults() {
        assert_eq!(page(None, None), Page::new(10, 0));
    }

    #[test]
    fn accepts_in_range_values() {
        assert_eq!(page(Some("1"), Some("0")), Page::new(1, 0));
        assert_eq!(page(Some("100"), Some("40")), Page::new(100, 40));
    }

    #[test]
    fn invalid_values_fall_back() {
        assert_eq!(page(Some("0"), None), Page::new(10, 0));
        assert_eq!(page(Some("101"), None), Page::new(10, 0));
        assert_eq!(page(Some("ten"), Some("-1")), Page::new(10, 0));
        assert_eq!(page(Some("-5"), Some("abc")), Page::new(10, 0));
    }
}
