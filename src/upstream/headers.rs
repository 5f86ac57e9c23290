//! Ordered, case-insensitive multi-valued header collection.
//!
//! Upstream headers are kept in first-seen order with every value of a
//! repeated name grouped under that name. `HeaderName` is already
//! lower-cased, so lookups are case-insensitive.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

#[derive(Debug, Clone, Default)]
pub struct HeaderList {
    entries: Vec<(HeaderName, Vec<HeaderValue>)>,
}

impl HeaderList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, keeping it after any earlier values for the same name.
    pub fn append(&mut self, name: HeaderName, value: HeaderValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
    }

    /// First value recorded for `name`.
    pub fn first(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.get_all(name).first()
    }

    /// Every value recorded for `name`, in arrival order.
    pub fn get_all(&self, name: &HeaderName) -> &[HeaderValue] {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        !self.get_all(name).is_empty()
    }

    /// Names in first-seen order, each with all of its values.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &[HeaderValue])> {
        self.entries
            .iter()
            .map(|(name, values)| (name, values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(HeaderName, HeaderValue)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (HeaderName, HeaderValue)>>(iter: I) -> Self {
        let mut list = Self::new();
        for (name, value) in iter {
            list.append(name, value);
        }
        list
    }
}

impl From<&HeaderMap> for HeaderList {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{CONTENT_TYPE, SET_COOKIE};

    #[test]
    fn test_repeated_names_are_grouped_in_order() {
        let list: HeaderList = [
            (SET_COOKIE, HeaderValue::from_static("a=1")),
            (CONTENT_TYPE, HeaderValue::from_static("text/html")),
            (SET_COOKIE, HeaderValue::from_static("b=2")),
        ]
        .into_iter()
        .collect();

        assert_eq!(list.len(), 2);
        assert_eq!(list.get_all(&SET_COOKIE), ["a=1", "b=2"]);
        assert_eq!(list.first(&SET_COOKIE).unwrap(), "a=1");

        let names: Vec<_> = list.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["set-cookie", "content-type"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut map = HeaderMap::new();
        map.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
        let list = HeaderList::from(&map);

        let name = HeaderName::from_bytes(b"x-FRAME-options").unwrap();
        assert!(list.contains(&name));
        assert_eq!(list.first(&name).unwrap(), "DENY");
    }

    #[test]
    fn test_missing_name_yields_empty_slice() {
        let list = HeaderList::new();
        assert!(list.is_empty());
        assert!(list.get_all(&SET_COOKIE).is_empty());
        assert!(list.first(&SET_COOKIE).is_none());
    }
}
