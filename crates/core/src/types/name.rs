//! Full-name normalization.
//!
//! Accounts store a single free-form full name on the profile and a
//! first/last pair on the user. The pair is always derived from the full
//! name by splitting on the first whitespace character.

/// A first/last name pair derived from a full name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    /// Everything before the first whitespace.
    pub first: String,
    /// Everything after the first whitespace, leading whitespace removed.
    /// Empty for single-word names.
    pub last: String,
}

impl PersonName {
    /// Split a full name on its first whitespace character.
    ///
    /// The input is trimmed first. The first token becomes the first name,
    /// the remainder (or an empty string) the last name.
    ///
    /// ```
    /// use merch_core::PersonName;
    ///
    /// let name = PersonName::split("Jane Doe");
    /// assert_eq!((name.first.as_str(), name.last.as_str()), ("Jane", "Doe"));
    ///
    /// let name = PersonName::split("Cher");
    /// assert_eq!((name.first.as_str(), name.last.as_str()), ("Cher", ""));
    /// ```
    #[must_use]
    pub fn split(full_name: &str) -> Self {
        let full_name = full_name.trim();
        match full_name.split_once(char::is_whitespace) {
            Some((first, rest)) => Self {
                first: first.to_owned(),
                last: rest.trim_start().to_owned(),
            },
            None => Self {
                first: full_name.to_owned(),
                last: String::new(),
            },
        }
    }
}
