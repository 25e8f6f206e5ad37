//! Profile domain types.

use merch_core::{ProfileId, UserId};

/// Column limit for `profiles.full_name`.
pub const MAX_FULL_NAME_LENGTH: usize = 100;
/// Column limit for `profiles.mobile` (country code included).
pub const MAX_MOBILE_LENGTH: usize = 20;
/// Column limit for `profiles.gender`.
pub const MAX_GENDER_LENGTH: usize = 20;
/// Column limit for `profiles.city`.
pub const MAX_CITY_LENGTH: usize = 100;
/// Column limit for `profiles.postal_code`.
pub const MAX_POSTAL_CODE_LENGTH: usize = 10;

/// Extended account attributes, one per user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub full_name: String,
    pub mobile: String,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// A full overwrite of the editable profile fields.
///
/// Partial updates are not supported: a field left out of the form is
/// stored as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub mobile: String,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl ProfileUpdate {
    /// Build an update from optional form values, trimming each one.
    #[must_use]
    pub fn from_optional(
        full_name: Option<&str>,
        mobile: Option<&str>,
        gender: Option<&str>,
        address: Option<&str>,
        city: Option<&str>,
        postal_code: Option<&str>,
    ) -> Self {
        let clean = |v: Option<&str>| v.map(str::trim).unwrap_or_default().to_owned();
        Self {
            full_name: clean(full_name),
            mobile: clean(mobile),
            gender: clean(gender),
            address: clean(address),
            city: clean(city),
            postal_code: clean(postal_code),
        }
    }
}
