use std::fmt::Display;

pub mod add_user;
pub mod get_token;

/// Identifies a user.
///
/// Always held in canonical form (no surrounding whitespace) so that two
/// representations of the same id compare equal.
#[derive(
    serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(from = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new<T: AsRef<str>>(id: T) -> Self {
        Self(id.as_ref().trim().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        if id.trim().len() == id.len() {
            Self(id)
        } else {
            Self::new(id)
        }
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
