//! Identity record and structural validation

/// Reason a [`User`] record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Id is empty
    EmptyId,
    /// Name is empty
    EmptyName,
    /// Email is empty
    EmptyEmail,
    /// Email is not of the form `local@domain.tld`
    InvalidEmail,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyId => write!(f, "user id cannot be empty"),
            ValidationError::EmptyName => write!(f, "user name cannot be empty"),
            ValidationError::EmptyEmail => write!(f, "user email cannot be empty"),
            ValidationError::InvalidEmail => write!(f, "invalid email format"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validated identity record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Globally unique id among admitted users
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl User {
    /// Create a new (unvalidated) record
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Check the record's structure
    ///
    /// Fields are checked in order (id, name, email) and the first failure is
    /// returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.email.is_empty() {
            return Err(ValidationError::EmptyEmail);
        }
        if !is_plausible_email(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Exactly one `@` with something before it, and a `.` after it that is
/// neither adjacent to the `@` nor the final character.
fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    match domain.rfind('.') {
        Some(dot) => dot > 0 && dot + 1 < domain.len(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user() {
        let user = User::new("u1", "Ann", "ann@example.com");
        assert_eq!(user.validate(), Ok(()));
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(
            User::new("", "Ann", "ann@example.com").validate(),
            Err(ValidationError::EmptyId)
        );
        assert_eq!(
            User::new("u2", "", "bad").validate(),
            Err(ValidationError::EmptyName)
        );
        assert_eq!(
            User::new("u3", "Ann", "").validate(),
            Err(ValidationError::EmptyEmail)
        );
    }

    #[test]
    fn test_email_format() {
        let check = |email: &str| User::new("u1", "Ann", email).validate();

        assert_eq!(check("a@b.c"), Ok(()));
        assert_eq!(check("first.last@mail.example.org"), Ok(()));

        // No @ at all
        assert_eq!(check("bad"), Err(ValidationError::InvalidEmail));
        // Nothing before @
        assert_eq!(check("@example.com"), Err(ValidationError::InvalidEmail));
        // More than one @
        assert_eq!(check("a@b@example.com"), Err(ValidationError::InvalidEmail));
        // No dot after @
        assert_eq!(check("ann@localhost"), Err(ValidationError::InvalidEmail));
        // Dot directly after @
        assert_eq!(check("ann@.com"), Err(ValidationError::InvalidEmail));
        // Dot is the final character
        assert_eq!(check("ann@example."), Err(ValidationError::InvalidEmail));
        // Dot only before @
        assert_eq!(check("ann.b@example"), Err(ValidationError::InvalidEmail));
    }
}
