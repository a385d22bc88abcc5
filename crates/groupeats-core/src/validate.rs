//! Input validation for review and profile creation.
//!
//! Applied at the API boundary; the aggregation and pagination logic assumes
//! records already passed these checks and does not re-validate.

/// Minimal email shape check: one `@` with non-empty local part and a domain
/// containing a dot, no whitespace anywhere.
pub fn is_valid_email(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

/// Passwords must be at least 6 characters.
pub fn is_valid_password(password: &str) -> bool {
  password.len() >= 6
}

/// Ratings are nominally 1–5 stars, decimals allowed.
pub fn is_valid_rating(rating: f64) -> bool {
  (1.0..=5.0).contains(&rating)
}

/// A required text field must contain at least one non-whitespace character.
pub fn is_present(value: &str) -> bool {
  !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_shapes() {
    assert!(is_valid_email("alice@example.com"));
    assert!(is_valid_email("a.b+c@sub.example.co"));
    assert!(!is_valid_email("alice"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email("alice@example"));
    assert!(!is_valid_email("alice @example.com"));
    assert!(!is_valid_email("alice@@example.com"));
  }

  #[test]
  fn rating_bounds_inclusive() {
    assert!(is_valid_rating(1.0));
    assert!(is_valid_rating(5.0));
    assert!(is_valid_rating(3.5));
    assert!(!is_valid_rating(0.9));
    assert!(!is_valid_rating(5.1));
    assert!(!is_valid_rating(f64::NAN));
  }

  #[test]
  fn required_rejects_blank() {
    assert!(is_present("hello"));
    assert!(!is_present(""));
    assert!(!is_present("   \t "));
  }

  #[test]
  fn password_length() {
    assert!(is_valid_password("secret"));
    assert!(!is_valid_password("short"));
  }
}
