use super::*;

#[test]
fn validate_email_trims() {
    assert_eq!(validate_email("  cook@example.com  "), Ok("cook@example.com".to_owned()));
}

#[test]
fn validate_email_requires_value() {
    assert_eq!(validate_email("   "), Err(AuthError::InvalidInput("Enter an email first.")));
}

#[test]
fn validate_email_requires_both_halves() {
    for raw in ["cook", "@example.com", "cook@"] {
        assert_eq!(
            validate_email(raw),
            Err(AuthError::InvalidInput("Enter a valid email address.")),
            "input {raw:?}"
        );
    }
}

#[test]
fn validate_sign_in_requires_password() {
    assert_eq!(
        validate_sign_in("a@b.com", ""),
        Err(AuthError::InvalidInput("Enter both email and password."))
    );
    assert_eq!(validate_sign_in(" a@b.com", "x"), Ok("a@b.com".to_owned()));
}

#[test]
fn validate_sign_up_enforces_policy() {
    assert!(validate_sign_up("a@b.com", "Passw0rd").is_ok());
    for weak in ["Pass0rd", "password1", "PASSWORD1", "Password"] {
        assert!(validate_sign_up("a@b.com", weak).is_err(), "password {weak:?}");
    }
}

#[test]
fn validate_code_accepts_six_digits() {
    assert_eq!(validate_code(" 123456 "), Ok("123456".to_owned()));
}

#[test]
fn validate_code_rejects_wrong_shape() {
    for raw in ["12345", "1234567", "12a456", ""] {
        assert!(validate_code(raw).is_err(), "code {raw:?}");
    }
}
