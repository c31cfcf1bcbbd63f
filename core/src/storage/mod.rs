pub mod memory;
pub mod r#trait;

pub use memory::MemoryStore;
pub use r#trait::SecureStore;

/// Bearer credential.
pub const TOKEN_KEY: &str = "userToken";
/// Role tag: patient / doctor / pharmacy.
pub const USER_TYPE_KEY: &str = "userType";
/// Account identifier, stringified.
pub const USER_ID_KEY: &str = "userId";
/// Role-profile identifier, stringified. Absent rather than a placeholder.
pub const PROFILE_ID_KEY: &str = "profileId";

pub const SESSION_KEYS: [&str; 4] = [TOKEN_KEY, USER_TYPE_KEY, USER_ID_KEY, PROFILE_ID_KEY];

/// Older clients wrote the stringified JS `null`/`undefined` for a missing profile id.
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed == "null" || trimmed == "undefined"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_detection() {
        assert!(is_placeholder("null"));
        assert!(is_placeholder("undefined"));
        assert!(is_placeholder("  "));
        assert!(!is_placeholder("7"));
        assert!(!is_placeholder("nullable"));
    }
}
