//! UUID utilities
//!
//! Entity ids are stored as hyphenated UUIDv4 text.

use uuid::Uuid;

/// Generate a new UUIDv4 in its stored text form
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

/// Parse UUID from string
pub fn parse(s: &str) -> Result<Uuid, uuid::Error> {
    Uuid::parse_str(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_parseable_v4() {
        let id = generate();
        let parsed = parse(&id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(generate(), generate());
    }
}
