// Identifiers for users, carts and products are UUIDv7 generated app-side so
// that listing products "in creation order" is a plain sort on the id.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a new UUIDv7 rendered as its hyphenated string form.
pub fn new_id() -> String {
    uuidv7().to_string()
}

/// Parse an externally supplied id. Anything that is not a UUID cannot
/// name a stored entity.
pub fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuidv7_is_valid() {
        let id = uuidv7();
        assert_eq!(id.get_version(), Some(uuid::Version::SortRand));
    }

    #[test]
    fn new_ids_sort_in_creation_order() {
        let a = new_id();
        let b = new_id();
        assert!(b >= a);
    }

    #[test]
    fn parse_id_rejects_object_ids() {
        assert!(parse_id("6510b2a776e6b8994a246741").is_none());
        assert!(parse_id(&new_id()).is_some());
    }
}
