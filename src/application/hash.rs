//! Content hashing for rebuild memoization
//!
//! Provides SHA-256 based fingerprints of member lists so the hierarchy is
//! only rebuilt when the members actually changed.

use sha2::{Digest, Sha256};

use crate::domain::Member;

const FIELD_SEP: u8 = 0x1f;
const RECORD_SEP: u8 = 0x1e;

/// 16-character hex fingerprint of a member list (first 64 bits of SHA-256).
///
/// Order-sensitive, since order drives rendering.
pub fn members_fingerprint(members: &[Member]) -> String {
    let mut hasher = Sha256::new();
    for member in members {
        let fields = [
            Some(member.id.as_str()),
            member.mentor_id.as_deref(),
            member.designation.as_deref(),
            Some(member.role.as_str()),
            member.joining_date.as_deref(),
            Some(member.display_name.as_str()),
        ];
        for field in fields {
            match field {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0u8]),
            }
            hasher.update([FIELD_SEP]);
        }
        hasher.update([RECORD_SEP]);
    }
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length() {
        let hash = members_fingerprint(&[]);
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let members = vec![Member::new("a", "Ada", "Lead")];
        assert_eq!(members_fingerprint(&members), members_fingerprint(&members.clone()));
    }

    #[test]
    fn test_fingerprint_sees_mentor_change() {
        let before = vec![Member::new("a", "Ada", "Lead"), Member::new("b", "Bob", "Dev")];
        let mut after = before.clone();
        after[1].mentor_id = Some("a".into());
        assert_ne!(members_fingerprint(&before), members_fingerprint(&after));
    }

    #[test]
    fn test_fingerprint_distinguishes_absent_from_empty() {
        let absent = vec![Member::new("a", "Ada", "Lead")];
        let empty = vec![Member::new("a", "Ada", "Lead").with_mentor("")];
        assert_ne!(members_fingerprint(&absent), members_fingerprint(&empty));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = Member::new("a", "Ada", "Lead");
        let b = Member::new("b", "Bob", "Dev");
        assert_ne!(
            members_fingerprint(&[a.clone(), b.clone()]),
            members_fingerprint(&[b, a])
        );
    }
}
