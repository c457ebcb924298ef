//! Topic ownership by visitor token.
//!
//! A topic remembers the visitor token of the browser that created it, and
//! only that browser is offered the delete action. The token lives in plain
//! client storage, so anyone can copy or forge it: this is a UI courtesy, not
//! an access control boundary.

use subtle::ConstantTimeEq;

use crate::models::Topic;

/// Whether `visitor_id` matches the token recorded on `topic`.
///
/// Topics created before tokens were recorded have no owner.
pub fn is_owner(topic: &Topic, visitor_id: &str) -> bool {
    match topic.visitor_id.as_deref() {
        Some(owner) if !owner.is_empty() => constant_time_compare(owner, visitor_id),
        _ => false,
    }
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
