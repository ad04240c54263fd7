//! Member-level metadata: names, identities, visibility, writability, docs.

mod member_info;

pub use member_info::{MemberInfo, MemberKind, Visibility, VisibilityFilter};
