//! Project membership entities.

pub mod member;
pub mod role;

pub use member::ProjectMember;
pub use role::ProjectRole;
