//! PostgreSQL implementations of the catalog seams.

pub mod file;
pub mod member;

pub use file::FileRepository;
pub use member::ProjectMemberRepository;
