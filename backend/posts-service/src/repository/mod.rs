/// Database access layer: partition-aware CRUD against the post, comment and
/// like tables. Point lookups return `Option`; an absent row is not an error
/// here, callers translate it to `PostNotFound`.
pub mod comments;
pub mod likes;
pub mod posts;

pub use comments::CommentRepository;
pub use likes::LikeRepository;
pub use posts::PostRepository;
