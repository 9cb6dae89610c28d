mod ids;
mod post;
mod song;
mod user;

pub use ids::{PostId, SongId, UserId};
pub use post::{Post, PostCategory, SaveStatus};
pub use song::Song;
pub use user::User;
