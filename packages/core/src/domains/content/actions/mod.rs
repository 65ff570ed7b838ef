mod publish;

pub use publish::{add_comment, publish_post, react_to_comment, react_to_post};
