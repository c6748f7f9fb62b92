use serde::{Deserialize, Serialize};

/// Process-local blog identifier; the first blog created gets 1.
pub type BlogId = u64;

/// A comment embedded in its parent blog. It has no identity of its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
}

impl Comment {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self { author: author.into(), content: content.into() }
    }
}

/// A stored blog post. `comments` is kept in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blog {
    pub id: BlogId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Caller-supplied blog payload before an id is assigned.
///
/// Any `id` present in the payload is ignored. Initial `likes` and `comments`
/// are accepted but optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl BlogDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self { title: title.into(), content: content.into(), author: author.into(), ..Default::default() }
    }

    pub fn into_blog(self, id: BlogId) -> Blog {
        Blog {
            id,
            title: self.title,
            content: self.content,
            author: self.author,
            likes: self.likes,
            comments: self.comments,
        }
    }
}
