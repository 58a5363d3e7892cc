use serde::{Deserialize, Serialize};

/// Id carried by the empty pin slot.
pub const EMPTY_PIN_ID: i64 = -1;

/// One headline as it is stored under the `news` and `pinnedNews` keys.
///
/// `id` is the position of the article in the response it came from, so it is
/// only unique within a single batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub id: i64,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub read: bool,
}

impl ArticleRecord {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            id,
            pinned: false,
            read: false,
        }
    }

    /// The `{title: "", id: -1}` placeholder used for an empty pin slot.
    pub fn placeholder() -> Self {
        Self::new(EMPTY_PIN_ID, "")
    }

    pub fn is_placeholder(&self) -> bool {
        self.title.is_empty()
    }

    /// Title cut to `max_chars` characters with a trailing ellipsis, as list
    /// rows display it.
    pub fn display_title(&self, max_chars: usize) -> String {
        if self.title.chars().count() <= max_chars {
            return self.title.clone();
        }
        let mut cut: String = self.title.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

/// Response body of the remote news API. Only `articles[].title` is required.
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiArticle {
    pub title: String,
}

impl NewsApiResponse {
    /// Normalise the payload into a fresh batch: ids follow response order,
    /// nothing is read or pinned yet.
    pub fn into_batch(self) -> Vec<ArticleRecord> {
        self.articles
            .into_iter()
            .enumerate()
            .map(|(index, article)| ArticleRecord::new(index as i64, article.title))
            .collect()
    }
}
