pub mod article;
pub mod loaders;
pub mod request;

pub use article::{Article, ArticleJob, FeedInfo, FALLBACK_CATEGORY};
pub use loaders::{load_article_jobs, save_articles};
pub use request::GenerationRequest;
