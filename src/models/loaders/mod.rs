pub mod json_loader;

pub use json_loader::{load_article_jobs, save_articles};
