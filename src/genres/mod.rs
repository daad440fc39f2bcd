pub mod catalogue;
pub mod slug;

pub use catalogue::{get_genres_path, GenreList};
pub use slug::{reference_url, slugify, DEFAULT_URL_TEMPLATE, SLUG_PLACEHOLDER};
