//! `bookshelf-catalog` — catalog domain records and value objects.

pub mod book;
pub mod isbn;

pub use book::{Book, BookKey, NewBook, PublishDate};
pub use isbn::Isbn;
