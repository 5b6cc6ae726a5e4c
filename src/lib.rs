pub mod api;
pub mod common;
pub mod core;
pub mod provider;

pub use common::config;
pub use common::error;
pub use self::core::document::{DocumentKind, VideoLink};
pub use self::core::generator::CourseGenerator;
