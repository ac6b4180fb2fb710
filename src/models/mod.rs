pub mod article;
pub use article::*;
