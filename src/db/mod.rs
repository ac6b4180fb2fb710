mod persistence;
mod catalog;
mod store;
pub use self::{
  persistence::*,
  catalog::*,
  store::*,
};

mod service;
pub use service::*;
