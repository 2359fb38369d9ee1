//! `SeaORM` Entity prelude

pub use super::deals::Entity as Deals;
