//! Shopping list aggregation.

pub mod builder;
pub mod list;

pub use builder::ShoppingListBuilderAgent;
pub use list::{DishGroup, GroupedShoppingList};
