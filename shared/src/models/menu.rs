//! Menu item model
//!
//! Categories are free-text labels on items, not entities of their own.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub available: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub is_vegetarian: bool,
}

fn default_available() -> bool {
    true
}

/// Update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub available: Option<bool>,
    pub is_vegetarian: Option<bool>,
}

/// Items sharing one category label, in first-seen order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuCategory {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Group items by category label, preserving the order in which each
/// label is first seen and the relative order of items within it.
pub fn group_by_category(items: impl IntoIterator<Item = MenuItem>) -> Vec<MenuCategory> {
    let mut groups: Vec<MenuCategory> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.name == item.category) {
            Some(group) => group.items.push(item),
            None => groups.push(MenuCategory {
                name: item.category.clone(),
                items: vec![item],
            }),
        }
    }
    groups
}
