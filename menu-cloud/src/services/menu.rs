//! Menu Store: menu items per restaurant

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{MenuCategory, MenuItem, MenuItemCreate, MenuItemUpdate, group_by_category};
use shared::util::{now_millis, snowflake_id};
use shared::validation::{
    MAX_DESCRIPTION_LEN, MAX_ITEM_NAME_LEN, sanitize_string, validate_optional_text,
    validate_price, validate_required_text,
};

use crate::db::Store;
use crate::error::ServiceResult;

#[derive(Clone)]
pub struct MenuService {
    store: Arc<dyn Store>,
}

impl MenuService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Management view: every item, oldest first.
    pub async fn list(&self, tenant_id: &str) -> ServiceResult<Vec<MenuItem>> {
        Ok(self.store.list_menu_items(tenant_id).await?)
    }

    /// Storefront view: available items only, grouped by category.
    pub async fn public_menu(&self, tenant_id: &str) -> ServiceResult<Vec<MenuCategory>> {
        let items = self.store.list_menu_items(tenant_id).await?;
        Ok(group_by_category(items.into_iter().filter(|i| i.available)))
    }

    pub async fn get(&self, tenant_id: &str, id: i64) -> ServiceResult<MenuItem> {
        self.store
            .find_menu_item(tenant_id, id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound).into())
    }

    pub async fn create(&self, tenant_id: &str, data: MenuItemCreate) -> ServiceResult<MenuItem> {
        let name = clean_required(&data.name, "name")?;
        let category = clean_required(&data.category, "category")?;
        let description = clean_optional(data.description.as_deref())?;
        validate_price(data.price)?;

        let now = now_millis();
        let item = MenuItem {
            id: snowflake_id(),
            restaurant_id: tenant_id.to_string(),
            name,
            description,
            price: data.price.normalize(),
            category,
            image_url: None,
            available: data.available,
            is_vegetarian: data.is_vegetarian,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_menu_item(&item).await?;
        tracing::info!(tenant_id = %tenant_id, item_id = item.id, "Menu item created");
        Ok(item)
    }

    /// Edits never reach existing orders; line items are snapshots.
    pub async fn update(
        &self,
        tenant_id: &str,
        id: i64,
        data: MenuItemUpdate,
    ) -> ServiceResult<MenuItem> {
        let mut item = self.get(tenant_id, id).await?;

        if let Some(name) = data.name.as_deref() {
            item.name = clean_required(name, "name")?;
        }
        if let Some(category) = data.category.as_deref() {
            item.category = clean_required(category, "category")?;
        }
        if data.description.is_some() {
            item.description = clean_optional(data.description.as_deref())?;
        }
        if let Some(price) = data.price {
            validate_price(price)?;
            item.price = price.normalize();
        }
        if let Some(available) = data.available {
            item.available = available;
        }
        if let Some(is_vegetarian) = data.is_vegetarian {
            item.is_vegetarian = is_vegetarian;
        }
        item.updated_at = now_millis();

        self.store.update_menu_item(&item).await?;
        Ok(item)
    }

    pub async fn set_image(
        &self,
        tenant_id: &str,
        id: i64,
        image_url: Option<String>,
    ) -> ServiceResult<(MenuItem, Option<String>)> {
        let mut item = self.get(tenant_id, id).await?;
        let previous = std::mem::replace(&mut item.image_url, image_url);
        item.updated_at = now_millis();
        self.store.update_menu_item(&item).await?;
        Ok((item, previous))
    }

    /// Returns the deleted item so callers can clean up its image.
    pub async fn delete(&self, tenant_id: &str, id: i64) -> ServiceResult<MenuItem> {
        let item = self.get(tenant_id, id).await?;
        if !self.store.delete_menu_item(tenant_id, id).await? {
            return Err(AppError::new(ErrorCode::MenuItemNotFound).into());
        }
        tracing::info!(tenant_id = %tenant_id, item_id = id, "Menu item deleted");
        Ok(item)
    }
}

fn clean_required(value: &str, field: &str) -> Result<String, AppError> {
    let cleaned = sanitize_string(value);
    validate_required_text(&cleaned, field, MAX_ITEM_NAME_LEN)?;
    Ok(cleaned)
}

/// Blank descriptions are stored as absent
fn clean_optional(value: Option<&str>) -> Result<Option<String>, AppError> {
    let cleaned = value.map(sanitize_string).filter(|v| !v.is_empty());
    validate_optional_text(cleaned.as_deref(), "description", MAX_DESCRIPTION_LEN)?;
    Ok(cleaned)
}
