//! Tenant Directory: restaurant records, slugs and login tracking

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{Restaurant, RestaurantUpdate, SettingsUpdate, UserRecord};
use shared::util::{new_record_id, now_millis};
use shared::validation::{
    MAX_DESCRIPTION_LEN, MAX_ITEM_NAME_LEN, validate_email, validate_optional_text,
    validate_restaurant_name,
};

use crate::db::{Store, StoreError};
use crate::error::ServiceResult;
use crate::host_router::is_reserved_label;
use crate::identity::Principal;
use crate::util::slugify;

/// Used when neither a display name nor an email local part is usable
const FALLBACK_NAME: &str = "My Restaurant";

/// Numbered slug candidates tried before falling back to a random suffix
const MAX_SLUG_ATTEMPTS: u32 = 20;

const MAX_INSERT_ATTEMPTS: u32 = 3;

const SUFFIX_LEN: usize = 6;

/// Currency codes are ISO 4217 (three letters)
const CURRENCY_LEN: usize = 3;

#[derive(Clone)]
pub struct TenantService {
    store: Arc<dyn Store>,
}

impl TenantService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Existing restaurant for `principal`, or a new one.
    ///
    /// `name` is the sign-up restaurant name; federated sign-ins pass `None`
    /// and fall back to the display name, then the email local part.
    pub async fn ensure_for_principal(
        &self,
        principal: &Principal,
        name: Option<&str>,
    ) -> ServiceResult<(Restaurant, bool)> {
        if let Some(existing) = self.store.find_restaurant_by_owner(&principal.id).await? {
            return Ok((existing, false));
        }

        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| fallback_name(principal));
        let now = now_millis();
        let mut restaurant = Restaurant {
            id: new_record_id(),
            owner_id: principal.id.clone(),
            slug: String::new(),
            name,
            email: principal.email.clone(),
            settings: Default::default(),
            profile: Default::default(),
            created_at: now,
            updated_at: now,
        };

        let base = match slugify(&restaurant.name) {
            s if s.is_empty() => "restaurant".to_string(),
            s => s,
        };
        for _ in 0..MAX_INSERT_ATTEMPTS {
            restaurant.slug = self.free_slug(&base).await?;
            match self.store.insert_restaurant(&restaurant).await {
                Ok(()) => {
                    tracing::info!(
                        tenant_id = %restaurant.id,
                        slug = %restaurant.slug,
                        "Restaurant created"
                    );
                    return Ok((restaurant, true));
                }
                Err(StoreError::Duplicate(_)) => {
                    // Owner got a restaurant concurrently, or the slug was just taken
                    if let Some(existing) =
                        self.store.find_restaurant_by_owner(&principal.id).await?
                    {
                        return Ok((existing, false));
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::conflict("Could not allocate a storefront address").into())
    }

    /// `base`, else `base-2`, `base-3`, ..., else `base-<random>`.
    ///
    /// Host Router reserved labels count as taken: `www.<root>` would
    /// never reach the storefront.
    async fn free_slug(&self, base: &str) -> ServiceResult<String> {
        for n in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = if n == 1 {
                base.to_string()
            } else {
                format!("{base}-{n}")
            };
            if is_reserved_label(&candidate) {
                continue;
            }
            if self.store.find_restaurant_by_slug(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Ok(format!("{base}-{}", random_suffix()))
    }

    pub async fn get(&self, tenant_id: &str) -> ServiceResult<Restaurant> {
        self.store
            .find_restaurant(tenant_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound).into())
    }

    /// Storefront lookup: slug first, then id.
    pub async fn resolve_storefront(&self, slug_or_id: &str) -> ServiceResult<Restaurant> {
        let key = slug_or_id.to_ascii_lowercase();
        if let Some(restaurant) = self.store.find_restaurant_by_slug(&key).await? {
            return Ok(restaurant);
        }
        self.store
            .find_restaurant(slug_or_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::TenantNotFound).into())
    }

    pub async fn update_profile(
        &self,
        tenant_id: &str,
        mut update: RestaurantUpdate,
    ) -> ServiceResult<Restaurant> {
        if let Some(name) = update.name.as_deref() {
            update.name = Some(validate_restaurant_name(name)?);
        }
        if let Some(email) = update.email.as_deref() {
            update.email = Some(validate_email(email)?);
        }
        validate_optional_text(update.description.as_deref(), "description", MAX_DESCRIPTION_LEN)?;
        validate_optional_text(update.location.as_deref(), "location", MAX_ITEM_NAME_LEN)?;
        validate_optional_text(
            update.opening_hours.as_deref(),
            "opening_hours",
            MAX_ITEM_NAME_LEN,
        )?;
        validate_optional_text(update.phone.as_deref(), "phone", MAX_ITEM_NAME_LEN)?;

        let mut restaurant = self.get(tenant_id).await?;
        restaurant.apply_update(update, now_millis());
        self.store.update_restaurant(&restaurant).await?;
        tracing::info!(tenant_id = %tenant_id, "Restaurant profile updated");
        Ok(restaurant)
    }

    pub async fn update_settings(
        &self,
        tenant_id: &str,
        mut update: SettingsUpdate,
    ) -> ServiceResult<Restaurant> {
        if let Some(currency) = update.currency.as_deref() {
            let code = currency.trim().to_ascii_uppercase();
            if code.len() != CURRENCY_LEN || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(AppError::validation("Currency must be a three-letter code")
                    .with_detail("field", "currency")
                    .into());
            }
            update.currency = Some(code);
        }
        for (field, value) in [
            ("tax_rate", update.tax_rate),
            ("service_charge", update.service_charge),
        ] {
            if let Some(v) = value
                && (v.is_sign_negative() || v > rust_decimal::Decimal::ONE_HUNDRED)
            {
                return Err(AppError::new(ErrorCode::ValueOutOfRange)
                    .with_detail("field", field)
                    .into());
            }
        }

        let mut restaurant = self.get(tenant_id).await?;
        restaurant.apply_settings(update, now_millis());
        self.store.update_restaurant(&restaurant).await?;
        Ok(restaurant)
    }

    /// Best-effort login bookkeeping. Never fails the caller.
    pub async fn track_login(&self, principal: &Principal, restaurant_name: Option<&str>) {
        if let Err(e) = self.try_track_login(principal, restaurant_name).await {
            tracing::warn!(principal = %principal.id, error = ?e, "Login tracking failed");
        }
    }

    async fn try_track_login(
        &self,
        principal: &Principal,
        restaurant_name: Option<&str>,
    ) -> Result<(), StoreError> {
        let now = now_millis();
        let mut record = match self.store.find_user_record(&principal.id).await? {
            Some(mut record) => {
                record.record_login(now);
                record
            }
            None => UserRecord::new(&principal.id, &principal.email, now),
        };
        if let Some(name) = restaurant_name {
            record.restaurant_name = Some(name.to_string());
        }
        self.store.upsert_user_record(&record).await
    }
}

fn fallback_name(principal: &Principal) -> String {
    let candidates = [
        principal.display_name.clone(),
        principal.email.split('@').next().map(str::to_string),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| validate_restaurant_name(&candidate).ok())
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

/// Lowercase alphanumeric tail for a slug whose numbered forms are all taken
fn random_suffix() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
