//! Restaurant (tenant) model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One customer of the platform; the unit of data isolation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Restaurant {
    pub id: String,
    /// Identity provider principal that owns this restaurant (one-to-one)
    pub owner_id: String,
    /// URL label used as the storefront subdomain
    pub slug: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub settings: RestaurantSettings,
    #[serde(default)]
    pub profile: RestaurantProfile,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Free-form settings. Stored and displayed, never enforced on orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantSettings {
    pub currency: String,
    /// Percentage, e.g. 8.25
    pub tax_rate: Decimal,
    /// Percentage
    pub service_charge: Decimal,
}

impl Default for RestaurantSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            tax_rate: Decimal::ZERO,
            service_charge: Decimal::ZERO,
        }
    }
}

/// Public-facing profile shown on the storefront
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RestaurantProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialMedia {
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
}

/// Profile edit payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub location: Option<String>,
    pub opening_hours: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
    pub social_media: Option<SocialMedia>,
}

/// Settings edit payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub currency: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub service_charge: Option<Decimal>,
}

impl Restaurant {
    /// Apply a profile edit; owner, slug and creation time never change here.
    pub fn apply_update(&mut self, update: RestaurantUpdate, now: i64) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        let profile = &mut self.profile;
        if update.location.is_some() {
            profile.location = update.location;
        }
        if update.opening_hours.is_some() {
            profile.opening_hours = update.opening_hours;
        }
        if update.description.is_some() {
            profile.description = update.description;
        }
        if update.phone.is_some() {
            profile.phone = update.phone;
        }
        if update.address.is_some() {
            profile.address = update.address;
        }
        if update.social_media.is_some() {
            profile.social_media = update.social_media;
        }
        self.updated_at = now;
    }

    pub fn apply_settings(&mut self, update: SettingsUpdate, now: i64) {
        if let Some(currency) = update.currency {
            self.settings.currency = currency;
        }
        if let Some(tax_rate) = update.tax_rate {
            self.settings.tax_rate = tax_rate;
        }
        if let Some(service_charge) = update.service_charge {
            self.settings.service_charge = service_charge;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Restaurant {
        Restaurant {
            id: "r1".into(),
            owner_id: "u1".into(),
            slug: "acme".into(),
            name: "Acme".into(),
            email: "owner@acme.test".into(),
            settings: RestaurantSettings::default(),
            profile: RestaurantProfile::default(),
            created_at: 100,
            updated_at: 100,
        }
    }

    #[test]
    fn test_apply_update_keeps_owner_and_created() {
        let mut r = sample();
        r.apply_update(
            RestaurantUpdate {
                name: Some("Acme Diner".into()),
                phone: Some("555-0100".into()),
                ..Default::default()
            },
            200,
        );
        assert_eq!(r.name, "Acme Diner");
        assert_eq!(r.profile.phone.as_deref(), Some("555-0100"));
        assert_eq!(r.owner_id, "u1");
        assert_eq!(r.created_at, 100);
        assert_eq!(r.updated_at, 200);
    }

    #[test]
    fn test_apply_settings_partial() {
        let mut r = sample();
        r.apply_settings(
            SettingsUpdate {
                tax_rate: Some(Decimal::new(825, 2)),
                ..Default::default()
            },
            300,
        );
        assert_eq!(r.settings.currency, "USD");
        assert_eq!(r.settings.tax_rate, Decimal::new(825, 2));
    }

    #[test]
    fn test_missing_settings_default_on_deserialize() {
        let json = r#"{"id":"r1","owner_id":"u1","slug":"acme","name":"Acme",
            "email":"a@b.co","created_at":1,"updated_at":1}"#;
        let r: Restaurant = serde_json::from_str(json).unwrap();
        assert_eq!(r.settings, RestaurantSettings::default());
    }
}
