//! Catalog-side product types consumed by the listing pipeline.

use serde::{Deserialize, Serialize};

/// Shipping arrangement offered with a listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingOption {
    /// Buyer collects in person.
    Pickup,
    /// Seller ships.
    Ship,
    /// Both pickup and shipping.
    #[default]
    Both,
}

impl ShippingOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingOption::Pickup => "pickup",
            ShippingOption::Ship => "ship",
            ShippingOption::Both => "both",
        }
    }
}

/// A product as the external catalog hands it to us.
///
/// The catalog itself (storage, admin UI, metadata editing) is outside this
/// crate; this is the projection the listing pipeline needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Catalog-side product identifier.
    pub id: String,
    /// Product name, used as the listing title.
    pub name: String,
    /// Long description body.
    #[serde(default)]
    pub description: String,
    /// Price as the catalog formatted it; passed through verbatim.
    #[serde(default)]
    pub price: String,
    /// Main product image URL, if any.
    #[serde(default)]
    pub main_image: Option<String>,
    /// Additional gallery image URLs.
    #[serde(default)]
    pub gallery_images: Vec<String>,
    /// Catalog category ids this product belongs to, in catalog order.
    #[serde(default)]
    pub category_ids: Vec<String>,
}
