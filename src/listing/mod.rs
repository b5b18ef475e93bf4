//! Listing preparation and the marketplace posting boundary.
//!
//! Draft assembly and category-mapping resolution are real logic; the
//! submission itself is a contract only. A production deployment supplies a
//! [`ListingPoster`] that drives whatever interface the marketplace exposes
//! (authenticate, navigate, fill, submit, extract the resulting listing).

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::Settings;
use crate::models::{CatalogProduct, ShippingOption};

/// Errors surfaced by the posting pipeline. These are the genuinely
/// actionable conditions; scraper-side failures never reach here.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Marketplace credentials not set; configure a username and password")]
    MissingCredentials,

    #[error("No marketplace category mapping found for product {0}")]
    MissingCategoryMapping(String),

    #[error("Product {0} has not been posted to the marketplace yet")]
    NotPosted(String),

    #[error("Marketplace error: {0}")]
    Marketplace(String),
}

/// A marketplace category assignment for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAssignment {
    /// Marketplace category id.
    pub category: String,
    /// Marketplace subcategory id, if any.
    #[serde(default)]
    pub subcategory: Option<String>,
}

/// Mapping from catalog category id to marketplace assignment.
pub type CategoryMapping = HashMap<String, CategoryAssignment>;

/// Reference to a listing that exists on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRef {
    pub id: String,
    pub url: String,
}

/// A fully prepared listing, ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    /// Price as the catalog formatted it.
    pub price: String,
    pub shipping: ShippingOption,
    /// Image URLs, main image first.
    pub images: Vec<String>,
}

/// Submits listings to the marketplace.
///
/// No implementation ships with this crate: the marketplace has no public
/// write API, and a real integration is its own project. Implementations
/// must return the marketplace's actual listing id and URL, never a
/// fabricated one.
#[async_trait]
pub trait ListingPoster: Send + Sync {
    /// Create a new listing.
    async fn post(
        &self,
        draft: &ListingDraft,
        assignment: &CategoryAssignment,
    ) -> Result<ListingRef, ListingError>;

    /// Update an existing listing in place.
    async fn update(&self, listing: &ListingRef, draft: &ListingDraft)
        -> Result<(), ListingError>;
}

/// Assemble a draft from a catalog product and the configured defaults.
///
/// The description is always prefix, body, suffix joined by blank lines,
/// matching what sellers configured even when prefix or suffix is empty.
pub fn build_draft(product: &CatalogProduct, settings: &Settings) -> ListingDraft {
    let description = format!(
        "{}\n\n{}\n\n{}",
        settings.description_prefix, product.description, settings.description_suffix
    );

    let mut images = Vec::new();
    if let Some(main) = &product.main_image {
        images.push(main.clone());
    }
    images.extend(product.gallery_images.iter().cloned());

    ListingDraft {
        title: product.name.clone(),
        description,
        price: product.price.clone(),
        shipping: settings.default_shipping,
        images,
    }
}

/// Resolve the marketplace category for a product.
///
/// A per-product override wins outright; otherwise the first of the
/// product's catalog categories with a usable mapping entry is taken.
pub fn resolve_assignment(
    product: &CatalogProduct,
    override_assignment: Option<&CategoryAssignment>,
    mapping: &CategoryMapping,
) -> Option<CategoryAssignment> {
    if let Some(assignment) = override_assignment {
        if !assignment.category.is_empty() {
            return Some(assignment.clone());
        }
    }

    product
        .category_ids
        .iter()
        .filter_map(|catalog_id| mapping.get(catalog_id))
        .find(|assignment| !assignment.category.is_empty())
        .cloned()
}

/// Guards and orchestration for posting catalog products.
pub struct ListingPipeline {
    settings: Settings,
    mapping: CategoryMapping,
}

impl ListingPipeline {
    pub fn new(settings: Settings, mapping: CategoryMapping) -> Self {
        Self { settings, mapping }
    }

    /// Post a product as a new listing.
    pub async fn post_product(
        &self,
        poster: &dyn ListingPoster,
        product: &CatalogProduct,
        override_assignment: Option<&CategoryAssignment>,
    ) -> Result<ListingRef, ListingError> {
        if !self.settings.has_credentials() {
            return Err(ListingError::MissingCredentials);
        }

        let assignment = resolve_assignment(product, override_assignment, &self.mapping)
            .ok_or_else(|| ListingError::MissingCategoryMapping(product.id.clone()))?;

        let draft = build_draft(product, &self.settings);
        let listing = poster.post(&draft, &assignment).await?;
        info!("Posted product {} as listing {}", product.id, listing.id);
        Ok(listing)
    }

    /// Update a product's existing listing.
    pub async fn update_product(
        &self,
        poster: &dyn ListingPoster,
        product: &CatalogProduct,
        existing: Option<&ListingRef>,
    ) -> Result<(), ListingError> {
        let listing = existing.ok_or_else(|| ListingError::NotPosted(product.id.clone()))?;

        if !self.settings.has_credentials() {
            return Err(ListingError::MissingCredentials);
        }

        let draft = build_draft(product, &self.settings);
        poster.update(listing, &draft).await?;
        info!("Updated listing {} for product {}", listing.id, product.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn product() -> CatalogProduct {
        CatalogProduct {
            id: "sku-1".to_string(),
            name: "Stoel".to_string(),
            description: "Een prima stoel.".to_string(),
            price: "25,00".to_string(),
            main_image: Some("https://shop.example/stoel.jpg".to_string()),
            gallery_images: vec!["https://shop.example/stoel-2.jpg".to_string()],
            category_ids: vec!["42".to_string()],
        }
    }

    fn settings_with_credentials() -> Settings {
        let mut settings = Settings::default();
        settings.username = Some("shop".to_string());
        settings.password = Some("geheim".to_string());
        settings.description_prefix = "Uit onze winkel:".to_string();
        settings.description_suffix = "Afhalen of verzenden.".to_string();
        settings
    }

    fn mapping() -> CategoryMapping {
        [(
            "42".to_string(),
            CategoryAssignment {
                category: "7".to_string(),
                subcategory: Some("stoelen".to_string()),
            },
        )]
        .into_iter()
        .collect()
    }

    struct RecordingPoster {
        posted: Mutex<Vec<(ListingDraft, CategoryAssignment)>>,
    }

    impl RecordingPoster {
        fn new() -> Self {
            Self {
                posted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ListingPoster for RecordingPoster {
        async fn post(
            &self,
            draft: &ListingDraft,
            assignment: &CategoryAssignment,
        ) -> Result<ListingRef, ListingError> {
            self.posted
                .lock()
                .unwrap()
                .push((draft.clone(), assignment.clone()));
            Ok(ListingRef {
                id: "12345".to_string(),
                url: "https://www.marktplaats.nl/v/12345".to_string(),
            })
        }

        async fn update(
            &self,
            _listing: &ListingRef,
            _draft: &ListingDraft,
        ) -> Result<(), ListingError> {
            Ok(())
        }
    }

    #[test]
    fn test_draft_description_assembly() {
        let draft = build_draft(&product(), &settings_with_credentials());
        assert_eq!(
            draft.description,
            "Uit onze winkel:\n\nEen prima stoel.\n\nAfhalen of verzenden."
        );
        assert_eq!(draft.title, "Stoel");
        assert_eq!(draft.price, "25,00");
    }

    #[test]
    fn test_draft_images_main_first() {
        let draft = build_draft(&product(), &Settings::default());
        assert_eq!(
            draft.images,
            vec![
                "https://shop.example/stoel.jpg".to_string(),
                "https://shop.example/stoel-2.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_resolve_override_wins() {
        let override_assignment = CategoryAssignment {
            category: "3".to_string(),
            subcategory: None,
        };
        let resolved = resolve_assignment(&product(), Some(&override_assignment), &mapping());
        assert_eq!(resolved.unwrap().category, "3");
    }

    #[test]
    fn test_resolve_falls_back_to_mapping() {
        let resolved = resolve_assignment(&product(), None, &mapping());
        assert_eq!(resolved.unwrap().category, "7");
    }

    #[test]
    fn test_resolve_skips_empty_mapping_entries() {
        let mut incomplete = CategoryMapping::new();
        incomplete.insert(
            "42".to_string(),
            CategoryAssignment {
                category: String::new(),
                subcategory: None,
            },
        );
        assert!(resolve_assignment(&product(), None, &incomplete).is_none());
    }

    #[tokio::test]
    async fn test_post_requires_credentials() {
        let pipeline = ListingPipeline::new(Settings::default(), mapping());
        let poster = RecordingPoster::new();
        let result = pipeline.post_product(&poster, &product(), None).await;
        assert!(matches!(result, Err(ListingError::MissingCredentials)));
        assert!(poster.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_requires_mapping() {
        let pipeline =
            ListingPipeline::new(settings_with_credentials(), CategoryMapping::new());
        let poster = RecordingPoster::new();
        let result = pipeline.post_product(&poster, &product(), None).await;
        assert!(matches!(
            result,
            Err(ListingError::MissingCategoryMapping(_))
        ));
    }

    #[tokio::test]
    async fn test_post_submits_draft_and_assignment() {
        let pipeline = ListingPipeline::new(settings_with_credentials(), mapping());
        let poster = RecordingPoster::new();

        let listing = pipeline
            .post_product(&poster, &product(), None)
            .await
            .unwrap();
        assert_eq!(listing.id, "12345");

        let posted = poster.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].1.category, "7");
    }

    #[tokio::test]
    async fn test_update_requires_prior_listing() {
        let pipeline = ListingPipeline::new(settings_with_credentials(), mapping());
        let poster = RecordingPoster::new();
        let result = pipeline.update_product(&poster, &product(), None).await;
        assert!(matches!(result, Err(ListingError::NotPosted(_))));
    }
}
