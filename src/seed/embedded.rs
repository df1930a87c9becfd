//! Built-in reference data for the storefront home screen
//!
//! One promotional banner, the five quick-action categories, and five
//! popular products. Deployments that need different content supply a seed
//! file instead (see [`SeedFile`](super::SeedFile)).

use super::{CollectionTarget, Record, SeedSource};
use eyre::Result;

pub const BANNERS: &str = "banners";
pub const CATEGORIES: &str = "categories";
pub const POPULAR_PRODUCTS: &str = "popular_products";

/// Seed source backed by the compiled-in storefront data
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSeed;

impl EmbeddedSeed {
    pub fn new() -> Self {
        Self
    }
}

impl SeedSource for EmbeddedSeed {
    fn list(&self) -> Result<Vec<CollectionTarget>> {
        Ok(vec![
            CollectionTarget::new(BANNERS, banners())?,
            CollectionTarget::new(CATEGORIES, categories())?,
            CollectionTarget::new(POPULAR_PRODUCTS, popular_products())?,
        ])
    }
}

fn banners() -> Vec<Record> {
    vec![
        Record::new()
            .with("titlePart1", "Shop with ")
            .with("titlePart2", "100% cashback")
            .with("subtitle", "On Shopee")
            .with("buttonText", "I want!")
            .with("offerText", "Best offer!")
            .with(
                "imageUrl",
                "https://www.pngall.com/wp-content/uploads/5/Headphone-Transparent.png",
            ),
    ]
}

fn categories() -> Vec<Record> {
    [
        ("Earn 100%", "percent"),
        ("Tax note", "description_outlined"),
        ("Primum", "diamond_outlined"),
        ("Challenge", "emoji_events_outlined"),
        ("More", "more_horiz"),
    ]
    .into_iter()
    .map(|(name, icon)| Record::new().with("name", name).with("iconName", icon))
    .collect()
}

fn popular_products() -> Vec<Record> {
    let product = |name: &str, image_url: &str, cashback: &str, is_favorite: bool| {
        Record::new()
            .with("name", name)
            .with("imageUrl", image_url)
            .with("cashback", cashback)
            .with("isFavorite", is_favorite)
    };

    vec![
        product(
            "Monitor LED 4K 28\"",
            "https://images.samsung.com/is/image/samsung/p6pim/sa_en/ls28bg700emxue/gallery/sa_en-odyssey-g7-g70b-ls28bg700emxue-534082512?$730_584_PNG$",
            "2% cashback",
            false,
        ),
        product(
            "Row balance 480 low",
            "https://www.converse.com/dw/image/v2/BCMP_PRD/on/demandware.static/-/Sites-converse-master-catalog/default/dw9959042f/images/a_08/A00707C_A_08X1.jpg?sw=406",
            "8%cashback",
            false,
        ),
        product(
            "Gaming Mouse Pro",
            "https://resource.logitechg.com/w_600,c_limit,q_auto,f_auto,dpr_1.0/d_transparent.gif/content/dam/gaming/en/products/pro-x-superlight/pro-x-superlight-black-gallery-1.png?v=1",
            "5% cashback",
            false,
        ),
        product(
            "Wireless Earbuds X",
            "https://www.beatsbydre.com/content/dam/beats/web/product/earbuds/studiopbuds-plus/pdp/product-carousel/transparent/pc-studiopbuds-plus-transparent-v2.png",
            "10% cashback",
            true,
        ),
        product(
            "Smart Watch Series 7",
            "https://store.storeimages.cdn-apple.com/4982/as-images.apple.com/is/ML6H3_VW_34FR+watch-41-alum-midnight-nc-7s_VW_34FR_WF_CO_GEO_FR?wid=700&hei=700&trim=1%2C0&fmt=p-jpg&qlt=95&.v=1631832067000%2C1632174302000",
            "3% cashback",
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::FieldValue;

    #[test]
    fn test_collection_order_and_sizes() {
        let targets = EmbeddedSeed.list().unwrap();
        let summary: Vec<_> = targets.iter().map(|t| (t.name(), t.len())).collect();
        assert_eq!(
            summary,
            vec![(BANNERS, 1), (CATEGORIES, 5), (POPULAR_PRODUCTS, 5)]
        );
    }

    #[test]
    fn test_only_one_favorite_product() {
        let targets = EmbeddedSeed.list().unwrap();
        let favorites: Vec<_> = targets[2]
            .records()
            .iter()
            .filter(|r| r.get("isFavorite") == Some(&FieldValue::Boolean(true)))
            .collect();
        assert_eq!(favorites.len(), 1);
        assert_eq!(
            favorites[0].get("name"),
            Some(&FieldValue::from("Wireless Earbuds X"))
        );
    }

    #[test]
    fn test_banner_keeps_trailing_space() {
        let targets = EmbeddedSeed.list().unwrap();
        assert_eq!(
            targets[0].records()[0].get("titlePart1"),
            Some(&FieldValue::from("Shop with "))
        );
    }
}
