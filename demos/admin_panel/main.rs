//! Catalog Admin Panel Example
//!
//! Wires the four catalog datasets into one server:
//! - Paginated list + multipart form-action routes per dataset
//! - Batched update, bulk delete, and draft actions via `_method`
//! - An event bus announcing every successful mutation

use gridset::catalog::{
    BlogDescriptor, BlogHandlers, CatalogStores, CategoryDescriptor, CategoryGroupDescriptor,
    CategoryGroupHandlers, CategoryHandlers, ProductDescriptor, ProductHandlers,
};
use gridset::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = PanelConfig::default_config();
    let stores = CatalogStores::new();
    populate_test_data(&stores)?;

    let events = EventBus::new(1024);
    let plural = |key: &str| {
        config
            .dataset(key)
            .map(|d| d.plural.clone())
            .unwrap_or_else(|| format!("{}s", key))
    };

    let product_state = DatasetRouteState::new(
        "product",
        plural("product"),
        stores.products.clone(),
        Arc::new(ProductHandlers::new(
            stores.products.clone(),
            stores.categories.clone(),
        )),
        events.clone(),
    );

    let category_state = DatasetRouteState::new(
        "category",
        plural("category"),
        stores.categories.clone(),
        Arc::new(CategoryHandlers::new(
            stores.categories.clone(),
            stores.groups.clone(),
        )),
        events.clone(),
    );

    let group_state = DatasetRouteState::new(
        "category_group",
        plural("category_group"),
        stores.groups.clone(),
        Arc::new(CategoryGroupHandlers::new(stores.groups.clone())),
        events.clone(),
    );

    let blog_state = DatasetRouteState::new(
        "blog_post",
        plural("blog_post"),
        stores.posts.clone(),
        Arc::new(BlogHandlers::new(stores.posts.clone())),
        events.clone(),
    );

    // Log every mutation the panel performs
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok(envelope) = rx.recv().await {
            tracing::info!(
                dataset = envelope.event.dataset(),
                action = envelope.event.action(),
                "catalog mutation"
            );
        }
    });

    println!("🚀 Starting catalog admin panel");
    println!("📦 Datasets: products, categories, category_groups, blog_posts");

    let builder = ServerBuilder::new()
        .register_dataset(Box::new(ProductDescriptor::new(product_state)))
        .register_dataset(Box::new(CategoryDescriptor::new(category_state)))
        .register_dataset(Box::new(CategoryGroupDescriptor::new(group_state)))
        .register_dataset(Box::new(BlogDescriptor::new(blog_state)));

    println!("\n🌐 Server running on http://127.0.0.1:3000");
    println!("\n📚 Routes per dataset:");
    println!("    GET    /admin/products?page=1&limit=10&sort=name:asc&filter=soap");
    println!("    POST   /admin/products        - multipart, _method=create|update|delete");
    println!("    POST   /admin/blog_posts      - _method=draft saves a partial post");
    println!("    GET    /health");

    builder.serve("127.0.0.1:3000").await?;
    Ok(())
}

/// Seed the stores so the panel has something to show
fn populate_test_data(stores: &CatalogStores) -> Result<()> {
    let skincare_group = CategoryGroup::new("Skincare".to_string(), Affiliation::Product);
    let services_group = CategoryGroup::new("Treatments".to_string(), Affiliation::Service);
    stores.groups.add(skincare_group.clone())?;
    stores.groups.add(services_group)?;

    let moisturizers = Category::new("Moisturizers".to_string(), skincare_group.id);
    let cleansers = Category::new("Cleansers".to_string(), skincare_group.id);
    stores.categories.add(moisturizers.clone())?;
    stores.categories.add(cleansers.clone())?;

    stores.products.add(Product::new(
        "Rosewater Lotion".to_string(),
        Some("Light daily moisturizer".to_string()),
        Some("https://cdn.example.com/rosewater.png".to_string()),
        moisturizers.id,
    ))?;
    stores.products.add(Product::new(
        "Clay Cleanser".to_string(),
        None,
        None,
        cleansers.id,
    ))?;

    stores.posts.add(BlogPost::new(
        "Winter skin care".to_string(),
        "Cold air dries skin faster than you think.".to_string(),
        None,
        false,
    ))?;

    Ok(())
}
