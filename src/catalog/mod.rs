//! The catalog domain: products, categories, category groups, and blog
//! posts, with in-memory stores and dataset wiring

pub mod blog;
pub mod category;
pub mod group;
pub mod macros;
pub mod product;

pub use blog::{BlogDescriptor, BlogHandlers, BlogPost, blog_dataset};
pub use category::{Category, CategoryDescriptor, CategoryHandlers, category_dataset};
pub use group::{
    Affiliation, CategoryGroup, CategoryGroupDescriptor, CategoryGroupHandlers,
    category_group_dataset,
};
pub use product::{Product, ProductDescriptor, ProductHandlers, product_dataset};

use crate::core::error::GridResult;
use crate::storage::MemoryStore;
use crate::table::{TableSession, TableView};

/// All four catalog stores, shared by datasets and route states
#[derive(Clone, Default)]
pub struct CatalogStores {
    pub products: MemoryStore<Product>,
    pub categories: MemoryStore<Category>,
    pub groups: MemoryStore<CategoryGroup>,
    pub posts: MemoryStore<BlogPost>,
}

impl CatalogStores {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the category-management session hosting the category and
/// category-group datasets behind one selector
pub fn categories_session(stores: &CatalogStores) -> GridResult<TableSession> {
    let products = stores.products.clone();
    let category_view = TableView::new(
        category_dataset(
            "Category",
            "New Category",
            stores.categories.clone(),
            stores.groups.clone(),
            move |category| {
                products
                    .count_where(|p| p.category_id == category.id)
                    .unwrap_or(0)
            },
        )
        .map_err(crate::core::error::GridError::from)?,
    )?;

    let categories = stores.categories.clone();
    let group_view = TableView::new(
        category_group_dataset(
            "Category Group",
            "New Category Group",
            stores.groups.clone(),
            move |group| {
                categories
                    .count_where(|c| c.category_group_id == group.id)
                    .unwrap_or(0)
            },
        )
        .map_err(crate::core::error::GridError::from)?,
    )?;

    let mut session = TableSession::new();
    session.add_view(category_view);
    session.add_view(group_view);
    Ok(session)
}
