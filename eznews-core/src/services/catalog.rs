//! Catalog service - categories and article detail

use serde::Deserialize;

use crate::domain::result::Result;
use crate::domain::{ArticleSummary, Category};
use crate::services::api::ApiClient;

/// `GET /categories` has answered both wrapped and bare
#[derive(Deserialize)]
#[serde(untagged)]
enum CategoriesBody {
    Wrapped { categories: Vec<Category> },
    Bare(Vec<Category>),
}

pub struct CatalogService {
    api: ApiClient,
}

impl CatalogService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Categories for the category selector
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let body: CategoriesBody = self.api.get("/categories", Vec::new()).await?;
        Ok(match body {
            CategoriesBody::Wrapped { categories } => categories,
            CategoriesBody::Bare(categories) => categories,
        })
    }

    /// Full article, including its content and, when logged in, whether it
    /// is bookmarked
    pub async fn article(&self, id: i64) -> Result<ArticleSummary> {
        self.api.get(&format!("/articles/{}", id), Vec::new()).await
    }
}
