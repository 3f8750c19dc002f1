//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: Green tea
//!     category: Tea
//!     price: "4.50"
//! ```
//!
//! Prices are quoted so they are read as exact decimals. Products whose
//! name and category already exist are skipped, so seeding twice is safe.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use corner_shop_core::db::{ProductRepository, create_pool};
use corner_shop_core::{NewProduct, ProductForm};

/// Top-level layout of the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<SeedProduct>,
}

/// One product entry in the seed file.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub category: String,
    pub price: String,
    /// Path relative to the storefront media directory.
    #[serde(default)]
    pub photo: Option<String>,
}

/// Validate every entry with the same rules as the product form.
///
/// Returns one message per invalid entry, naming its position.
///
/// # Errors
///
/// Returns the list of problems if any entry is invalid.
pub fn validate(file: &SeedFile) -> Result<Vec<NewProduct>, Vec<String>> {
    let mut products = Vec::with_capacity(file.products.len());
    let mut problems = Vec::new();

    for (index, entry) in file.products.iter().enumerate() {
        let form = ProductForm {
            name: entry.name.clone(),
            category: entry.category.clone(),
            price: entry.price.clone(),
        };
        match form.validate() {
            Ok(mut product) => {
                product.photo.clone_from(&entry.photo);
                products.push(product);
            }
            Err(errors) => {
                for field in ["name", "category", "price"] {
                    if let Some(message) = errors.field(field) {
                        problems.push(format!("product #{} {field}: {message}", index + 1));
                    }
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(products)
    } else {
        Err(problems)
    }
}

/// Insert the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is missing, the file cannot be read or
/// parsed, an entry is invalid, or a database operation fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");
    let content = tokio::fs::read_to_string(path).await?;
    let file: SeedFile = serde_yaml::from_str(&content)?;

    // Validate before connecting to the database
    let products = match validate(&file) {
        Ok(products) => products,
        Err(problems) => {
            error!("Seed file validation failed:");
            for problem in &problems {
                error!("  - {problem}");
            }
            return Err(format!("{} validation errors found", problems.len()).into());
        }
    };

    let pool = create_pool(&database_url).await?;
    let repo = ProductRepository::new(&pool);

    let existing: HashSet<(String, String)> = repo
        .list(None)
        .await?
        .into_iter()
        .map(|p| (p.name, p.category))
        .collect();

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;
    for product in &products {
        if existing.contains(&(product.name.clone(), product.category.clone())) {
            skipped += 1;
            continue;
        }
        repo.create(product).await?;
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_seed_file_is_valid() {
        let content = include_str!("../../seed/products.yaml");
        let file: SeedFile = serde_yaml::from_str(content).unwrap();
        let products = validate(&file).unwrap();
        assert_eq!(products.len(), file.products.len());
        assert!(!products.is_empty());
    }

    #[test]
    fn test_invalid_entries_are_reported() {
        let file: SeedFile = serde_yaml::from_str(
            r#"
products:
  - name: Mug
    category: Kitchen
    price: "3.00"
  - name: ""
    category: Kitchen
    price: "-1"
"#,
        )
        .unwrap();

        let problems = validate(&file).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("product #2 name"));
        assert!(problems[1].starts_with("product #2 price"));
    }

    #[test]
    fn test_oversized_price_is_reported() {
        let file: SeedFile = serde_yaml::from_str(
            r#"
products:
  - name: Yacht
    category: Leisure
    price: "250000000"
"#,
        )
        .unwrap();

        let problems = validate(&file).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("product #1 price"));
    }

    #[test]
    fn test_photo_is_carried_over() {
        let file: SeedFile = serde_yaml::from_str(
            r#"
products:
  - name: Kettle
    category: Kitchen
    price: "25"
    photo: products/kettle.jpg
"#,
        )
        .unwrap();

        let products = validate(&file).unwrap();
        assert_eq!(products[0].photo.as_deref(), Some("products/kettle.jpg"));
    }
}
