//! Admin product management.
//!
//! The product editor keeps its variant matrix as a session-held draft.
//! The size/color inputs and the matrix grid post to the `draft_*` handlers
//! via HTMX; each one applies a single reconciler operation and re-renders
//! the grid fragment. Saving assembles the final product from the form
//! fields plus the draft matrix and persists it through the API.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::str::FromStr;
use tower_sessions::Session;
use tracing::instrument;

use amaranta_core::{Badge, Category, Price, Product, ProductId, VariantMatrix};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::session;
use crate::state::AppState;

use super::super::Shell;

/// Session key for the variant matrix draft.
const DRAFT_KEY: &str = "product_draft";

/// The in-progress variant matrix of the product being edited.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct ProductDraft {
    /// `None` while creating a new product.
    pub id: Option<ProductId>,
    pub matrix: VariantMatrix,
    /// Review data fetched with the product; the form never edits these,
    /// they are echoed back on update so a save does not zero them.
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews_count: u32,
}

async fn load_draft(session_handle: &Session) -> Result<ProductDraft> {
    session_handle
        .get::<ProductDraft>(DRAFT_KEY)
        .await?
        .ok_or_else(|| AppError::BadRequest("no product draft in progress".to_string()))
}

async fn save_draft(session_handle: &Session, draft: &ProductDraft) -> Result<()> {
    session_handle.insert(DRAFT_KEY, draft).await?;
    Ok(())
}

// =============================================================================
// Views
// =============================================================================

/// One row of the admin product table.
#[derive(Clone)]
pub struct AdminProductView {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: &'static str,
    pub price: String,
    pub total_stock: u32,
    pub variant_count: usize,
    pub active: bool,
    pub featured: bool,
}

impl From<&Product> for AdminProductView {
    fn from(product: &Product) -> Self {
        let total_stock = if product.variants.is_empty() {
            product.stock
        } else {
            product.variants.iter().map(|v| v.stock).sum()
        };
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            category: product.category.label(),
            price: product.price.to_string(),
            total_stock,
            variant_count: product.variants.len(),
            active: product.active,
            featured: product.featured,
        }
    }
}

/// Prefilled values for the product editor form. All strings so the
/// template can render a blank form and an edit form the same way.
#[derive(Clone, Default)]
pub struct ProductFormView {
    pub name: String,
    pub sku: String,
    pub description: String,
    pub price: String,
    pub original_price: String,
    pub category: &'static str,
    pub image: String,
    /// One image reference per line.
    pub images: String,
    pub badge: String,
    pub featured: bool,
    pub on_sale: bool,
    pub active: bool,
    pub stock: String,
    pub materials: String,
    pub care: String,
    /// One feature per line.
    pub features: String,
    pub fit: String,
}

impl ProductFormView {
    fn blank() -> Self {
        Self {
            category: Category::Women.as_str(),
            active: true,
            ..Self::default()
        }
    }
}

impl From<&Product> for ProductFormView {
    fn from(product: &Product) -> Self {
        let details = product.details.clone().unwrap_or_default();
        Self {
            name: product.name.clone(),
            sku: product.sku.clone().unwrap_or_default(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            original_price: product
                .original_price
                .map(|p| p.amount().to_string())
                .unwrap_or_default(),
            category: product.category.as_str(),
            image: product.image.clone(),
            images: product.images.join("\n"),
            badge: match product.badge {
                Some(Badge::New) => "new",
                Some(Badge::Sale) => "sale",
                Some(Badge::Exclusive) => "exclusive",
                Some(Badge::BestSeller) => "best-seller",
                None => "",
            }
            .to_string(),
            featured: product.featured,
            on_sale: product.on_sale,
            active: product.active,
            stock: product.stock.to_string(),
            materials: details.materials,
            care: details.care,
            features: details.features.join("\n"),
            fit: details.fit,
        }
    }
}

/// One cell of the variant matrix grid.
#[derive(Clone)]
pub struct MatrixCellView {
    pub size: String,
    pub color: String,
    pub enabled: bool,
    pub stock: u32,
    pub sku: String,
}

/// One row (a size across all colors) of the variant matrix grid.
#[derive(Clone)]
pub struct MatrixRowView {
    pub size: String,
    pub cells: Vec<MatrixCellView>,
}

/// Variant matrix display data.
#[derive(Clone)]
pub struct MatrixView {
    pub sizes_text: String,
    pub colors_text: String,
    pub colors: Vec<String>,
    pub rows: Vec<MatrixRowView>,
    pub variant_count: usize,
}

impl From<&VariantMatrix> for MatrixView {
    fn from(matrix: &VariantMatrix) -> Self {
        let rows = matrix
            .sizes()
            .iter()
            .map(|size| MatrixRowView {
                size: size.clone(),
                cells: matrix
                    .colors()
                    .iter()
                    .map(|color| {
                        matrix.get(size, color).map_or_else(
                            || MatrixCellView {
                                size: size.clone(),
                                color: color.clone(),
                                enabled: false,
                                stock: 0,
                                sku: String::new(),
                            },
                            |v| MatrixCellView {
                                size: size.clone(),
                                color: color.clone(),
                                enabled: true,
                                stock: v.stock,
                                sku: v.sku.clone().unwrap_or_default(),
                            },
                        )
                    })
                    .collect(),
            })
            .collect();

        Self {
            sizes_text: matrix.sizes().join(", "),
            colors_text: matrix.colors().join(", "),
            colors: matrix.colors().to_vec(),
            rows,
            variant_count: matrix.variants().len(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Admin list filters.
#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    /// Category path segment; empty means all.
    pub category: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
}

/// Option set inputs for the draft matrix.
#[derive(Debug, Deserialize)]
pub struct OptionsForm {
    #[serde(default)]
    pub sizes: String,
    #[serde(default)]
    pub colors: String,
}

/// A single matrix cell address.
#[derive(Debug, Deserialize)]
pub struct CellForm {
    pub size: String,
    pub color: String,
}

/// A matrix cell stock update.
#[derive(Debug, Deserialize)]
pub struct CellStockForm {
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub stock: String,
}

/// A matrix cell SKU update.
#[derive(Debug, Deserialize)]
pub struct CellSkuForm {
    pub size: String,
    pub color: String,
    #[serde(default)]
    pub sku: String,
}

/// The full product form, submitted on save.
#[derive(Debug, Deserialize)]
pub struct SaveForm {
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
    #[serde(default)]
    pub original_price: String,
    pub category: Category,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: String,
    #[serde(default)]
    pub badge: String,
    pub featured: Option<String>,
    pub on_sale: Option<String>,
    pub active: Option<String>,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub materials: String,
    #[serde(default)]
    pub care: String,
    #[serde(default)]
    pub features: String,
    #[serde(default)]
    pub fit: String,
}

fn parse_price(raw: &str, field: &str) -> Result<Price> {
    let amount = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::BadRequest(format!("{field} must be a whole amount")))?;
    if amount < 0 {
        return Err(AppError::BadRequest(format!("{field} cannot be negative")));
    }
    Ok(Price::new(amount))
}

fn parse_badge(raw: &str) -> Result<Option<Badge>> {
    match raw {
        "" => Ok(None),
        "new" => Ok(Some(Badge::New)),
        "sale" => Ok(Some(Badge::Sale)),
        "exclusive" => Ok(Some(Badge::Exclusive)),
        "best-seller" => Ok(Some(Badge::BestSeller)),
        other => Err(AppError::BadRequest(format!("unknown badge: {other}"))),
    }
}

/// Split a textarea into trimmed, non-empty lines.
fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Assemble the product to persist from the submitted form and the
/// session-held draft. Review data comes from the draft, never the form.
fn build_product(form: &SaveForm, draft: &ProductDraft) -> Result<Product> {
    let name = form.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    let price = parse_price(&form.price, "price")?;
    let original_price = match form.original_price.trim() {
        "" => None,
        raw => Some(parse_price(raw, "original price")?),
    };
    let stock = form.stock.trim().parse::<u32>().unwrap_or(0);

    // Orphans cannot survive a save
    let mut matrix = draft.matrix.clone();
    matrix.prune_orphans();
    let (sizes, colors, variants) = matrix.into_parts();

    let details = amaranta_core::ProductDetails {
        materials: form.materials.trim().to_string(),
        care: form.care.trim().to_string(),
        features: parse_lines(&form.features),
        fit: form.fit.trim().to_string(),
    };

    Ok(Product {
        // The API assigns the id on create; an empty one is ignored there
        id: draft.id.clone().unwrap_or_else(|| ProductId::new("")),
        name,
        sku: Some(form.sku.trim().to_string()).filter(|s| !s.is_empty()),
        description: form.description.trim().to_string(),
        price,
        original_price,
        category: form.category,
        image: form.image.trim().to_string(),
        images: parse_lines(&form.images),
        badge: parse_badge(form.badge.trim())?,
        featured: form.featured.is_some(),
        on_sale: form.on_sale.is_some(),
        active: form.active.is_some(),
        rating: draft.rating,
        reviews_count: draft.reviews_count,
        stock,
        sizes,
        colors,
        variants,
        details: Some(details).filter(|d| !d.is_empty()),
    })
}

// =============================================================================
// Templates
// =============================================================================

/// Admin product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products_index.html")]
pub struct AdminProductsTemplate {
    pub shell: Shell,
    pub products: Vec<AdminProductView>,
    pub status: String,
    /// Raw category filter value; empty means all.
    pub category: String,
    pub categories: [Category; 3],
    pub query: String,
    pub sort: String,
}

/// Product editor template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/product_form.html")]
pub struct ProductFormTemplate {
    pub shell: Shell,
    pub editing_id: Option<String>,
    pub form: ProductFormView,
    pub categories: [Category; 3],
    pub matrix: MatrixView,
}

/// Variant matrix grid fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/variant_matrix.html")]
pub struct VariantMatrixTemplate {
    pub matrix: MatrixView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the admin product list with filters.
#[instrument(skip(state, session_handle, authed))]
pub async fn index(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Query(query): Query<AdminListQuery>,
) -> Result<impl IntoResponse> {
    let mut products = state.api().products_admin(&authed.token).await?;

    let status = query.status.unwrap_or_default();
    match status.as_str() {
        "active" => products.retain(|p| p.active),
        "inactive" => products.retain(|p| !p.active),
        _ => {}
    }
    let category = query.category.unwrap_or_default();
    if let Ok(wanted) = Category::from_str(&category) {
        products.retain(|p| p.category == wanted);
    }
    let q = query.q.unwrap_or_default();
    let needle = q.trim().to_lowercase();
    if !needle.is_empty() {
        products.retain(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.sku
                    .as_deref()
                    .is_some_and(|sku| sku.to_lowercase().contains(&needle))
        });
    }
    let sort = query.sort.unwrap_or_default();
    match sort.as_str() {
        "price-asc" => products.sort_by_key(|p| p.price),
        "price-desc" => {
            products.sort_by_key(|p| p.price);
            products.reverse();
        }
        _ => products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
    }

    let views = products.iter().map(AdminProductView::from).collect();
    Ok(AdminProductsTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        products: views,
        status,
        category,
        categories: Category::ALL,
        query: q,
        sort,
    })
}

/// Open a blank product editor.
#[instrument(skip(session_handle, authed))]
pub async fn new(
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
) -> Result<impl IntoResponse> {
    let draft = ProductDraft {
        id: None,
        matrix: VariantMatrix::default(),
        rating: 0.0,
        reviews_count: 0,
    };
    save_draft(&session_handle, &draft).await?;

    Ok(ProductFormTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        editing_id: None,
        form: ProductFormView::blank(),
        categories: Category::ALL,
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Open the editor for an existing product.
#[instrument(skip(state, session_handle, authed))]
pub async fn edit(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.api().product(&id).await?;

    let draft = ProductDraft {
        id: Some(product.id.clone()),
        matrix: VariantMatrix::new(
            product.sizes.clone(),
            product.colors.clone(),
            product.variants.clone(),
        ),
        rating: product.rating,
        reviews_count: product.reviews_count,
    };
    save_draft(&session_handle, &draft).await?;

    Ok(ProductFormTemplate {
        shell: Shell::load(&session_handle, Some(&authed)).await,
        editing_id: Some(product.id.to_string()),
        form: ProductFormView::from(product.as_ref()),
        categories: Category::ALL,
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Replace the draft's size/color option sets (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_options(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
    Form(form): Form<OptionsForm>,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.set_sizes(&form.sizes);
    draft.matrix.set_colors(&form.colors);
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Toggle a matrix cell (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_toggle(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
    Form(form): Form<CellForm>,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.toggle_cell(&form.size, &form.color);
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Update a cell's stock (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_stock(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
    Form(form): Form<CellStockForm>,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.set_stock(&form.size, &form.color, &form.stock);
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Update a cell's SKU (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_sku(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
    Form(form): Form<CellSkuForm>,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.set_sku(&form.size, &form.color, &form.sku);
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Fill every empty cell with a zero-stock variant (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_generate(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.generate_all();
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Remove every variant from the draft (HTMX fragment).
#[instrument(skip(session_handle, _authed))]
pub async fn draft_clear(
    session_handle: Session,
    RequireAdmin(_authed): RequireAdmin,
) -> Result<impl IntoResponse> {
    let mut draft = load_draft(&session_handle).await?;
    draft.matrix.clear();
    save_draft(&session_handle, &draft).await?;
    Ok(VariantMatrixTemplate {
        matrix: MatrixView::from(&draft.matrix),
    })
}

/// Persist the edited product.
#[instrument(skip(state, session_handle, authed, form), fields(name = %form.name))]
pub async fn save(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Form(form): Form<SaveForm>,
) -> Result<Response> {
    let draft = load_draft(&session_handle).await?;
    let product = build_product(&form, &draft)?;

    let result = match &draft.id {
        Some(id) => state.api().update_product(&authed.token, id, &product).await,
        None => state.api().create_product(&authed.token, &product).await,
    };

    match result {
        Ok(saved) => {
            session_handle.remove::<ProductDraft>(DRAFT_KEY).await?;
            session::set_flash(
                &session_handle,
                session::Flash::success(format!("Saved \"{}\".", saved.name)),
            )
            .await?;
            Ok(Redirect::to("/admin/products").into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Product save failed");
            session::set_flash(
                &session_handle,
                session::Flash::error("Could not save the product. Please try again."),
            )
            .await?;
            let back = draft.id.as_ref().map_or_else(
                || "/admin/products/new".to_string(),
                |id| format!("/admin/products/{id}/edit"),
            );
            Ok(Redirect::to(&back).into_response())
        }
    }
}

/// Delete a product.
#[instrument(skip(state, session_handle, authed))]
pub async fn delete(
    State(state): State<AppState>,
    session_handle: Session,
    RequireAdmin(authed): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Response> {
    let flash = match state.api().delete_product(&authed.token, &id).await {
        Ok(()) => session::Flash::success("Product deleted."),
        Err(e) => {
            tracing::error!(product_id = %id, error = %e, "Product delete failed");
            session::Flash::error("Could not delete the product.")
        }
    };
    session::set_flash(&session_handle, flash).await?;
    Ok(Redirect::to("/admin/products").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SaveForm {
        SaveForm {
            name: "Vestido Flor".to_string(),
            sku: String::new(),
            description: String::new(),
            price: "125000".to_string(),
            original_price: String::new(),
            category: Category::Women,
            image: String::new(),
            images: String::new(),
            badge: String::new(),
            featured: None,
            on_sale: None,
            active: Some("on".to_string()),
            stock: "0".to_string(),
            materials: String::new(),
            care: String::new(),
            features: String::new(),
            fit: String::new(),
        }
    }

    #[test]
    fn test_build_product_echoes_draft_review_data_on_update() {
        let draft = ProductDraft {
            id: Some(ProductId::new("p-1")),
            matrix: VariantMatrix::default(),
            rating: 4.5,
            reviews_count: 12,
        };
        let product = build_product(&form(), &draft).unwrap();
        assert_eq!(product.id.as_str(), "p-1");
        assert_eq!(product.rating, 4.5);
        assert_eq!(product.reviews_count, 12);
    }

    #[test]
    fn test_build_product_starts_new_products_unreviewed() {
        let draft = ProductDraft {
            id: None,
            matrix: VariantMatrix::default(),
            rating: 0.0,
            reviews_count: 0,
        };
        let product = build_product(&form(), &draft).unwrap();
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.reviews_count, 0);
    }

    #[test]
    fn test_build_product_carries_draft_variants() {
        let mut matrix = VariantMatrix::default();
        matrix.set_sizes("S,M");
        matrix.set_colors("Negro");
        matrix.generate_all();
        matrix.set_sizes("S");
        let draft = ProductDraft {
            id: None,
            matrix,
            rating: 0.0,
            reviews_count: 0,
        };
        let product = build_product(&form(), &draft).unwrap();
        assert_eq!(product.sizes, ["S"]);
        assert_eq!(product.colors, ["Negro"]);
        assert_eq!(product.variants.len(), 1);
        assert_eq!(product.variants[0].size, "S");
    }

    #[test]
    fn test_build_product_requires_name() {
        let mut blank = form();
        blank.name = "  ".to_string();
        let draft = ProductDraft {
            id: None,
            matrix: VariantMatrix::default(),
            rating: 0.0,
            reviews_count: 0,
        };
        assert!(build_product(&blank, &draft).is_err());
    }
}
