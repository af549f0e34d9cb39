//! Row mappings for the joined product and movement queries.
//!
//! Every product read goes through [`PRODUCT_SELECT`], so a product is never
//! returned without its category.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use tracing::warn;

use crate::error::{DbError, DbResult};
use stockroom_core::{Category, Money, Movement, MovementKind, Product};

/// `produto ⋈ category`, with every column aliased to a [`ProductRow`] field.
pub(crate) const PRODUCT_SELECT: &str = r#"
    SELECT
        p.id                 AS produto_id,
        p.nome               AS produto_nome,
        p.preco_unitario     AS preco_unitario,
        p.unidade            AS unidade,
        p.quantidade_estoque AS quantidade_estoque,
        p.quantidade_minima  AS quantidade_minima,
        p.quantidade_maxima  AS quantidade_maxima,
        c.id                 AS categoria_id,
        c.nome               AS categoria_nome,
        c.tamanho            AS tamanho,
        c.embalagem          AS embalagem
    FROM produto p
    INNER JOIN category c ON c.id = p.categoria_id
"#;

/// `movimentacao ⋈ produto ⋈ category`, mapped by [`MovementRow`].
pub(crate) const MOVEMENT_SELECT: &str = r#"
    SELECT
        m.id                 AS movimentacao_id,
        m.tipo               AS tipo,
        m.quantidade         AS quantidade,
        m.data_hora          AS data_hora,
        m.observacao         AS observacao,
        p.id                 AS produto_id,
        p.nome               AS produto_nome,
        p.preco_unitario     AS preco_unitario,
        p.unidade            AS unidade,
        p.quantidade_estoque AS quantidade_estoque,
        p.quantidade_minima  AS quantidade_minima,
        p.quantidade_maxima  AS quantidade_maxima,
        c.id                 AS categoria_id,
        c.nome               AS categoria_nome,
        c.tamanho            AS tamanho,
        c.embalagem          AS embalagem
    FROM movimentacao m
    INNER JOIN produto p ON p.id = m.produto_id
    INNER JOIN category c ON c.id = p.categoria_id
"#;

/// Newest first; the id breaks ties between movements stamped alike.
pub(crate) const MOVEMENT_ORDER: &str = "ORDER BY m.data_hora DESC, m.id DESC";

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    pub id: i64,
    pub nome: String,
    pub tamanho: String,
    pub embalagem: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.nome,
            size: row.tamanho,
            packaging: row.embalagem,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub produto_id: i64,
    pub produto_nome: String,
    pub preco_unitario: i64,
    pub unidade: String,
    pub quantidade_estoque: i64,
    pub quantidade_minima: i64,
    pub quantidade_maxima: i64,
    pub categoria_id: i64,
    pub categoria_nome: String,
    pub tamanho: String,
    pub embalagem: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.produto_id,
            name: row.produto_nome,
            unit_price: Money::from_cents(row.preco_unitario),
            unit: row.unidade,
            stock_quantity: row.quantidade_estoque,
            min_quantity: row.quantidade_minima,
            max_quantity: row.quantidade_maxima,
            category: Category {
                id: row.categoria_id,
                name: row.categoria_nome,
                size: row.tamanho,
                packaging: row.embalagem,
            },
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct MovementRow {
    pub movimentacao_id: i64,
    pub tipo: String,
    pub quantidade: i64,
    pub data_hora: DateTime<Utc>,
    pub observacao: Option<String>,
    #[sqlx(flatten)]
    pub product: ProductRow,
}

impl TryFrom<MovementRow> for Movement {
    type Error = DbError;

    /// Fails only when `tipo` holds something other than Entrada/Saída.
    fn try_from(row: MovementRow) -> DbResult<Self> {
        let kind: MovementKind = row.tipo.parse().map_err(|e| {
            DbError::Internal(format!("movement {}: {}", row.movimentacao_id, e))
        })?;

        Ok(Movement {
            id: row.movimentacao_id,
            product: row.product.into(),
            kind,
            quantity: row.quantidade,
            timestamp: row.data_hora,
            note: row.observacao,
        })
    }
}

/// Rows whose `tipo` does not parse are left out of the listing with a
/// warning; one bad row must not hide the rest of the history.
pub(crate) fn into_movements(rows: Vec<MovementRow>) -> DbResult<Vec<Movement>> {
    let movements = rows
        .into_iter()
        .filter_map(|row| match Movement::try_from(row) {
            Ok(movement) => Some(movement),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable movement row");
                None
            }
        })
        .collect();
    Ok(movements)
}
