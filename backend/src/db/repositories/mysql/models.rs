use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::products;
use crate::models::{Product, ProductId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(i64::from(row.id)),
            name: row.name,
            price: row.price,
            stock: row.stock,
        }
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductValues {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
}
