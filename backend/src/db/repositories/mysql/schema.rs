// Column names follow the physical PRODUCTS table so that existing databases
// keep working; the Rust-side names match the API fields.

diesel::table! {
    #[sql_name = "PRODUCTS"]
    products (id) {
        #[sql_name = "PRODUCTID"]
        id -> Integer,
        #[sql_name = "PRODUCTNAME"]
        #[max_length = 100]
        name -> Varchar,
        #[sql_name = "PRICE"]
        price -> Numeric,
        #[sql_name = "STOCK"]
        stock -> Integer,
    }
}
