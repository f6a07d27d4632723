use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tempfile::TempDir;

use super::*;
use crate::auth::CurrentUser;
use crate::db::DbService;
use crate::db::models::{
    CartLine, CategoryCreate, DiningTable, DiningTableCreate, GeneralSettings, PaymentMethod,
    Product, ProductCreate, Role, SettingsUpdate, TableStatus, User,
};
use crate::db::repository::{
    CategoryRepository, DiningTableRepository, ProductRepository, SettingRepository,
    UserRepository,
};

mod test_boundary;
mod test_flows;

/// Fresh embedded database in a throwaway directory.
/// The TempDir must stay alive for the duration of the test.
async fn test_db() -> (TempDir, Surreal<Db>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("test.db");
    let service = DbService::new(&path.to_string_lossy())
        .await
        .expect("Failed to open test database");
    (dir, service.db)
}

fn actor_for(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
        email: user.email.clone(),
        name: format!("{} {}", user.first_name, user.last_name),
        role: user.role,
    }
}

async fn seed_customer(db: &Surreal<Db>, email: &str) -> CurrentUser {
    let repo = UserRepository::new(db.clone());
    let user = repo
        .create(email, "password123", "Test", "Customer", None, Role::Customer)
        .await
        .expect("Failed to seed customer");
    actor_for(&user)
}

async fn seed_admin(db: &Surreal<Db>) -> CurrentUser {
    let repo = UserRepository::new(db.clone());
    let user = repo
        .create(
            "ops@savora.test",
            "password123",
            "Ops",
            "Admin",
            None,
            Role::Admin,
        )
        .await
        .expect("Failed to seed admin");
    actor_for(&user)
}

async fn seed_product(
    db: &Surreal<Db>,
    title: &str,
    price: &str,
    discounted: Option<&str>,
) -> Product {
    let categories = CategoryRepository::new(db.clone());
    let category = match categories
        .find_by_name("Mains")
        .await
        .expect("category lookup")
    {
        Some(existing) => existing,
        None => categories
            .create(CategoryCreate {
                name: "Mains".to_string(),
                description: None,
            })
            .await
            .expect("Failed to seed category"),
    };

    let products = ProductRepository::new(db.clone());
    products
        .create(ProductCreate {
            title: title.to_string(),
            price: price.parse().expect("price"),
            discounted_price: discounted.map(|d| d.parse().expect("discounted price")),
            description: None,
            is_featured: false,
            category: category.id.expect("category id"),
        })
        .await
        .expect("Failed to seed product")
}

async fn seed_table(db: &Surreal<Db>, name: &str) -> DiningTable {
    let repo = DiningTableRepository::new(db.clone());
    repo.create(DiningTableCreate {
        name: name.to_string(),
        description: None,
        capacity: Some(4),
        location: None,
    })
    .await
    .expect("Failed to seed table")
}

async fn set_delivery_fee(db: &Surreal<Db>, fee: &str) {
    let repo = SettingRepository::new(db.clone());
    repo.update(SettingsUpdate {
        payment_gateways: None,
        transaction_mode: None,
        general: Some(GeneralSettings {
            currency: "NGN".to_string(),
            tax_rate: Decimal::ZERO,
            delivery_fee: fee.parse().expect("fee"),
            minimum_order_amount: Decimal::ZERO,
        }),
        company_info: None,
    })
    .await
    .expect("Failed to set delivery fee");
}

async fn seed_address(db: &Surreal<Db>, actor: &CurrentUser) -> String {
    use crate::db::models::AddressCreate;
    use crate::db::repository::AddressRepository;

    let repo = AddressRepository::new(db.clone());
    let address = repo
        .create(
            &actor.record_id().expect("actor id"),
            AddressCreate {
                name: "Home".to_string(),
                phone: "08012345678".to_string(),
                street: "1 Test Street".to_string(),
                city: "Lagos".to_string(),
                state: "Lagos".to_string(),
                is_default: true,
            },
        )
        .await
        .expect("Failed to seed address");
    address.id.expect("address id").to_string()
}

fn cart_line(product: &Product, quantity: i64) -> CartLine {
    CartLine {
        id: product.id.as_ref().expect("product id").to_string(),
        quantity,
    }
}

async fn table_status(db: &Surreal<Db>, id: &str) -> TableStatus {
    DiningTableRepository::new(db.clone())
        .find_by_id(id)
        .await
        .expect("table lookup")
        .expect("table exists")
        .status
}

fn money(value: &str) -> Decimal {
    value.parse().expect("money literal")
}
