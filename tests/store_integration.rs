//! Store lifecycle integration tests
//!
//! End-to-end checks of the cart/favorites/theme lifecycle across process
//! restarts, driving the stack only through its public interface.

use anyhow::Result;
use app_state::{BadgeDisplay, Category, Product, Theme};
use ember_market::{bootstrap, BootstrapConfig};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn product(id: &str, name: &str, price: f64, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        image: format!("https://example.com/{}.jpg", id),
        description: format!("{} for integration testing", name),
        category: category.to_string(),
        rating: 4.2,
        reviews: 120,
        original_price: None,
        discount: None,
    }
}

fn categories() -> Vec<Category> {
    vec![
        Category {
            id: "electronics".to_string(),
            name: "Electronics".to_string(),
            image: "https://example.com/electronics.jpg".to_string(),
            product_count: 2,
        },
        Category {
            id: "home".to_string(),
            name: "Home".to_string(),
            image: "https://example.com/home.jpg".to_string(),
            product_count: 1,
        },
    ]
}

/// Test the full shopping session lifecycle with a restart in the middle
#[tokio::test]
async fn test_session_lifecycle_with_persistence() -> Result<()> {
    init_tracing();

    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("shop.db");
    let db_path = db_path.to_string_lossy().to_string();

    // Phase 1: fresh start, shop a little, shut down cleanly
    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;

        // The data loader supplies the catalog on every start
        app.store.set_products(vec![
            product("p1", "Wireless Headphones", 99.99, "electronics"),
            product("p2", "Desk Lamp", 24.0, "home"),
            product("p3", "Phone Stand", 12.5, "electronics"),
        ]);
        app.store.set_categories(categories());

        app.store.add_to_cart(product("p1", "Wireless Headphones", 99.99, "electronics"));
        app.store.add_to_cart(product("p1", "Wireless Headphones", 99.99, "electronics"));
        app.store.add_to_cart(product("p2", "Desk Lamp", 24.0, "home"));
        app.store.add_to_favorites(product("p3", "Phone Stand", 12.5, "electronics"));
        app.store.toggle_theme();

        assert_eq!(app.store.cart_item_count(), 3);
        assert!((app.store.cart_total() - 223.98).abs() < 1e-9);

        app.persistence.shutdown().await;
        app.kv.flush()?;
    }

    // Phase 2: restart and verify the persisted subset came back
    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;

        assert_eq!(app.store.cart_item_count(), 3);
        assert!((app.store.cart_total() - 223.98).abs() < 1e-9);
        assert!(app.store.is_favorite("p3"));
        assert_eq!(app.store.theme(), Theme::Dark);
        assert_eq!(app.store.cart_badge(), BadgeDisplay::Count(3));

        // Products and categories are deliberately not persisted
        assert!(app.store.state().products.is_empty());
        assert!(app.store.state().categories.is_empty());
        assert!(app.store.products_by_category("electronics").is_empty());

        // Until the data loader runs again
        app.store.set_products(vec![
            product("p1", "Wireless Headphones", 99.99, "electronics"),
            product("p3", "Phone Stand", 12.5, "electronics"),
        ]);
        assert_eq!(app.store.products_by_category("electronics").len(), 2);

        app.persistence.shutdown().await;
    }

    Ok(())
}

/// Test that clearing the cart persists across a restart
#[tokio::test]
async fn test_clear_cart_survives_restart() -> Result<()> {
    init_tracing();

    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("shop.db").to_string_lossy().to_string();

    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
        app.store.add_to_cart(product("p1", "Desk Lamp", 24.0, "home"));
        app.store.update_quantity("p1", 5);
        app.store.clear_cart();
        app.persistence.shutdown().await;
        app.kv.flush()?;
    }

    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
        assert_eq!(app.store.cart_item_count(), 0);
        assert_eq!(app.store.cart_total(), 0.0);
        app.persistence.shutdown().await;
    }

    Ok(())
}

/// Test that later sessions keep superseding earlier snapshots
#[tokio::test]
async fn test_revisions_resume_across_restarts() -> Result<()> {
    init_tracing();

    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("shop.db").to_string_lossy().to_string();

    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
        app.store.set_theme(Theme::Dark);
        app.persistence.shutdown().await;
        app.kv.flush()?;
    }

    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
        // The restored revision seeds the counter, so this session's writes
        // are newer than the stored snapshot
        app.store.set_theme(Theme::Light);
        app.persistence.shutdown().await;
        app.kv.flush()?;
    }

    {
        let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
        assert_eq!(app.store.theme(), Theme::Light);
        app.persistence.shutdown().await;
    }

    Ok(())
}

/// Test change detection by snapshot identity across the public interface
#[tokio::test]
async fn test_views_observe_mutations() -> Result<()> {
    init_tracing();

    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("shop.db").to_string_lossy().to_string();

    let app = bootstrap(BootstrapConfig::at(&db_path)).await?;
    let mut rx = app.store.subscribe();

    let before = app.store.state();
    app.store.add_to_cart(product("p1", "Phone Stand", 12.5, "electronics"));

    rx.changed().await?;
    let after = rx.borrow().clone();

    assert!(!std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(after.cart_item_count(), 1);

    app.persistence.shutdown().await;
    Ok(())
}
