use anyhow::Result;
use chrono::{Duration, Utc};
use contracts::domain::a001_category::aggregate::Category;
use contracts::domain::a002_event::aggregate::Event;
use contracts::system::auth::Role;

use crate::domain::a001_category::repository as category_repository;
use crate::domain::a002_event::repository as event_repository;

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists() -> Result<()> {
    use crate::system::users::{repository, service};
    use contracts::system::users::CreateUserDto;

    let count = repository::count_users().await?;

    if count == 0 {
        tracing::info!("No users found. Creating default admin user...");

        let admin_dto = CreateUserDto {
            username: "admin".to_string(),
            password: "admin".to_string(),
            email: None,
            full_name: Some("Administrator".to_string()),
            role: Role::Admin,
        };

        let admin_id = service::create(admin_dto, None).await?;

        tracing::warn!("═══════════════════════════════════════════════");
        tracing::warn!("  Default admin user created!");
        tracing::warn!("  Username: admin");
        tracing::warn!("  Password: admin");
        tracing::warn!("  User ID: {}", admin_id);
        tracing::warn!("  PLEASE CHANGE THE PASSWORD IMMEDIATELY!");
        tracing::warn!("═══════════════════════════════════════════════");
    }

    Ok(())
}

/// Seed the catalog with starter categories and events when empty
pub async fn ensure_seed_catalog() -> Result<()> {
    if category_repository::count_active().await? > 0 || event_repository::count_active().await? > 0
    {
        return Ok(());
    }

    tracing::info!("Empty catalog detected, seeding starter data...");

    let seeds = [
        ("Music", "Jazz Night", 25.00, 100, 30),
        ("Tech", "AI Expo", 50.00, 200, 45),
        ("Art", "Gallery Showcase", 15.00, 80, 60),
    ];

    for (category_name, event_title, price, tickets, days_ahead) in seeds {
        let mut category = Category::new_for_insert(
            format!("CAT-{}", category_name.to_uppercase()),
            category_name.to_string(),
            None,
        );
        category.before_write();
        let category_id = category_repository::insert(&category).await?;

        let mut event = Event::new_for_insert(
            format!("EVT-{}", event_title.to_uppercase().replace(' ', "-")),
            event_title.to_string(),
            Utc::now() + Duration::days(days_ahead),
            price,
            tickets,
            Some(contracts::domain::a001_category::aggregate::CategoryId::new(category_id)),
            None,
            None,
        );
        event.before_write();
        event_repository::insert(&event).await?;
    }

    tracing::info!("Seed catalog ready: {} events", seeds.len());

    Ok(())
}
