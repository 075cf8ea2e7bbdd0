//! 种子数据
//! 角色表为空时写入演示用的角色、资源、访问规则和账号

use sqlx::PgPool;

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    models::access::AccessRuleRequest,
    repository::{AccessRepository, UserRepository},
};

/// 角色表非空时视为已完成种子写入，直接返回
pub async fn seed_if_empty(pool: &PgPool) -> Result<(), AppError> {
    let access = AccessRepository::new(pool.clone());

    if !access.list_roles().await?.is_empty() {
        return Ok(());
    }

    tracing::info!("Seeding demo roles, resources, rules and users");

    let admin = access.create_role("admin", "Administrator").await?;
    let manager = access.create_role("manager", "Manager").await?;
    let user = access.create_role("user", "Regular user").await?;

    let products = access.create_resource("products", "Products (mock)").await?;
    let orders = access.create_resource("orders", "Orders (mock)").await?;
    let access_rules = access
        .create_resource("access_rules", "Access rules")
        .await?;

    // admin：全部资源上的全部权限
    for resource in [&products, &orders, &access_rules] {
        access
            .create_rule(&AccessRuleRequest {
                role_id: admin.id,
                resource_id: resource.id,
                read_own: true,
                read_all: true,
                create: true,
                update_own: true,
                update_all: true,
                delete_own: true,
                delete_all: true,
            })
            .await?;
    }

    // manager：read_all + create + update_all，没有 delete
    for resource in [&products, &orders] {
        access
            .create_rule(&AccessRuleRequest {
                role_id: manager.id,
                resource_id: resource.id,
                read_own: true,
                read_all: true,
                create: true,
                update_own: true,
                update_all: true,
                delete_own: false,
                delete_all: false,
            })
            .await?;
    }

    // user：create + 对本人行的 read/update/delete
    for resource in [&products, &orders] {
        access
            .create_rule(&AccessRuleRequest {
                role_id: user.id,
                resource_id: resource.id,
                read_own: true,
                read_all: false,
                create: true,
                update_own: true,
                update_all: false,
                delete_own: true,
                delete_all: false,
            })
            .await?;
    }

    // 演示账号
    let users = UserRepository::new(pool.clone());
    let hasher = PasswordHasher::new();

    let u_admin = users
        .create("Admin", "admin@example.com", &hasher.hash("admin123")?)
        .await?;
    let u_manager = users
        .create("Manager", "manager@example.com", &hasher.hash("manager123")?)
        .await?;
    let u_user = users
        .create("User", "user@example.com", &hasher.hash("user123")?)
        .await?;

    access.assign_role(u_admin.id, admin.id).await?;
    access.assign_role(u_manager.id, manager.id).await?;
    access.assign_role(u_user.id, user.id).await?;

    tracing::info!("Seed data created");

    Ok(())
}
