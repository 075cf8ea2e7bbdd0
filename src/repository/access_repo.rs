//! Access-control repository (角色、资源、访问规则的数据访问)

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::access::{AccessRule, AccessRuleRequest, Resource, Role},
    services::authz::PermissionStore,
};

pub struct AccessRepository {
    db: PgPool,
}

impl AccessRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ==================== Roles ====================

    /// 列出所有角色
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(roles)
    }

    /// 根据名称查找角色
    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// 根据 ID 查找角色
    pub async fn find_role_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(role)
    }

    /// 创建角色
    pub async fn create_role(&self, name: &str, description: &str) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.db)
        .await?;

        Ok(role)
    }

    /// 更新角色
    pub async fn update_role(
        &self,
        id: i64,
        name: &str,
        description: &str,
    ) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .fetch_optional(&self.db)
        .await?;

        Ok(role)
    }

    /// 删除角色
    pub async fn delete_role(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Resources ====================

    /// 列出所有资源
    pub async fn list_resources(&self) -> Result<Vec<Resource>, AppError> {
        let resources = sqlx::query_as::<_, Resource>("SELECT * FROM resources ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(resources)
    }

    /// 根据 code 查找资源
    pub async fn find_resource_by_code(&self, code: &str) -> Result<Option<Resource>, AppError> {
        let resource = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.db)
            .await?;

        Ok(resource)
    }

    /// 根据 ID 查找资源
    pub async fn find_resource_by_id(&self, id: i64) -> Result<Option<Resource>, AppError> {
        let resource = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(resource)
    }

    /// 创建资源
    pub async fn create_resource(
        &self,
        code: &str,
        description: &str,
    ) -> Result<Resource, AppError> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (code, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(description)
        .fetch_one(&self.db)
        .await?;

        Ok(resource)
    }

    /// 更新资源
    pub async fn update_resource(
        &self,
        id: i64,
        code: &str,
        description: &str,
    ) -> Result<Option<Resource>, AppError> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET code = $2, description = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(code)
        .bind(description)
        .fetch_optional(&self.db)
        .await?;

        Ok(resource)
    }

    /// 删除资源
    pub async fn delete_resource(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Access rules ====================

    /// 列出所有访问规则
    pub async fn list_rules(&self) -> Result<Vec<AccessRule>, AppError> {
        let rules = sqlx::query_as::<_, AccessRule>("SELECT * FROM access_rules ORDER BY id")
            .fetch_all(&self.db)
            .await?;

        Ok(rules)
    }

    /// 根据 ID 查找规则
    pub async fn find_rule_by_id(&self, id: i64) -> Result<Option<AccessRule>, AppError> {
        let rule = sqlx::query_as::<_, AccessRule>("SELECT * FROM access_rules WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(rule)
    }

    /// 查找 (角色, 资源) 对上的规则（每对至多一条）
    pub async fn find_rule_by_pair(
        &self,
        role_id: i64,
        resource_id: i64,
    ) -> Result<Option<AccessRule>, AppError> {
        let rule = sqlx::query_as::<_, AccessRule>(
            "SELECT * FROM access_rules WHERE role_id = $1 AND resource_id = $2",
        )
        .bind(role_id)
        .bind(resource_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(rule)
    }

    /// 创建访问规则
    pub async fn create_rule(&self, req: &AccessRuleRequest) -> Result<AccessRule, AppError> {
        let rule = sqlx::query_as::<_, AccessRule>(
            r#"
            INSERT INTO access_rules
                (role_id, resource_id, read_own, read_all, can_create,
                 update_own, update_all, delete_own, delete_all)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(req.role_id)
        .bind(req.resource_id)
        .bind(req.read_own)
        .bind(req.read_all)
        .bind(req.create)
        .bind(req.update_own)
        .bind(req.update_all)
        .bind(req.delete_own)
        .bind(req.delete_all)
        .fetch_one(&self.db)
        .await?;

        Ok(rule)
    }

    /// 更新访问规则（七个标志整体替换）
    pub async fn update_rule(
        &self,
        id: i64,
        req: &AccessRuleRequest,
    ) -> Result<Option<AccessRule>, AppError> {
        let rule = sqlx::query_as::<_, AccessRule>(
            r#"
            UPDATE access_rules
            SET role_id = $2, resource_id = $3,
                read_own = $4, read_all = $5, can_create = $6,
                update_own = $7, update_all = $8, delete_own = $9, delete_all = $10
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.role_id)
        .bind(req.resource_id)
        .bind(req.read_own)
        .bind(req.read_all)
        .bind(req.create)
        .bind(req.update_own)
        .bind(req.update_all)
        .bind(req.delete_own)
        .bind(req.delete_all)
        .fetch_optional(&self.db)
        .await?;

        Ok(rule)
    }

    /// 删除访问规则
    pub async fn delete_rule(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM access_rules WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== Role assignments ====================

    /// 为用户分配角色（重复分配直接忽略）
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PermissionStore for AccessRepository {
    async fn roles_of(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT role_id FROM user_roles WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.db)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn rules_for(
        &self,
        role_ids: &[i64],
        resource_id: i64,
    ) -> Result<Vec<AccessRule>, AppError> {
        let rules = sqlx::query_as::<_, AccessRule>(
            "SELECT * FROM access_rules WHERE role_id = ANY($1) AND resource_id = $2",
        )
        .bind(role_ids)
        .bind(resource_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rules)
    }

    async fn find_resource(&self, code: &str) -> Result<Option<Resource>, AppError> {
        self.find_resource_by_code(code).await
    }

    async fn has_role(&self, user_id: i64, role_name: &str) -> Result<bool, AppError> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT ur.id
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1 AND r.name = $2
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(role_name)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.is_some())
    }
}
