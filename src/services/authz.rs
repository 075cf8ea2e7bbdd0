//! 授权决策引擎
//! 角色 -> 资源 -> 权限 的评估，区分"全部行"与"仅本人行"两种作用域。
//! 核心判定是规则集上的纯函数，不依赖存储，便于用手工构造的规则做单元测试。

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::access::{AccessRule, Resource},
};

/// 管理员角色名（种子数据创建，管理接口以此判定放行）
pub const ADMIN_ROLE: &str = "admin";

/// 受支持的操作；任何无法解析的操作在边界处直接拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

/// 对规则集求值：整个引擎的决策核心
///
/// - create：任一规则带 create 即放行（create 无作用域之分）
/// - read：任一 read_all 即放行；否则 owner_id 缺失（列表查询）时看 read_own，
///   此时调用方必须把结果过滤到本人行；owner_id 给定时要求恰好等于本人
/// - update / delete：与 read 对称，但列表式调用（owner_id 缺失）一律拒绝
///
/// "all" 为真时所有权无关紧要；"own" 只在 "all" 为假时参与判定。
/// 多角色的有效权限是所有可达规则上相应标志的逻辑或。
pub fn evaluate(
    rules: &[AccessRule],
    action: Action,
    user_id: i64,
    owner_id: Option<i64>,
) -> bool {
    match action {
        Action::Create => rules.iter().any(|r| r.create),
        Action::Read => {
            if rules.iter().any(|r| r.read_all) {
                return true;
            }
            match owner_id {
                None => rules.iter().any(|r| r.read_own),
                Some(owner) => owner == user_id && rules.iter().any(|r| r.read_own),
            }
        }
        Action::Update => {
            if rules.iter().any(|r| r.update_all) {
                return true;
            }
            owner_id == Some(user_id) && rules.iter().any(|r| r.update_own)
        }
        Action::Delete => {
            if rules.iter().any(|r| r.delete_all) {
                return true;
            }
            owner_id == Some(user_id) && rules.iter().any(|r| r.delete_own)
        }
    }
}

/// 权限数据的只读视图
/// 引擎只依赖这个接口，不关心存储细节；测试用内存实现即可
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// 用户持有的全部角色 id
    async fn roles_of(&self, user_id: i64) -> Result<Vec<i64>, AppError>;

    /// (角色集合, 资源) 上的全部访问规则
    async fn rules_for(
        &self,
        role_ids: &[i64],
        resource_id: i64,
    ) -> Result<Vec<AccessRule>, AppError>;

    /// 按 code 解析资源
    async fn find_resource(&self, code: &str) -> Result<Option<Resource>, AppError>;

    /// 用户是否持有指定名称的角色
    async fn has_role(&self, user_id: i64, role_name: &str) -> Result<bool, AppError>;
}

/// 授权服务：存储查找 + 纯函数判定
pub struct AccessControlService<S> {
    store: S,
}

impl<S: PermissionStore> AccessControlService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 判定 (用户, 资源, 操作, 目标归属) 是否放行
    ///
    /// owner_id 为 None 表示集合级请求（list/create）；
    /// 未知资源、无角色、无规则都直接拒绝。只读，无副作用。
    pub async fn can(
        &self,
        user_id: i64,
        resource_code: &str,
        action: Action,
        owner_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let Some(resource) = self.store.find_resource(resource_code).await? else {
            return Ok(false);
        };

        let role_ids = self.store.roles_of(user_id).await?;
        if role_ids.is_empty() {
            return Ok(false);
        }

        let rules = self.store.rules_for(&role_ids, resource.id).await?;
        if rules.is_empty() {
            return Ok(false);
        }

        Ok(evaluate(&rules, action, user_id, owner_id))
    }

    /// 检查权限，拒绝则返回 Forbidden
    pub async fn require(
        &self,
        user_id: i64,
        resource_code: &str,
        action: Action,
        owner_id: Option<i64>,
    ) -> Result<(), AppError> {
        if !self.can(user_id, resource_code, action, owner_id).await? {
            tracing::warn!(
                user_id = user_id,
                resource = %resource_code,
                action = %action.as_str(),
                "Permission denied"
            );
            return Err(AppError::Forbidden);
        }

        Ok(())
    }

    /// 用户对该资源的操作是否拿到了 "all" 级授权
    /// 列表接口据此决定返回全部行还是过滤到本人行
    pub async fn grants_all(
        &self,
        user_id: i64,
        resource_code: &str,
        action: Action,
    ) -> Result<bool, AppError> {
        let Some(resource) = self.store.find_resource(resource_code).await? else {
            return Ok(false);
        };

        let role_ids = self.store.roles_of(user_id).await?;
        if role_ids.is_empty() {
            return Ok(false);
        }

        let rules = self.store.rules_for(&role_ids, resource.id).await?;

        Ok(rules.iter().any(|r| match action {
            Action::Create => r.create,
            Action::Read => r.read_all,
            Action::Update => r.update_all,
            Action::Delete => r.delete_all,
        }))
    }

    /// 检查用户是否是管理员
    pub async fn is_admin(&self, user_id: i64) -> Result<bool, AppError> {
        self.store.has_role(user_id, ADMIN_ROLE).await
    }

    /// 管理接口的准入检查
    pub async fn require_admin(&self, user_id: i64) -> Result<(), AppError> {
        if !self.is_admin(user_id).await? {
            tracing::warn!(user_id = user_id, "Admin access denied");
            return Err(AppError::Forbidden);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(flags: [bool; 7]) -> AccessRule {
        AccessRule {
            id: 1,
            role_id: 1,
            resource_id: 1,
            read_own: flags[0],
            read_all: flags[1],
            create: flags[2],
            update_own: flags[3],
            update_all: flags[4],
            delete_own: flags[5],
            delete_all: flags[6],
        }
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("read"), Some(Action::Read));
        assert_eq!(Action::parse("create"), Some(Action::Create));
        assert_eq!(Action::parse("update"), Some(Action::Update));
        assert_eq!(Action::parse("delete"), Some(Action::Delete));
        assert_eq!(Action::parse("execute"), None);
        assert_eq!(Action::parse("READ"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_empty_rule_set_denies_everything() {
        for action in [Action::Create, Action::Read, Action::Update, Action::Delete] {
            assert!(!evaluate(&[], action, 1, None));
            assert!(!evaluate(&[], action, 1, Some(1)));
        }
    }

    #[test]
    fn test_all_flag_ignores_ownership() {
        // read_all 为真：无论 owner 是谁（包括缺失）都放行
        let rules = [rule([false, true, false, false, false, false, false])];

        assert!(evaluate(&rules, Action::Read, 7, None));
        assert!(evaluate(&rules, Action::Read, 7, Some(7)));
        assert!(evaluate(&rules, Action::Read, 7, Some(999)));
    }

    #[test]
    fn test_own_flag_requires_exact_owner_match() {
        // 只有 read_own：本人行放行，他人行拒绝，列表查询放行（调用方过滤）
        let rules = [rule([true, false, false, false, false, false, false])];

        assert!(evaluate(&rules, Action::Read, 7, Some(7)));
        assert!(!evaluate(&rules, Action::Read, 7, Some(9)));
        assert!(evaluate(&rules, Action::Read, 7, None));
    }

    #[test]
    fn test_own_only_update_delete_deny_missing_owner() {
        let rules = [rule([false, false, false, true, false, true, false])];

        // update/delete 必须有具体目标；owner 缺失一律拒绝
        assert!(!evaluate(&rules, Action::Update, 7, None));
        assert!(!evaluate(&rules, Action::Delete, 7, None));

        assert!(evaluate(&rules, Action::Update, 7, Some(7)));
        assert!(evaluate(&rules, Action::Delete, 7, Some(7)));
        assert!(!evaluate(&rules, Action::Update, 7, Some(8)));
        assert!(!evaluate(&rules, Action::Delete, 7, Some(8)));
    }

    #[test]
    fn test_flags_are_independent() {
        // 只有 create：其余操作全部拒绝
        let rules = [rule([false, false, true, false, false, false, false])];

        assert!(evaluate(&rules, Action::Create, 7, None));
        assert!(!evaluate(&rules, Action::Read, 7, Some(7)));
        assert!(!evaluate(&rules, Action::Update, 7, Some(7)));
        assert!(!evaluate(&rules, Action::Delete, 7, Some(7)));
    }

    #[test]
    fn test_permissions_union_across_roles() {
        // 多角色：有效权限是所有规则的并集
        let reader = rule([true, false, false, false, false, false, false]);
        let creator = rule([false, false, true, false, false, false, false]);
        let rules = [reader, creator];

        assert!(evaluate(&rules, Action::Read, 7, Some(7)));
        assert!(evaluate(&rules, Action::Create, 7, None));
        assert!(!evaluate(&rules, Action::Delete, 7, Some(7)));
    }

    #[test]
    fn test_all_supersedes_own() {
        // update_all 与 update_own 同时为真时，归属不再参与判定
        let rules = [rule([false, false, false, true, true, false, false])];

        assert!(evaluate(&rules, Action::Update, 7, Some(999)));
    }

    #[test]
    fn test_viewer_docs_scenario() {
        // viewer 对 docs 只有 read_own：
        // 读本人行放行、读他人行拒绝、列表读放行（调用方过滤）
        let rules = [rule([true, false, false, false, false, false, false])];

        assert!(evaluate(&rules, Action::Read, 7, Some(7)));
        assert!(!evaluate(&rules, Action::Read, 7, Some(9)));
        assert!(evaluate(&rules, Action::Read, 7, None));
    }

    #[test]
    fn test_admin_read_all_scenario() {
        // admin 对 docs 有 read_all：任意 owner（含缺失）都放行
        let rules = [rule([true, true, true, true, true, true, true])];

        for owner in [None, Some(7), Some(9), Some(-1)] {
            assert!(evaluate(&rules, Action::Read, 7, owner));
        }
    }
}
