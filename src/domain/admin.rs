use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The principal admin account. Seeded at first start and never deletable.
pub const PRINCIPAL_ADMIN: &str = "sara";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Gerente,
    Funcionario,
}

impl AdminRole {
    pub fn label(&self) -> &'static str {
        match self {
            AdminRole::Gerente => "Gerente",
            AdminRole::Funcionario => "Funcionário",
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AdminRole::Gerente => "gerente",
            AdminRole::Funcionario => "funcionario",
        };
        write!(f, "{name}")
    }
}

/// Admin panel sections, each guarded by [`AdminUser::has_permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Pedidos,
    Produtos,
    Administradores,
    Configuracoes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: AdminRole,
}

impl AdminUser {
    /// A gerente may use every section; a funcionário only `pedidos`.
    pub fn has_permission(&self, section: Section) -> bool {
        match self.role {
            AdminRole::Gerente => true,
            AdminRole::Funcionario => section == Section::Pedidos,
        }
    }

    pub fn is_principal(&self) -> bool {
        self.username == PRINCIPAL_ADMIN
    }
}

/// Payload for creating an admin account.
#[derive(Debug, Clone)]
pub struct AdminCreate {
    pub username: String,
    pub password: String,
    pub role: AdminRole,
}

/// Singleton application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub delivery_fee: Decimal,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            delivery_fee: Decimal::new(1000, 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin(role: AdminRole) -> AdminUser {
        AdminUser {
            id: "admin_1".into(),
            username: "joana".into(),
            password: "123".into(),
            role,
        }
    }

    #[test]
    fn gerente_has_every_section() {
        let gerente = admin(AdminRole::Gerente);
        for section in [
            Section::Pedidos,
            Section::Produtos,
            Section::Administradores,
            Section::Configuracoes,
        ] {
            assert!(gerente.has_permission(section));
        }
    }

    #[test]
    fn funcionario_only_sees_pedidos() {
        let funcionario = admin(AdminRole::Funcionario);
        assert!(funcionario.has_permission(Section::Pedidos));
        for section in [Section::Produtos, Section::Administradores, Section::Configuracoes] {
            assert!(!funcionario.has_permission(section));
        }
    }

    #[test]
    fn principal_admin_is_recognized_by_username() {
        let mut a = admin(AdminRole::Gerente);
        assert!(!a.is_principal());
        a.username = PRINCIPAL_ADMIN.to_string();
        assert!(a.is_principal());
    }

    #[test]
    fn default_delivery_fee() {
        assert_eq!(AppConfig::default().delivery_fee, Decimal::new(1000, 2));
    }
}
