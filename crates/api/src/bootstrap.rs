use cronocodex_auth::Role;
use cronocodex_infra::{NewAccount, StoreError};

use crate::app::services::AppServices;
use crate::config::BootstrapAdmin;

/// Create the root general admin unless one already exists.
///
/// Returns whether an account was created.
pub fn seed_general_admin(services: &AppServices, admin: &BootstrapAdmin) -> Result<bool, StoreError> {
    if services.accounts.any_with_role(Role::GeneralAdmin)? {
        tracing::debug!("general admin present, skipping bootstrap");
        return Ok(false);
    }

    let account = services.accounts.insert_account(NewAccount {
        full_name: "General Admin".to_string(),
        email: admin.email.clone(),
        role: Role::GeneralAdmin,
        supervisor_id: None,
        credential: services.gate.hasher().derive(&admin.password),
    })?;

    tracing::info!(principal_id = %account.id, "bootstrapped general admin");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use cronocodex_auth::{AuthConfig, SigningSecret};

    use super::*;

    #[tokio::test]
    async fn seeds_once_and_can_log_in() {
        let services = AppServices::in_memory(AuthConfig::new(SigningSecret::new("boot").unwrap()));
        let admin = BootstrapAdmin {
            email: "Root@Corp.test".to_string(),
            password: "rootpass".to_string(),
        };

        assert!(seed_general_admin(&services, &admin).unwrap());
        assert!(!seed_general_admin(&services, &admin).unwrap());

        let session = services.gate.login("root@corp.test", "rootpass").await.unwrap();
        assert_eq!(session.principal.role, Role::GeneralAdmin);
        assert_eq!(session.principal.supervisor_id, None);
    }
}
