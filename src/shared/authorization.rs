use actix_web::HttpResponse;

use crate::auth::model::access_token_claims::AccessTokenClaims;
use crate::permissions::model::Action;
use crate::permissions::repository::permission_repository::PermissionRepository;
use crate::shared::responses::{forbidden, repository_error};

/// Checks `<resource>.<action>` for the caller's role. Admins always pass.
pub async fn authorize<PR: PermissionRepository>(
  permission_repository: &PR,
  auth: &AccessTokenClaims,
  resource: &str,
  action: Action,
) -> Result<(), HttpResponse> {
  if auth.is_admin() {
    return Ok(());
  }
  let permission = action.on(resource);
  match permission_repository.role_has(auth.role, &permission).await {
    Ok(true) => Ok(()),
    Ok(false) => {
      log::debug!("{} denied {} ({})", auth.uuid, permission, auth.role);
      Err(forbidden())
    }
    Err(error) => Err(repository_error(error)),
  }
}

/// Like [`authorize`], but the caller acting on their own record always passes.
pub async fn authorize_self_or<PR: PermissionRepository>(
  permission_repository: &PR,
  auth: &AccessTokenClaims,
  owner_uuid: &str,
  resource: &str,
  action: Action,
) -> Result<(), HttpResponse> {
  if auth.is_self(owner_uuid) {
    return Ok(());
  }
  authorize(permission_repository, auth, resource, action).await
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;

  use super::*;
  use crate::helpers::tests::create_fake_access_token_claims;
  use crate::permissions::repository::permission_repository::tests::InMemoryPermissionRepository;
  use crate::permissions::seed_default_permissions;
  use crate::shared::role::Role;

  #[actix_web::test]
  async fn test_admin_bypasses_grants() {
    let repository = InMemoryPermissionRepository::new();
    let auth = create_fake_access_token_claims("admin", Role::Admin);

    assert!(authorize(&repository, &auth, "permissions", Action::Delete)
      .await
      .is_ok());
  }

  #[actix_web::test]
  async fn test_default_grants_are_enforced() {
    let repository = InMemoryPermissionRepository::new();
    seed_default_permissions(&repository).await.unwrap();

    let manager = create_fake_access_token_claims("m", Role::Manager);
    assert!(authorize(&repository, &manager, "vehicles", Action::Update)
      .await
      .is_ok());
    let denied = authorize(&repository, &manager, "permissions", Action::Create)
      .await
      .unwrap_err();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let driver = create_fake_access_token_claims("d", Role::Driver);
    assert!(authorize(&repository, &driver, "trips", Action::View)
      .await
      .is_ok());
    assert!(authorize(&repository, &driver, "trips", Action::Create)
      .await
      .is_err());
  }

  #[actix_web::test]
  async fn test_self_access() {
    let repository = InMemoryPermissionRepository::new();
    let employee = create_fake_access_token_claims("e-1", Role::Employee);

    assert!(authorize_self_or(&repository, &employee, "e-1", "users", Action::View)
      .await
      .is_ok());
    assert!(authorize_self_or(&repository, &employee, "e-2", "users", Action::View)
      .await
      .is_err());
  }
}
