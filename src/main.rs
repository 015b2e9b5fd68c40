mod assignments;
mod auth;
mod departments;
mod helpers;
mod permissions;
mod routes;
mod shared;
mod trips;
mod users;
mod vehicles;
mod vendors;

use std::sync::Arc;

use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware, web, App, HttpServer};
use actix_web_httpauth::middleware::HttpAuthentication;
use assignments::repository::assignment_repository::{
  AssignmentHistoryRepository, AssignmentHistoryRepositoryImpl,
};
use departments::repository::department_repository::{
  DepartmentRepository, DepartmentRepositoryImpl,
};
use env_logger::Env;
use helpers::custom_nanoid;
use permissions::repository::permission_repository::{
  PermissionRepository, PermissionRepositoryImpl,
};
use routes::repository::route_repository::{RouteRepository, RouteRepositoryImpl};
use shared::config::Config;
use shared::database::Database;
use shared::middleware::account_middleware::account_validator;
use shared::middleware::master_key_middleware::master_key_validator;
use trips::repository::trip_repository::{TripRepository, TripRepositoryImpl};
use users::repository::user_repository::{UserRepository, UserRepositoryImpl};
use vehicles::repository::vehicle_repository::{
  VehicleRepository, VehicleRepositoryImpl,
};
use vendors::repository::vendor_repository::{
  VendorRepository, VendorRepositoryImpl,
};

/// One storage backend: a repository type per collection.
trait RepositorySet: 'static {
  type Departments: DepartmentRepository + 'static;
  type Users: UserRepository + 'static;
  type Vendors: VendorRepository + 'static;
  type Vehicles: VehicleRepository + 'static;
  type Routes: RouteRepository + 'static;
  type Trips: TripRepository + 'static;
  type Permissions: PermissionRepository + 'static;
  type Histories: AssignmentHistoryRepository + 'static;
}

struct Repositories<S: RepositorySet> {
  departments: S::Departments,
  users: S::Users,
  vendors: S::Vendors,
  vehicles: S::Vehicles,
  routes: S::Routes,
  trips: S::Trips,
  permissions: S::Permissions,
  histories: S::Histories,
}

struct Postgres;

impl RepositorySet for Postgres {
  type Departments = DepartmentRepositoryImpl;
  type Users = UserRepositoryImpl;
  type Vendors = VendorRepositoryImpl;
  type Vehicles = VehicleRepositoryImpl;
  type Routes = RouteRepositoryImpl;
  type Trips = TripRepositoryImpl;
  type Permissions = PermissionRepositoryImpl;
  type Histories = AssignmentHistoryRepositoryImpl;
}

impl Repositories<Postgres> {
  fn postgres(database: Arc<Database>) -> Self {
    Self {
      departments: DepartmentRepositoryImpl::new(database.clone()),
      users: UserRepositoryImpl::new(database.clone()),
      vendors: VendorRepositoryImpl::new(database.clone()),
      vehicles: VehicleRepositoryImpl::new(database.clone()),
      routes: RouteRepositoryImpl::new(database.clone()),
      trips: TripRepositoryImpl::new(database.clone()),
      permissions: PermissionRepositoryImpl::new(database.clone()),
      histories: AssignmentHistoryRepositoryImpl::new(database),
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  env_logger::Builder::from_env(Env::default().default_filter_or("info"))
    .init();

  let app_config = Config::default();
  let database = match Database::new(&app_config).await {
    Ok(database) => Arc::new(database),
    Err(error) => {
      log::error!("cannot open database: {error}");
      return Err(std::io::Error::other(error));
    }
  };

  let permission_repository = PermissionRepositoryImpl::new(database.clone());
  if let Err(error) =
    permissions::seed_default_permissions(&permission_repository).await
  {
    log::error!("cannot seed permissions: {error}");
    return Err(std::io::Error::other(error));
  }

  let server_address = app_config.server_address.clone();
  log::info!("Listening on http://{}", server_address);

  HttpServer::new(move || {
    let repositories = Repositories::postgres(database.clone());
    let app_config = app_config.clone();
    App::new()
      .wrap(middleware::Logger::default())
      .configure(|cfg| config(cfg, repositories, app_config))
  })
  .bind(server_address)?
  .run()
  .await
}

// Function to initialize the App
fn config<S: RepositorySet>(
  cfg: &mut web::ServiceConfig,
  repositories: Repositories<S>,
  app_config: Config,
) {
  // Rate limit login attempts per IP address
  let governor_config = GovernorConfigBuilder::default()
    .requests_per_second(app_config.login_requests_per_second)
    .burst_size(app_config.login_burst_size)
    .finish()
    .unwrap_or_default();

  cfg
    .app_data(web::Data::new(app_config))
    .app_data(web::Data::new(repositories.departments))
    .app_data(web::Data::new(repositories.users))
    .app_data(web::Data::new(repositories.vendors))
    .app_data(web::Data::new(repositories.vehicles))
    .app_data(web::Data::new(repositories.routes))
    .app_data(web::Data::new(repositories.trips))
    .app_data(web::Data::new(repositories.permissions))
    .app_data(web::Data::new(repositories.histories))
    .service(
      web::scope("/v1")
        .wrap(HttpAuthentication::with_fn(account_validator::<S::Users>))
        .service(
          web::scope("/auth")
            .wrap(Governor::new(&governor_config))
            .route("/login", web::post().to(auth::login::<S::Users>)),
        )
        .service(
          web::scope("/admin")
            .wrap(HttpAuthentication::with_fn(master_key_validator))
            .route(
              "/users",
              web::post().to(auth::create_admin_user::<S::Users>),
            ),
        )
        .service(
          web::scope("/departments")
            .route(
              "",
              web::get().to(
                departments::list_departments::<S::Departments, S::Permissions>,
              ),
            )
            .route(
              "",
              web::post().to(
                departments::create_department::<S::Departments, S::Permissions>,
              ),
            )
            .route(
              "/{uuid}",
              web::get().to(
                departments::get_department::<S::Departments, S::Permissions>,
              ),
            )
            .route(
              "/{uuid}",
              web::put().to(
                departments::update_department::<S::Departments, S::Permissions>,
              ),
            )
            .route(
              "/{uuid}",
              web::delete().to(
                departments::delete_department::<S::Departments, S::Permissions>,
              ),
            ),
        )
        .service(
          web::scope("/users")
            .route(
              "",
              web::get().to(users::list_users::<S::Users, S::Permissions>),
            )
            .route(
              "",
              web::post().to(users::create_user::<S::Users, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::get().to(users::get_user::<S::Users, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::put().to(
                users::update_user::<S::Users, S::Permissions, S::Vehicles>,
              ),
            )
            .route(
              "/{uuid}",
              web::delete().to(
                users::delete_user::<S::Users, S::Permissions, S::Vehicles>,
              ),
            )
            .route(
              "/{uuid}/vehicle-history",
              web::get().to(
                users::get_user_vehicle_history::<S::Permissions, S::Histories>,
              ),
            ),
        )
        .service(
          web::scope("/vendors")
            .route(
              "",
              web::get().to(vendors::list_vendors::<S::Vendors, S::Permissions>),
            )
            .route(
              "",
              web::post()
                .to(vendors::create_vendor::<S::Vendors, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::get().to(vendors::get_vendor::<S::Vendors, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::put()
                .to(vendors::update_vendor::<S::Vendors, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::delete()
                .to(vendors::delete_vendor::<S::Vendors, S::Permissions>),
            ),
        )
        .service(
          web::scope("/vehicles")
            .route(
              "",
              web::get()
                .to(vehicles::list_vehicles::<S::Vehicles, S::Permissions>),
            )
            .route(
              "",
              web::post().to(
                vehicles::create_vehicle::<S::Vehicles, S::Permissions, S::Users>,
              ),
            )
            .route(
              "/{uuid}",
              web::get().to(vehicles::get_vehicle::<S::Vehicles, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::put().to(
                vehicles::update_vehicle::<S::Vehicles, S::Permissions, S::Users>,
              ),
            )
            .route(
              "/{uuid}",
              web::delete().to(
                vehicles::delete_vehicle::<
                  S::Vehicles,
                  S::Permissions,
                  S::Trips,
                  S::Histories,
                >,
              ),
            )
            .route(
              "/{uuid}/driver-history",
              web::get().to(
                vehicles::get_vehicle_driver_history::<
                  S::Permissions,
                  S::Histories,
                >,
              ),
            ),
        )
        .service(
          web::scope("/routes")
            .route(
              "",
              web::get().to(routes::list_routes::<S::Routes, S::Permissions>),
            )
            .route(
              "",
              web::post().to(routes::create_route::<S::Routes, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::get().to(routes::get_route::<S::Routes, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::put().to(routes::update_route::<S::Routes, S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::delete().to(
                routes::delete_route::<S::Routes, S::Permissions, S::Trips>,
              ),
            ),
        )
        .service(
          web::scope("/trips")
            .route(
              "",
              web::get().to(trips::list_trips::<S::Trips, S::Permissions>),
            )
            .route(
              "",
              web::post().to(
                trips::create_trip::<
                  S::Trips,
                  S::Permissions,
                  S::Routes,
                  S::Vehicles,
                >,
              ),
            )
            .route(
              "/{uuid}",
              web::get().to(
                trips::get_trip::<S::Trips, S::Permissions, S::Vehicles>,
              ),
            )
            .route(
              "/{uuid}",
              web::put().to(
                trips::update_trip::<
                  S::Trips,
                  S::Permissions,
                  S::Routes,
                  S::Vehicles,
                >,
              ),
            )
            .route(
              "/{uuid}",
              web::delete()
                .to(trips::delete_trip::<S::Trips, S::Permissions>),
            )
            .route(
              "/{uuid}/vehicle-history",
              web::get().to(
                trips::get_trip_vehicle_history::<S::Permissions, S::Histories>,
              ),
            ),
        )
        .service(
          web::scope("/permissions")
            .route(
              "",
              web::get().to(permissions::list_permissions::<S::Permissions>),
            )
            .route(
              "",
              web::post().to(permissions::create_permission::<S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::get().to(permissions::get_permission::<S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::put().to(permissions::update_permission::<S::Permissions>),
            )
            .route(
              "/{uuid}",
              web::delete()
                .to(permissions::delete_permission::<S::Permissions>),
            ),
        )
        .service(
          web::scope("/roles/{role}/permissions")
            .route(
              "",
              web::get()
                .to(permissions::get_role_permissions::<S::Permissions>),
            )
            .route(
              "/{name}",
              web::put()
                .to(permissions::grant_role_permission::<S::Permissions>),
            )
            .route(
              "/{name}",
              web::delete()
                .to(permissions::revoke_role_permission::<S::Permissions>),
            ),
        ),
    );
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::dev::ServiceResponse;
  use actix_web::http::{header, StatusCode};
  use actix_web::test;
  use assignments::repository::assignment_repository::tests::InMemoryAssignmentHistoryRepository;
  use assignments::rto::assignment_rto::AssignmentHistoryRto;
  use auth::rto::access_token_rto::AccessTokenRto;
  use departments::repository::department_repository::tests::InMemoryDepartmentRepository;
  use permissions::repository::permission_repository::tests::InMemoryPermissionRepository;
  use routes::repository::route_repository::tests::InMemoryRouteRepository;
  use serde::de::DeserializeOwned;
  use shared::rto::created_rto::CreatedRto;
  use std::{net::SocketAddr, str::FromStr};
  use trips::repository::trip_repository::tests::InMemoryTripRepository;
  use users::repository::user_repository::tests::InMemoryUserRepository;
  use vehicles::repository::vehicle_repository::tests::InMemoryVehicleRepository;
  use vendors::repository::vendor_repository::tests::InMemoryVendorRepository;

  struct InMemory;

  impl RepositorySet for InMemory {
    type Departments = InMemoryDepartmentRepository;
    type Users = InMemoryUserRepository;
    type Vendors = InMemoryVendorRepository;
    type Vehicles = InMemoryVehicleRepository;
    type Routes = InMemoryRouteRepository;
    type Trips = InMemoryTripRepository;
    type Permissions = InMemoryPermissionRepository;
    type Histories = InMemoryAssignmentHistoryRepository;
  }

  async fn in_memory_repositories() -> Repositories<InMemory> {
    let permissions = InMemoryPermissionRepository::new();
    permissions::seed_default_permissions(&permissions)
      .await
      .unwrap();
    let histories = InMemoryAssignmentHistoryRepository::new();
    Repositories {
      departments: InMemoryDepartmentRepository::new(),
      users: InMemoryUserRepository::new(),
      vendors: InMemoryVendorRepository::new(),
      vehicles: InMemoryVehicleRepository::new().tracking(histories.clone()),
      routes: InMemoryRouteRepository::new(),
      trips: InMemoryTripRepository::new().tracking(histories.clone()),
      permissions,
      histories,
    }
  }

  fn json_request(
    request: test::TestRequest,
    bearer: Option<&str>,
    body: serde_json::Value,
  ) -> test::TestRequest {
    let request = request
      .peer_addr(SocketAddr::from_str("127.0.0.1:12345").unwrap())
      .set_json(body);
    match bearer {
      Some(token) => request
        .append_header((header::AUTHORIZATION, format!("Bearer {token}"))),
      None => request,
    }
  }

  async fn read<T: DeserializeOwned>(
    response: ServiceResponse,
    status: StatusCode,
  ) -> T {
    assert_eq!(response.status(), status);
    let body = test::read_body(response).await;
    serde_json::from_slice(&body).expect("Failed to parse response JSON")
  }

  fn user_body(user_name: &str, role: &str) -> serde_json::Value {
    serde_json::json!({
      "userName": user_name,
      "email": format!("{user_name}@fleet.test"),
      "fullName": "Test Person",
      "role": role,
      "password": "long enough password"
    })
  }

  #[actix_rt::test]
  async fn test_bootstrap_login_and_driver_assignment() {
    let app_config = Config::for_tests();
    let master_key = app_config.master_key.clone();
    let repositories = in_memory_repositories().await;
    let app = test::init_service(
      App::new().configure(|cfg| config(cfg, repositories, app_config)),
    )
    .await;

    // 1) Bootstrap the first admin with the master key
    let request = json_request(
      test::TestRequest::post().uri("/v1/admin/users"),
      Some(&master_key),
      user_body("root", "admin"),
    );
    let response = test::call_service(&app, request.to_request()).await;
    let _: CreatedRto = read(response, StatusCode::CREATED).await;

    // 2) Log in
    let request = json_request(
      test::TestRequest::post().uri("/v1/auth/login"),
      None,
      serde_json::json!({"userName": "root", "password": "long enough password"}),
    );
    let response = test::call_service(&app, request.to_request()).await;
    let token: AccessTokenRto = read(response, StatusCode::OK).await;
    let token = token.access_token;

    // 3) Create a driver and a vehicle driven by them
    let request = json_request(
      test::TestRequest::post().uri("/v1/users"),
      Some(&token),
      user_body("driver1", "driver"),
    );
    let response = test::call_service(&app, request.to_request()).await;
    let driver: CreatedRto = read(response, StatusCode::CREATED).await;

    let request = json_request(
      test::TestRequest::post().uri("/v1/vehicles"),
      Some(&token),
      serde_json::json!({
        "plateNumber": "FLT-001",
        "make": "Toyota",
        "model": "HiAce",
        "year": 2022,
        "capacity": 12,
        "status": "available",
        "driverUuid": driver.uuid
      }),
    );
    let response = test::call_service(&app, request.to_request()).await;
    assert!(
      response.headers().get(header::LOCATION).is_some(),
      "Location header missing"
    );
    let vehicle: CreatedRto = read(response, StatusCode::CREATED).await;

    // 4) Both sides of the assignment are visible
    let request = test::TestRequest::get()
      .uri(&format!("/v1/vehicles/{}/driver-history", vehicle.uuid))
      .append_header((header::AUTHORIZATION, format!("Bearer {token}")));
    let response = test::call_service(&app, request.to_request()).await;
    let history: AssignmentHistoryRto = read(response, StatusCode::OK).await;
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].assignee_uuid, driver.uuid);
    assert!(history.items[0].is_current);

    let request = test::TestRequest::get()
      .uri(&format!("/v1/users/{}/vehicle-history", driver.uuid))
      .append_header((header::AUTHORIZATION, format!("Bearer {token}")));
    let response = test::call_service(&app, request.to_request()).await;
    let history: AssignmentHistoryRto = read(response, StatusCode::OK).await;
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].subject_uuid, vehicle.uuid);

    // 5) The driver cannot be deleted while assigned
    let request = test::TestRequest::delete()
      .uri(&format!("/v1/users/{}", driver.uuid))
      .append_header((header::AUTHORIZATION, format!("Bearer {token}")));
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
  }

  #[actix_rt::test]
  async fn test_deactivated_account_loses_access_immediately() {
    let app_config = Config::for_tests();
    let master_key = app_config.master_key.clone();
    let repositories = in_memory_repositories().await;
    let app = test::init_service(
      App::new().configure(|cfg| config(cfg, repositories, app_config)),
    )
    .await;

    let login = |user_name: &str| {
      json_request(
        test::TestRequest::post().uri("/v1/auth/login"),
        None,
        serde_json::json!({"userName": user_name, "password": "long enough password"}),
      )
      .to_request()
    };

    let request = json_request(
      test::TestRequest::post().uri("/v1/admin/users"),
      Some(&master_key),
      user_body("root", "admin"),
    );
    let response = test::call_service(&app, request.to_request()).await;
    let _: CreatedRto = read(response, StatusCode::CREATED).await;
    let response = test::call_service(&app, login("root")).await;
    let admin: AccessTokenRto = read(response, StatusCode::OK).await;

    let request = json_request(
      test::TestRequest::post().uri("/v1/users"),
      Some(&admin.access_token),
      user_body("clerk", "employee"),
    );
    let response = test::call_service(&app, request.to_request()).await;
    let clerk: CreatedRto = read(response, StatusCode::CREATED).await;
    let response = test::call_service(&app, login("clerk")).await;
    let token: AccessTokenRto = read(response, StatusCode::OK).await;

    let own_profile = || {
      test::TestRequest::get()
        .uri(&format!("/v1/users/{}", clerk.uuid))
        .append_header((
          header::AUTHORIZATION,
          format!("Bearer {}", token.access_token),
        ))
        .to_request()
    };
    let response = test::call_service(&app, own_profile()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = json_request(
      test::TestRequest::put().uri(&format!("/v1/users/{}", clerk.uuid)),
      Some(&admin.access_token),
      serde_json::json!({
        "email": "clerk@fleet.test",
        "fullName": "Test Person",
        "role": "employee",
        "isActive": false
      }),
    );
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The token has not expired, the account behind it is gone.
    let status = match test::try_call_service(&app, own_profile()).await {
      Ok(response) => response.status(),
      Err(error) => error.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }

  #[actix_rt::test]
  async fn test_protected_routes_reject_missing_credentials() {
    let app_config = Config::for_tests();
    let repositories = in_memory_repositories().await;
    let app = test::init_service(
      App::new().configure(|cfg| config(cfg, repositories, app_config)),
    )
    .await;

    let request = test::TestRequest::get().uri("/v1/vehicles");
    let response = test::call_service(&app, request.to_request()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = json_request(
      test::TestRequest::post().uri("/v1/admin/users"),
      Some("not-the-master-key"),
      user_body("intruder", "admin"),
    );
    let status = match test::try_call_service(&app, request.to_request()).await
    {
      Ok(response) => response.status(),
      Err(error) => error.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }
}
