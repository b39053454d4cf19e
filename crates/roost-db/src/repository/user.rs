//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed through [`PasswordHasher`]; construct with
//! [`SurrealUserRepository::with_pepper`] to pepper them.

use chrono::{DateTime, Utc};
use roost_core::error::{RoostError, RoostResult};
use roost_core::models::user::{AccountStatus, CreateUser, RoleSet, UpdateUser, User};
use roost_core::password::PasswordHasher;
use roost_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

const EMAIL_INDEX: &str = "idx_user_email";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    verified: bool,
    status: String,
    phone: Option<String>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    roles: Vec<String>,
    verified: bool,
    status: String,
    phone: Option<String>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        let roles =
            RoleSet::from_strings(&self.roles).map_err(|e| DbError::decode("user", e))?;
        let status = self
            .status
            .parse::<AccountStatus>()
            .map_err(|e| DbError::decode("user", e))?;
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            roles,
            verified: self.verified,
            status,
            phone: self.phone,
            profile_picture: self.profile_picture,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid("user", "record", &self.record_id)?;
        UserRow {
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            roles: self.roles,
            verified: self.verified,
            status: self.status,
            phone: self.phone,
            profile_picture: self.profile_picture,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    hasher: PasswordHasher,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            hasher: PasswordHasher::default(),
        }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: String) -> Self {
        Self {
            db,
            hasher: PasswordHasher::new(Some(pepper)),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> RoostResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = self.hasher.hash(&input.password)?;
        let email = input.email.clone();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash, \
                 roles = $roles, \
                 verified = false, \
                 status = 'Pending', \
                 phone = NONE, \
                 profile_picture = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("roles", RoleSet::default().to_strings()))
            .await
            .map_err(DbError::from)?;

        // A racing registration loses on the unique index.
        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if message.contains(EMAIL_INDEX) {
                RoostError::business_rule(format!("email {email} is already registered"))
            } else {
                DbError::Query(message).into()
            }
        })?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> RoostResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_email(&self, email: &str) -> RoostResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> RoostResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.roles.is_some() {
            sets.push("roles = $roles");
        }
        if input.verified.is_some() {
            sets.push("verified = $verified");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.profile_picture.is_some() {
            sets.push("profile_picture = $profile_picture");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(roles) = input.roles {
            builder = builder.bind(("roles", roles.to_strings()));
        }
        if let Some(verified) = input.verified {
            builder = builder.bind(("verified", verified));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(phone) = input.phone {
            // Some(None) clears the field.
            builder = builder.bind(("phone", phone));
        }
        if let Some(profile_picture) = input.profile_picture {
            builder = builder.bind(("profile_picture", profile_picture));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }
}
