//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{DeviceId, UserId};
use kernel::pagination::{Page, Paginated};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    device_session::DeviceSession,
    user::{EmailConfirmation, User},
};
use crate::domain::read_model::{DeviceView, MeView, UserFilter, UserView};
use crate::domain::repository::{
    DeviceSessionRepository, UserConflicts, UserQueryRepository, UserRepository,
};
use crate::domain::value_object::{
    email::Email, expiring_code::ExpiringCode, login::Login, user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    id,
    login,
    email,
    password_hash,
    created_at,
    is_confirmed,
    confirmation_code,
    confirmation_expires_at,
    recovery_code,
    recovery_expires_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user_where(&self, condition: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {condition}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

/// Unique violations on insert surface as field errors; a concurrent
/// registration can slip past the conflict check.
fn map_insert_error(err: sqlx::Error) -> AuthError {
    let constraint = match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => db.constraint(),
        _ => None,
    };
    match constraint {
        Some("users_login_key") => {
            return AppError::bad_request("Login is already taken")
                .with_field("login")
                .into();
        }
        Some("users_email_key") => {
            return AppError::bad_request("Email is already registered")
                .with_field("email")
                .into();
        }
        _ => {}
    }
    err.into()
}

/// `%term%` with LIKE wildcards escaped
fn contains_pattern(term: &Option<String>) -> Option<String> {
    term.as_deref().map(|t| {
        let escaped = t
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        let (code, code_expires_at) = match &user.confirmation {
            EmailConfirmation::Pending(code) => (Some(code.code.as_str()), Some(code.expires_at)),
            EmailConfirmation::Confirmed => (None, None),
        };

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                login,
                email,
                password_hash,
                created_at,
                is_confirmed,
                confirmation_code,
                confirmation_expires_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.login.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.created_at)
        .bind(user.is_confirmed())
        .bind(code)
        .bind(code_expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_login_or_email(&self, login_or_email: &str) -> AuthResult<Option<User>> {
        self.fetch_user_where("login = $1 OR email = lower($1)", login_or_email)
            .await
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.fetch_user_where("email = $1", email.as_str()).await
    }

    async fn find_user_by_confirmation_code(&self, code: &str) -> AuthResult<Option<User>> {
        self.fetch_user_where("confirmation_code = $1", code).await
    }

    async fn find_user_by_recovery_code(&self, code: &str) -> AuthResult<Option<User>> {
        self.fetch_user_where("recovery_code = $1", code).await
    }

    async fn find_user_conflicts(
        &self,
        login: &Login,
        email: &Email,
    ) -> AuthResult<UserConflicts> {
        let (login_taken, email_taken): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM users WHERE login = $1),
                EXISTS (SELECT 1 FROM users WHERE email = $2)
            "#,
        )
        .bind(login.as_str())
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(UserConflicts {
            login_taken,
            email_taken,
        })
    }

    async fn confirm_email(
        &self,
        user_id: &UserId,
        code: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                is_confirmed = TRUE,
                confirmation_code = NULL,
                confirmation_expires_at = NULL
            WHERE id = $1
              AND NOT is_confirmed
              AND confirmation_code = $2
              AND confirmation_expires_at > $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_confirmation_code(
        &self,
        user_id: &UserId,
        code: &ExpiringCode,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET confirmation_code = $2, confirmation_expires_at = $3
            WHERE id = $1 AND NOT is_confirmed
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&code.code)
        .bind(code.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_recovery_code(&self, user_id: &UserId, code: &ExpiringCode) -> AuthResult<()> {
        sqlx::query("UPDATE users SET recovery_code = $2, recovery_expires_at = $3 WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(&code.code)
            .bind(code.expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: &UserId,
        code: &str,
        password_hash: &UserPassword,
        now: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                password_hash = $3,
                recovery_code = NULL,
                recovery_expires_at = NULL
            WHERE id = $1
              AND recovery_code = $2
              AND recovery_expires_at > $4
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(code)
        .bind(password_hash.as_phc_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, user_id: &UserId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// User Query Repository Implementation
// ============================================================================

impl UserQueryRepository for PgAuthRepository {
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &Page,
    ) -> AuthResult<Paginated<UserView>> {
        // No terms means no filtering; otherwise either term may match
        let condition = r#"
            ($1::text IS NULL AND $2::text IS NULL)
            OR login ILIKE $1
            OR email ILIKE $2
        "#;
        let login_pattern = contains_pattern(&filter.search_login_term);
        let email_pattern = contains_pattern(&filter.search_email_term);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {condition}"))
            .bind(&login_pattern)
            .bind(&email_pattern)
            .fetch_one(&self.pool)
            .await?;

        // sort_column comes from a fixed allow-list
        let sql = format!(
            r#"
            SELECT id, login, email, created_at
            FROM users
            WHERE {condition}
            ORDER BY {} {}, id
            LIMIT $3 OFFSET $4
            "#,
            page.sort_column,
            page.direction.as_sql()
        );
        let rows = sqlx::query_as::<_, UserViewRow>(&sql)
            .bind(&login_pattern)
            .bind(&email_pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(UserViewRow::into_view).collect();
        Ok(Paginated::new(items, total.max(0) as u64, page))
    }

    async fn find_user_view(&self, user_id: &UserId) -> AuthResult<Option<UserView>> {
        let row = sqlx::query_as::<_, UserViewRow>(
            "SELECT id, login, email, created_at FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserViewRow::into_view))
    }

    async fn find_me_view(&self, user_id: &UserId) -> AuthResult<Option<MeView>> {
        let row = sqlx::query_as::<_, UserViewRow>(
            "SELECT id, login, email, created_at FROM users WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| MeView {
            email: r.email,
            login: r.login,
            user_id: UserId::from_uuid(r.id),
        }))
    }
}

// ============================================================================
// Device Session Repository Implementation
// ============================================================================

impl DeviceSessionRepository for PgAuthRepository {
    async fn insert_session(&self, session: &DeviceSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO device_sessions (
                device_id,
                user_id,
                issued_at,
                expires_at,
                ip,
                device_name,
                last_active_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(session.device_id.as_uuid())
        .bind(session.user_id.as_uuid())
        .bind(session.issued_at)
        .bind(session.expires_at)
        .bind(&session.ip)
        .bind(&session.device_name)
        .bind(session.last_active_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, device_id: &DeviceId) -> AuthResult<Option<DeviceSession>> {
        let row = sqlx::query_as::<_, DeviceSessionRow>(
            r#"
            SELECT
                device_id,
                user_id,
                issued_at,
                expires_at,
                ip,
                device_name,
                last_active_at
            FROM device_sessions
            WHERE device_id = $1
            "#,
        )
        .bind(device_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DeviceSessionRow::into_session))
    }

    async fn rotate_session(
        &self,
        session: &DeviceSession,
        previous_issued_at: DateTime<Utc>,
    ) -> AuthResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE device_sessions SET
                issued_at = $3,
                expires_at = $4,
                last_active_at = $5
            WHERE device_id = $1 AND issued_at = $2
            "#,
        )
        .bind(session.device_id.as_uuid())
        .bind(previous_issued_at)
        .bind(session.issued_at)
        .bind(session.expires_at)
        .bind(session.last_active_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_session(&self, device_id: &DeviceId) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM device_sessions WHERE device_id = $1")
            .bind(device_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_other_sessions(&self, user_id: &UserId, keep: &DeviceId) -> AuthResult<u64> {
        let result =
            sqlx::query("DELETE FROM device_sessions WHERE user_id = $1 AND device_id <> $2")
                .bind(user_id.as_uuid())
                .bind(keep.as_uuid())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    async fn list_device_views(&self, user_id: &UserId) -> AuthResult<Vec<DeviceView>> {
        let rows = sqlx::query_as::<_, DeviceSessionRow>(
            r#"
            SELECT
                device_id,
                user_id,
                issued_at,
                expires_at,
                ip,
                device_name,
                last_active_at
            FROM device_sessions
            WHERE user_id = $1 AND expires_at > now()
            ORDER BY last_active_at DESC, device_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| DeviceView {
                ip: r.ip,
                title: r.device_name,
                last_active_date: r.last_active_at,
                device_id: DeviceId::from_uuid(r.device_id),
            })
            .collect())
    }

    async fn delete_expired_sessions(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM device_sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired device sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    login: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    is_confirmed: bool,
    confirmation_code: Option<String>,
    confirmation_expires_at: Option<DateTime<Utc>>,
    recovery_code: Option<String>,
    recovery_expires_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        let confirmation = match (self.is_confirmed, self.confirmation_code, self.confirmation_expires_at) {
            (true, _, _) => EmailConfirmation::Confirmed,
            (false, Some(code), Some(expires_at)) => {
                EmailConfirmation::Pending(ExpiringCode { code, expires_at })
            }
            // Unconfirmed without a code: nothing can confirm it until a resend
            (false, _, _) => EmailConfirmation::Pending(ExpiringCode {
                code: String::new(),
                expires_at: self.created_at,
            }),
        };

        let recovery = match (self.recovery_code, self.recovery_expires_at) {
            (Some(code), Some(expires_at)) => Some(ExpiringCode { code, expires_at }),
            _ => None,
        };

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            login: Login::from_db(self.login),
            email: Email::from_db(self.email),
            password_hash,
            created_at: self.created_at,
            confirmation,
            recovery,
        })
    }
}

#[derive(sqlx::FromRow)]
struct UserViewRow {
    id: Uuid,
    login: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl UserViewRow {
    fn into_view(self) -> UserView {
        UserView {
            id: UserId::from_uuid(self.id),
            login: self.login,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DeviceSessionRow {
    device_id: Uuid,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    ip: String,
    device_name: String,
    last_active_at: DateTime<Utc>,
}

impl DeviceSessionRow {
    fn into_session(self) -> DeviceSession {
        DeviceSession {
            device_id: DeviceId::from_uuid(self.device_id),
            user_id: UserId::from_uuid(self.user_id),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            ip: self.ip,
            device_name: self.device_name,
            last_active_at: self.last_active_at,
        }
    }
}
