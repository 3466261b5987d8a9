//! Security Devices Use Cases
//!
//! Owners can list their active sessions and terminate them.

use std::sync::Arc;

use kernel::id::DeviceId;

use crate::application::check_session::RefreshContext;
use crate::domain::read_model::DeviceView;
use crate::domain::repository::DeviceSessionRepository;
use crate::error::{AuthError, AuthResult};

pub struct DevicesUseCase<S>
where
    S: DeviceSessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> DevicesUseCase<S>
where
    S: DeviceSessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn list(&self, ctx: &RefreshContext) -> AuthResult<Vec<DeviceView>> {
        self.session_repo.list_device_views(&ctx.user_id).await
    }

    /// Terminate every session of the caller except the current one
    pub async fn terminate_others(&self, ctx: &RefreshContext) -> AuthResult<()> {
        let deleted = self
            .session_repo
            .delete_other_sessions(&ctx.user_id, &ctx.device_id)
            .await?;

        tracing::info!(user_id = %ctx.user_id, deleted, "Other devices terminated");
        Ok(())
    }

    /// Terminate one session. 404 if unknown, 403 if it belongs to someone else.
    pub async fn terminate(&self, ctx: &RefreshContext, device_id: &str) -> AuthResult<()> {
        let device_id = DeviceId::parse_str(device_id).ok_or(AuthError::DeviceNotFound)?;

        let session = self
            .session_repo
            .find_session(&device_id)
            .await?
            .ok_or(AuthError::DeviceNotFound)?;

        if session.user_id != ctx.user_id {
            return Err(AuthError::DeviceForbidden);
        }

        self.session_repo.delete_session(&device_id).await?;

        tracing::info!(user_id = %ctx.user_id, device_id = %device_id, "Device terminated");
        Ok(())
    }
}
