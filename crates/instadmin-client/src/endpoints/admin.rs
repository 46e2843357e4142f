use crate::client::ApiClient;
use instadmin_core::types::{ActionResponse, Admin, AdminId, AdminUpdate};
use instadmin_core::Result;
use validator::Validate;

impl ApiClient {
    /// Profile of the logged-in admin
    ///
    /// # Errors
    ///
    /// Returns [`instadmin_core::Error::Unauthorized`] without a valid session.
    pub async fn me(&self) -> Result<Admin> {
        self.get("/admin/me").await
    }

    /// Change the logged-in admin's name or password
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed payload or the API error.
    pub async fn update_me(&self, update: &AdminUpdate) -> Result<Admin> {
        update.validate()?;
        self.put("/admin/me", update).await
    }

    /// Every admin; superusers only
    ///
    /// # Errors
    ///
    /// Returns the API error (403) when the caller is not a superuser.
    pub async fn list_admins(&self) -> Result<Vec<Admin>> {
        self.get("/admin/").await
    }

    /// Remove another admin; superusers only, and never oneself
    ///
    /// # Errors
    ///
    /// Returns the API error for a missing admin, a non-superuser caller or
    /// an attempt to delete the caller's own account.
    pub async fn delete_admin(&self, id: AdminId) -> Result<ActionResponse> {
        self.delete(&format!("/admin/{id}")).await
    }
}
