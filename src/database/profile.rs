use chrono::Utc;
use diesel::prelude::*;

use super::{get_connection, DbResult};
use crate::controller::BaseError;
use crate::{db_execute, db_object};

db_object! {
    #[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
    #[diesel(table_name = user_profiles)]
    pub struct UserProfile {
        pub id: i64,
        pub username: String,
        pub cty_balance: i64,
        pub created_at: i64,
        pub updated_at: i64,
    }
}

impl UserProfile {
    /// Profiles are created by the account service; this crate only reads
    /// them and writes the balance.
    pub fn find(user_id: i64) -> DbResult<Option<UserProfile>> {
        let conn = &mut get_connection();
        db_execute!(conn, {
            user_profiles::table
                .find(user_id)
                .select(UserProfileDb::as_select())
                .first::<UserProfileDb>(conn)
                .optional()
                .map(|profile| profile.map(|p| p.from_db()))
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to load user profile: {}", e)))
                })
        })
    }

    /// Writes an absolute balance computed by the caller. The earlier
    /// balance read and this write are separate statements with no
    /// cross-request lock, so two concurrent generations from one caller
    /// can both pass the gate before either lands here.
    pub fn set_cty_balance(user_id: i64, new_balance: i64) -> DbResult<()> {
        let conn = &mut get_connection();
        let current_time = Utc::now().timestamp_millis();
        db_execute!(conn, {
            let updated = diesel::update(user_profiles::table.find(user_id))
                .set((
                    user_profiles::dsl::cty_balance.eq(new_balance),
                    user_profiles::dsl::updated_at.eq(current_time),
                ))
                .execute(conn)
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!(
                        "Failed to update cty balance for user {}: {}",
                        user_id, e
                    )))
                })?;
            if updated == 0 {
                return Err(BaseError::NotFound(Some("user profile not found".to_string())));
            }
            Ok(())
        })
    }
}
