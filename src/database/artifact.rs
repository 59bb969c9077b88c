use diesel::prelude::*;

use super::{get_connection, DbResult, ListResult};
use crate::controller::BaseError;
use crate::schema::enum_def::GenerationKind;
use crate::{db_execute, db_object};

db_object! {
    #[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
    #[diesel(table_name = artifacts)]
    pub struct Artifact {
        pub id: i64,
        pub user_id: i64,
        pub kind: GenerationKind,
        pub prompt: String,
        pub provider: String,
        pub quality: String,
        pub object_key: String,
        pub url: String,
        pub cost: i64,
        pub created_at: i64,
    }

    #[derive(Insertable, Debug)]
    #[diesel(table_name = artifacts)]
    pub struct NewArtifact {
        pub id: i64,
        pub user_id: i64,
        pub kind: GenerationKind,
        pub prompt: String,
        pub provider: String,
        pub quality: String,
        pub object_key: String,
        pub url: String,
        pub cost: i64,
        pub created_at: i64,
    }
}

impl Artifact {
    pub fn create(new_artifact: &NewArtifact) -> DbResult<Artifact> {
        let conn = &mut get_connection();
        db_execute!(conn, {
            let inserted = diesel::insert_into(artifacts::table)
                .values(NewArtifactDb::to_db(new_artifact))
                .returning(ArtifactDb::as_returning())
                .get_result::<ArtifactDb>(conn)
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to record artifact: {}", e)))
                })?;
            Ok(inserted.from_db())
        })
    }

    pub fn find(artifact_id: i64) -> DbResult<Option<Artifact>> {
        let conn = &mut get_connection();
        db_execute!(conn, {
            artifacts::table
                .find(artifact_id)
                .select(ArtifactDb::as_select())
                .first::<ArtifactDb>(conn)
                .optional()
                .map(|artifact| artifact.map(|a| a.from_db()))
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to load artifact: {}", e)))
                })
        })
    }

    pub fn list_by_user(
        user_id: i64,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> DbResult<ListResult<Artifact>> {
        let conn = &mut get_connection();
        let page_size = page_size.unwrap_or(20);
        let page = page.unwrap_or(1);
        let offset = (page - 1) * page_size;

        db_execute!(conn, {
            let total = artifacts::table
                .filter(artifacts::dsl::user_id.eq(user_id))
                .select(diesel::dsl::count_star())
                .first::<i64>(conn)
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to count artifacts: {}", e)))
                })?;

            let results_db = artifacts::table
                .filter(artifacts::dsl::user_id.eq(user_id))
                .order(artifacts::dsl::created_at.desc())
                .limit(page_size)
                .offset(offset)
                .select(ArtifactDb::as_select())
                .load::<ArtifactDb>(conn)
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to list artifacts: {}", e)))
                })?;

            let list = results_db.into_iter().map(|a| a.from_db()).collect();

            Ok(ListResult {
                total,
                page,
                page_size,
                list,
            })
        })
    }

    pub fn delete(artifact_id: i64) -> DbResult<usize> {
        let conn = &mut get_connection();
        db_execute!(conn, {
            diesel::delete(artifacts::table.find(artifact_id))
                .execute(conn)
                .map_err(|e| {
                    BaseError::DatabaseFatal(Some(format!("Failed to delete artifact: {}", e)))
                })
        })
    }
}
