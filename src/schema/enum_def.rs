use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The media kinds the generation endpoints produce. "Living" is the
/// product name for the short looping video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, DbEnum, Display, Default)]
#[db_enum(pg_type = "generation_kind_enum")]
#[db_enum(value_style = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GenerationKind {
    #[default]
    Image,
    Sound,
    Living,
}
