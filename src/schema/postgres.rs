diesel::table! {
    user_profiles (id) {
        id -> BigInt,
        username -> Text,
        cty_balance -> BigInt,
        created_at -> BigInt,
        updated_at -> BigInt,
    }
}

diesel::table! {
    use crate::schema::enum_def::GenerationKindMapping;
    use diesel::sql_types::{BigInt, Text};

    artifacts (id) {
        id -> BigInt,
        user_id -> BigInt,
        kind -> GenerationKindMapping,
        prompt -> Text,
        provider -> Text,
        quality -> Text,
        object_key -> Text,
        url -> Text,
        cost -> BigInt,
        created_at -> BigInt,
    }
}
