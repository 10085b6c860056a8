diesel::table! {
    guild_configs (guild_id) {
        guild_id -> BigInt,
        prefix -> Text,
    }
}

diesel::table! {
    quorum_scope_configs (guild_id, scope_type, scope_id) {
        guild_id -> BigInt,
        scope_type -> Integer,
        scope_id -> BigInt,
        role_id -> BigInt,
        quorum_proportion -> Integer,
    }
}

diesel::allow_tables_to_appear_in_same_query!(guild_configs, quorum_scope_configs);
