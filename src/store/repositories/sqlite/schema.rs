diesel::table! {
    region_history (id) {
        id -> Integer,
        region_code -> Text,
        base_layer_count -> Integer,
        total_bs_count -> Integer,
        power_problems -> Integer,
        non_priority_percentage -> Integer,
        timestamp -> Timestamp,
        created_at -> Timestamp,
    }
}
