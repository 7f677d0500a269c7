diesel::table! {
    contacts (id) {
        id -> Uuid,
        name -> Varchar,
        is_bookmarked -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    contact_methods (id) {
        id -> Uuid,
        contact_id -> Uuid,
        method_type -> Varchar,
        value -> Varchar,
        label -> Nullable<Varchar>,
        position -> Int4,
    }
}

diesel::joinable!(contact_methods -> contacts (contact_id));

diesel::allow_tables_to_appear_in_same_query!(contacts, contact_methods);
