diesel::table! {
    appointments (id) {
        id -> Integer,
        user_id -> Integer,
        registration -> Text,
        appointment_date -> Date,
        time_slot -> Text,
        location -> Text,
        status -> Text,
        mechanic_id -> Nullable<Integer>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    clean_details (id) {
        id -> Integer,
        appointment_id -> Integer,
        registration -> Text,
        clean_type -> Text,
    }
}

diesel::table! {
    repair_details (id) {
        id -> Integer,
        appointment_id -> Integer,
        registration -> Text,
        repair_type -> Text,
        description -> Nullable<Text>,
    }
}

diesel::table! {
    service_details (id) {
        id -> Integer,
        appointment_id -> Integer,
        registration -> Text,
        odometer_km -> Integer,
        logbook_interval -> Integer,
        service_type -> Text,
        specific_service -> Text,
    }
}

diesel::table! {
    users (id) {
        id -> Integer,
        first_name -> Text,
        last_name -> Text,
        phone -> Text,
        email -> Text,
        password_hash -> Text,
        role -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    vehicles (registration) {
        registration -> Text,
        user_id -> Integer,
        make -> Text,
        model -> Text,
        year -> Integer,
        colour -> Text,
        last_service_date -> Date,
    }
}

diesel::joinable!(appointments -> vehicles (registration));
diesel::joinable!(clean_details -> appointments (appointment_id));
diesel::joinable!(repair_details -> appointments (appointment_id));
diesel::joinable!(service_details -> appointments (appointment_id));
diesel::joinable!(vehicles -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    appointments,
    clean_details,
    repair_details,
    service_details,
    users,
    vehicles,
);
