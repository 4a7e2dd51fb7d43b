//! Tablas existentes del sistema de tickets. Este servicio no ejecuta
//! migraciones; solo lee y escribe sobre el esquema ya desplegado.

diesel::table! {
    tbl_usuarios (id_usuario) {
        id_usuario -> Int4,
        nombre -> Varchar,
        apellido -> Varchar,
        usuario -> Varchar,
        password -> Varchar,
        correo -> Varchar,
        id_rol -> Int4,
        id_area -> Nullable<Int4>,
        activo -> Bool,
    }
}

diesel::table! {
    tbl_tickets (id_ticket) {
        id_ticket -> Int4,
        id_usuario -> Int4,
        id_area -> Int4,
        id_tecnico -> Nullable<Int4>,
        titulo -> Varchar,
        descripcion_problema -> Text,
        estado -> Varchar,
        prioridad -> Varchar,
        fecha_creacion -> Timestamptz,
        fecha_cierre -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    tbl_areas (id_area) {
        id_area -> Int4,
        nombre_area -> Varchar,
    }
}

diesel::table! {
    tbl_evaluaciones (id_evaluacion) {
        id_evaluacion -> Int4,
        id_ticket -> Int4,
        id_usuario -> Int4,
        rol_evaluador -> Varchar,
        calificacion -> Int4,
        comentario -> Nullable<Text>,
    }
}

diesel::joinable!(tbl_tickets -> tbl_usuarios (id_usuario));
diesel::joinable!(tbl_usuarios -> tbl_areas (id_area));

diesel::allow_tables_to_appear_in_same_query!(
    tbl_usuarios,
    tbl_tickets,
    tbl_areas,
    tbl_evaluaciones,
);
