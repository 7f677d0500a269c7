use chrono::{DateTime, Utc};
use diesel::dsl::not;
use diesel::prelude::*;
use uuid::Uuid;

use super::repository::{ContactRepository, StoreError};
use super::types::{Contact, ContactMethod, ContactPatch, MethodType, NewContact, NewMethod};
use crate::shared::schema::{contact_methods, contacts};
use crate::shared::utils::{DbConn, DbPool};

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = contacts)]
pub struct DbContact {
    pub id: Uuid,
    pub name: String,
    pub is_bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Insertable, Associations)]
#[diesel(belongs_to(DbContact, foreign_key = contact_id))]
#[diesel(table_name = contact_methods)]
pub struct DbContactMethod {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub method_type: String,
    pub value: String,
    pub label: Option<String>,
    pub position: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = contacts)]
struct ContactChangeset<'a> {
    name: Option<&'a str>,
    is_bookmarked: Option<bool>,
    updated_at: DateTime<Utc>,
}

/// PostgreSQL-backed store. Each trait call checks out one pooled
/// connection and runs inside one transaction.
pub struct PgContactRepository {
    pool: DbPool,
}

impl PgContactRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

fn db_method_to_method(db: DbContactMethod) -> Result<ContactMethod, StoreError> {
    let method_type = db
        .method_type
        .parse::<MethodType>()
        .map_err(|_| StoreError::Corrupt(format!("method {} has type '{}'", db.id, db.method_type)))?;
    Ok(ContactMethod {
        id: db.id,
        contact_id: db.contact_id,
        method_type,
        value: db.value,
        label: db.label,
    })
}

fn db_contact_to_contact(db: DbContact, methods: Vec<DbContactMethod>) -> Result<Contact, StoreError> {
    Ok(Contact {
        id: db.id,
        name: db.name,
        is_bookmarked: db.is_bookmarked,
        created_at: db.created_at,
        updated_at: db.updated_at,
        methods: methods
            .into_iter()
            .map(db_method_to_method)
            .collect::<Result<_, _>>()?,
    })
}

/// Attaches each contact's methods, in written order.
fn with_methods(conn: &mut PgConnection, parents: Vec<DbContact>) -> Result<Vec<Contact>, StoreError> {
    let methods = DbContactMethod::belonging_to(&parents)
        .order(contact_methods::position.asc())
        .load::<DbContactMethod>(conn)?
        .grouped_by(&parents);

    parents
        .into_iter()
        .zip(methods)
        .map(|(contact, methods)| db_contact_to_contact(contact, methods))
        .collect()
}

fn find_contact(conn: &mut PgConnection, id: Uuid) -> Result<Option<Contact>, StoreError> {
    let row = contacts::table
        .find(id)
        .first::<DbContact>(conn)
        .optional()?;
    match row {
        Some(row) => Ok(with_methods(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn insert_methods(conn: &mut PgConnection, contact_id: Uuid, methods: &[NewMethod]) -> Result<(), StoreError> {
    if methods.is_empty() {
        return Ok(());
    }

    let rows = methods
        .iter()
        .enumerate()
        .map(|(position, m)| {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::Constraint("too many methods for one contact".to_string()))?;
            Ok(DbContactMethod {
                id: Uuid::new_v4(),
                contact_id,
                method_type: m.method_type.to_string(),
                value: m.value.clone(),
                label: m.label.clone(),
                position,
            })
        })
        .collect::<Result<Vec<_>, StoreError>>()?;

    diesel::insert_into(contact_methods::table)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

impl ContactRepository for PgContactRepository {
    fn list(&self, bookmarked_only: bool) -> Result<Vec<Contact>, StoreError> {
        let mut conn = self.conn()?;

        // One snapshot for both the contact rows and their methods.
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                let mut query = contacts::table.into_boxed();
                if bookmarked_only {
                    query = query.filter(contacts::is_bookmarked.eq(true));
                }

                let rows = query
                    .order((
                        contacts::is_bookmarked.desc(),
                        contacts::updated_at.desc(),
                        contacts::name.asc(),
                    ))
                    .load::<DbContact>(conn)?;

                with_methods(conn, rows)
            })
    }

    fn get(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn()?;
        conn.build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| find_contact(conn, id))
    }

    fn insert_batch(&self, batch: &[NewContact]) -> Result<Vec<Uuid>, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let now = Utc::now();
            let mut ids = Vec::with_capacity(batch.len());

            for candidate in batch {
                let row = DbContact {
                    id: Uuid::new_v4(),
                    name: candidate.name.clone(),
                    is_bookmarked: candidate.is_bookmarked,
                    created_at: now,
                    updated_at: now,
                };

                diesel::insert_into(contacts::table)
                    .values(&row)
                    .execute(conn)?;
                insert_methods(conn, row.id, &candidate.methods)?;
                ids.push(row.id);
            }

            Ok(ids)
        })
    }

    fn update_fields(&self, id: Uuid, patch: &ContactPatch) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let changes = ContactChangeset {
                name: patch.name.as_deref(),
                is_bookmarked: patch.is_bookmarked,
                updated_at: Utc::now(),
            };

            let updated = diesel::update(contacts::table.find(id))
                .set(&changes)
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }

            find_contact(conn, id)
        })
    }

    fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;

        // contact_methods rows go with it through ON DELETE CASCADE.
        let deleted = diesel::delete(contacts::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn toggle_bookmark(&self, id: Uuid) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            let flipped = diesel::update(contacts::table.find(id))
                .set((
                    contacts::is_bookmarked.eq(not(contacts::is_bookmarked)),
                    contacts::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            if flipped == 0 {
                return Ok(None);
            }

            find_contact(conn, id)
        })
    }

    fn save_contact(
        &self,
        id: Uuid,
        patch: &ContactPatch,
        methods: &[NewMethod],
    ) -> Result<Option<Contact>, StoreError> {
        let mut conn = self.conn()?;

        conn.transaction::<_, StoreError, _>(|conn| {
            // Row lock serializes concurrent replacements of the same contact.
            let owner = contacts::table
                .find(id)
                .select(contacts::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?;
            if owner.is_none() {
                return Ok(None);
            }

            let changes = ContactChangeset {
                name: patch.name.as_deref(),
                is_bookmarked: patch.is_bookmarked,
                updated_at: Utc::now(),
            };
            diesel::update(contacts::table.find(id))
                .set(&changes)
                .execute(conn)?;
            diesel::delete(contact_methods::table.filter(contact_methods::contact_id.eq(id)))
                .execute(conn)?;
            insert_methods(conn, id, methods)?;

            find_contact(conn, id)
        })
    }
}
