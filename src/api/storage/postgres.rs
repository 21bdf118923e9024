//! PostgreSQL storage backend implementation.
//!
//! Uses sqlx for database operations and implements the StorageBackend trait.
//! Enum columns are stored as their lowercase wire names; list columns as JSON text.

use super::{StorageError, traits::*};
use crate::models::property::{decode_list, encode_list};
use crate::models::{
    ApprovalStatus, Booking, BookingStatus, Lease, LeaseStatus, NewBooking, NewLease, NewPayment,
    NewProperty, NewService, NewServiceBooking, NewUser, Payment, PaymentStatus, Property, Service,
    ServiceBooking, ServiceBookingStatus, User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, approval_status, created_at";
const PROPERTY_COLUMNS: &str = "id, landlord_id, name, description, location, price, property_type, \
     bedrooms, bathrooms, square_feet, available, amenities, images, latitude, longitude, \
     created_at, updated_at";
const BOOKING_COLUMNS: &str =
    "id, tenant_id, property_id, status, message, landlord_response, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, tenant_id, property_id, lease_id, amount, method, status, \
     due_date, paid_date, transaction_id, reference_number, notes, created_at, updated_at";
const LEASE_COLUMNS: &str = "id, property_id, tenant_id, landlord_id, monthly_rent, \
     security_deposit, start_date, end_date, lease_duration_months, status, pet_deposit, \
     utilities_included, parking_included, created_at, updated_at, signed_at";
const SERVICE_COLUMNS: &str = "id, name, description, rate, is_active";
const SERVICE_BOOKING_COLUMNS: &str =
    "id, tenant_id, property_id, service_id, requested_date, status, notes";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    approval_status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            approval_status: row.approval_status.parse()?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct PropertyRow {
    id: i64,
    landlord_id: i64,
    name: String,
    description: Option<String>,
    location: String,
    price: f64,
    property_type: String,
    bedrooms: i32,
    bathrooms: i32,
    square_feet: Option<f64>,
    available: bool,
    amenities: Option<String>,
    images: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            landlord_id: row.landlord_id,
            name: row.name,
            description: row.description,
            location: row.location,
            price: row.price,
            property_type: row.property_type,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            square_feet: row.square_feet,
            available: row.available,
            amenities: decode_list(row.amenities.as_deref()),
            images: decode_list(row.images.as_deref()),
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    tenant_id: i64,
    property_id: i64,
    status: String,
    message: Option<String>,
    landlord_response: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StorageError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            status: row.status.parse()?,
            message: row.message,
            landlord_response: row.landlord_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct PaymentRow {
    id: i64,
    tenant_id: i64,
    property_id: i64,
    lease_id: Option<i64>,
    amount: f64,
    method: String,
    status: String,
    due_date: Option<NaiveDate>,
    paid_date: Option<NaiveDate>,
    transaction_id: Option<String>,
    reference_number: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StorageError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: row.id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            lease_id: row.lease_id,
            amount: row.amount,
            method: row.method.parse()?,
            status: row.status.parse()?,
            due_date: row.due_date,
            paid_date: row.paid_date,
            transaction_id: row.transaction_id,
            reference_number: row.reference_number,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct LeaseRow {
    id: i64,
    property_id: i64,
    tenant_id: i64,
    landlord_id: i64,
    monthly_rent: f64,
    security_deposit: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    lease_duration_months: i32,
    status: String,
    pet_deposit: Option<f64>,
    utilities_included: bool,
    parking_included: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    signed_at: Option<DateTime<Utc>>,
}

impl TryFrom<LeaseRow> for Lease {
    type Error = StorageError;

    fn try_from(row: LeaseRow) -> Result<Self, Self::Error> {
        Ok(Lease {
            id: row.id,
            property_id: row.property_id,
            tenant_id: row.tenant_id,
            landlord_id: row.landlord_id,
            monthly_rent: row.monthly_rent,
            security_deposit: row.security_deposit,
            start_date: row.start_date,
            end_date: row.end_date,
            lease_duration_months: row.lease_duration_months,
            status: row.status.parse()?,
            pet_deposit: row.pet_deposit,
            utilities_included: row.utilities_included,
            parking_included: row.parking_included,
            created_at: row.created_at,
            updated_at: row.updated_at,
            signed_at: row.signed_at,
        })
    }
}

#[derive(FromRow)]
struct ServiceRow {
    id: i64,
    name: String,
    description: Option<String>,
    rate: f64,
    is_active: bool,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Service {
            id: row.id,
            name: row.name,
            description: row.description,
            rate: row.rate,
            is_active: row.is_active,
        }
    }
}

#[derive(FromRow)]
struct ServiceBookingRow {
    id: i64,
    tenant_id: i64,
    property_id: i64,
    service_id: i64,
    requested_date: NaiveDate,
    status: String,
    notes: Option<String>,
}

impl TryFrom<ServiceBookingRow> for ServiceBooking {
    type Error = StorageError;

    fn try_from(row: ServiceBookingRow) -> Result<Self, Self::Error> {
        Ok(ServiceBooking {
            id: row.id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            service_id: row.service_id,
            requested_date: row.requested_date,
            status: row.status.parse()?,
            notes: row.notes,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StorageError>
where
    T: TryFrom<R, Error = StorageError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Append the WHERE clause restricting a per-party table to `scope`.
fn push_scope(builder: &mut QueryBuilder<'_, Postgres>, scope: RecordScope, has_landlord: bool) {
    match scope {
        RecordScope::All => {}
        RecordScope::Tenant(id) => {
            builder.push(" WHERE tenant_id = ").push_bind(id);
        }
        RecordScope::Landlord(id) if has_landlord => {
            builder.push(" WHERE landlord_id = ").push_bind(id);
        }
        RecordScope::Landlord(id) => {
            builder
                .push(" WHERE property_id IN (SELECT id FROM properties WHERE landlord_id = ")
                .push_bind(id)
                .push(")");
        }
    }
}

/// Escape `LIKE` metacharacters so user input only matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Tell apart a guarded update that matched nothing because the row is gone
/// from one whose guard no longer held.
async fn stale_or_missing<'e, E>(executor: E, table: &str, entity: &str, id: i64) -> StorageError
where
    E: sqlx::PgExecutor<'e>,
{
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
    match sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(executor)
        .await
    {
        Ok(true) => StorageError::stale(entity, id),
        Ok(false) => StorageError::not_found(entity, id),
        Err(e) => e.into(),
    }
}

/// PostgreSQL storage backend implementation.
pub struct PostgresStorageBackend {
    pool: PgPool,
}

impl PostgresStorageBackend {
    /// Create a new PostgreSQL storage backend.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, column: &str, value: &str) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[async_trait]
impl StorageBackend for PostgresStorageBackend {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, role, approval_status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.approval_status.as_str())
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        self.fetch_user("email", email).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        self.fetch_user("username", username).await
    }

    async fn list_users(&self) -> Result<Vec<User>, StorageError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn set_approval_status(
        &self,
        id: i64,
        status: ApprovalStatus,
    ) -> Result<User, StorageError> {
        let sql = format!(
            "UPDATE users SET approval_status = $1 WHERE id = $2 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::not_found("User", id))?
            .try_into()
    }

    async fn delete_user(&self, id: i64) -> Result<UserDeletion, StorageError> {
        let mut tx = self.pool.begin().await?;

        let owned = "SELECT id FROM properties WHERE landlord_id = $1";
        sqlx::query(&format!(
            "DELETE FROM service_bookings WHERE tenant_id = $1 OR property_id IN ({owned})"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM payments WHERE tenant_id = $1 OR property_id IN ({owned}) \
             OR lease_id IN (SELECT id FROM leases WHERE tenant_id = $1 OR landlord_id = $1)"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query(&format!(
            "DELETE FROM leases WHERE tenant_id = $1 OR landlord_id = $1 \
             OR property_id IN ({owned})"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let bookings_deleted = sqlx::query(&format!(
            "DELETE FROM bookings WHERE tenant_id = $1 OR property_id IN ({owned})"
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        let properties_deleted = sqlx::query("DELETE FROM properties WHERE landlord_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let users_deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if users_deleted == 0 {
            tx.rollback().await?;
            return Err(StorageError::not_found("User", id));
        }
        tx.commit().await?;

        Ok(UserDeletion {
            properties_deleted,
            bookings_deleted,
        })
    }

    async fn create_property(&self, property: NewProperty) -> Result<Property, StorageError> {
        let sql = format!(
            "INSERT INTO properties (landlord_id, name, description, location, price, \
             property_type, bedrooms, bathrooms, square_feet, available, amenities, images, \
             latitude, longitude) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PROPERTY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(property.landlord_id)
            .bind(&property.name)
            .bind(&property.description)
            .bind(&property.location)
            .bind(property.price)
            .bind(&property.property_type)
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.square_feet)
            .bind(property.available)
            .bind(encode_list(&property.amenities))
            .bind(encode_list(&property.images))
            .bind(property.latitude)
            .bind(property.longitude)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get_property(&self, id: i64) -> Result<Option<Property>, StorageError> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1");
        let row = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Property::from))
    }

    async fn list_properties(&self, query: &PropertyQuery) -> Result<Vec<Property>, StorageError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE TRUE"));

        if let Some(landlord_id) = query.landlord_id {
            builder.push(" AND landlord_id = ").push_bind(landlord_id);
        }
        if query.available_only {
            builder.push(" AND available = TRUE");
        }
        if let Some(property_type) = &query.property_type {
            builder
                .push(" AND property_type = ")
                .push_bind(property_type.clone());
        }
        if let Some(location) = &query.location {
            builder
                .push(" AND location ILIKE ")
                .push_bind(format!("%{}%", escape_like(location)))
                .push(r" ESCAPE '\'");
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(min_bedrooms) = query.min_bedrooms {
            builder.push(" AND bedrooms >= ").push_bind(min_bedrooms);
        }
        match query.has_gps {
            Some(true) => {
                builder.push(" AND latitude IS NOT NULL AND longitude IS NOT NULL");
            }
            Some(false) => {
                builder.push(" AND (latitude IS NULL OR longitude IS NULL)");
            }
            None => {}
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build_query_as::<PropertyRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn update_property(&self, property: Property) -> Result<Property, StorageError> {
        let sql = format!(
            "UPDATE properties SET name = $1, description = $2, location = $3, price = $4, \
             property_type = $5, bedrooms = $6, bathrooms = $7, square_feet = $8, \
             available = $9, amenities = $10, images = $11, latitude = $12, longitude = $13, \
             updated_at = $14 WHERE id = $15 RETURNING {PROPERTY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(&property.name)
            .bind(&property.description)
            .bind(&property.location)
            .bind(property.price)
            .bind(&property.property_type)
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.square_feet)
            .bind(property.available)
            .bind(encode_list(&property.amenities))
            .bind(encode_list(&property.images))
            .bind(property.latitude)
            .bind(property.longitude)
            .bind(property.updated_at)
            .bind(property.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::not_found("Property", property.id))?;
        Ok(row.into())
    }

    async fn delete_property(&self, id: i64) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for table in ["service_bookings", "payments", "leases", "bookings"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE property_id = $1"))
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        let deleted = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            tx.rollback().await?;
            return Err(StorageError::not_found("Property", id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, StorageError> {
        let sql = format!(
            "INSERT INTO bookings (tenant_id, property_id, status, message) \
             VALUES ($1, $2, $3, $4) RETURNING {BOOKING_COLUMNS}"
        );
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(booking.tenant_id)
            .bind(booking.property_id)
            .bind(BookingStatus::Pending.as_str())
            .bind(&booking.message)
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn get_booking(&self, id: i64) -> Result<Option<Booking>, StorageError> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1");
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_bookings(&self, scope: RecordScope) -> Result<Vec<Booking>, StorageError> {
        let mut builder = QueryBuilder::new(format!("SELECT {BOOKING_COLUMNS} FROM bookings"));
        push_scope(&mut builder, scope, false);
        builder.push(" ORDER BY created_at DESC, id DESC");
        let rows = builder
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn find_open_booking(
        &self,
        tenant_id: i64,
        property_id: i64,
    ) -> Result<Option<Booking>, StorageError> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE tenant_id = $1 AND property_id = $2 AND status IN ('pending', 'approved') \
             LIMIT 1"
        );
        sqlx::query_as::<_, BookingRow>(&sql)
            .bind(tenant_id)
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn update_booking_status(
        &self,
        id: i64,
        expected: BookingStatus,
        status: BookingStatus,
        landlord_response: Option<String>,
        property_available: Option<bool>,
    ) -> Result<Booking, StorageError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let sql = format!(
            "UPDATE bookings SET status = $1, \
             landlord_response = COALESCE($2, landlord_response), updated_at = $3 \
             WHERE id = $4 AND status = $5 RETURNING {BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, BookingRow>(&sql)
            .bind(status.as_str())
            .bind(&landlord_response)
            .bind(now)
            .bind(id)
            .bind(expected.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            let err = stale_or_missing(&mut *tx, "bookings", "Booking", id).await;
            tx.rollback().await?;
            return Err(err);
        };

        match property_available {
            Some(false) => {
                let taken = sqlx::query(
                    "UPDATE properties SET available = FALSE, updated_at = $1 \
                     WHERE id = $2 AND available",
                )
                .bind(now)
                .bind(row.property_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
                if taken == 0 {
                    tx.rollback().await?;
                    return Err(StorageError::stale("Property", row.property_id));
                }
            }
            Some(true) => {
                sqlx::query(
                    "UPDATE properties SET available = TRUE, updated_at = $1 WHERE id = $2 \
                     AND NOT EXISTS (SELECT 1 FROM bookings \
                     WHERE property_id = $2 AND status = 'approved' AND id <> $3)",
                )
                .bind(now)
                .bind(row.property_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            }
            None => {}
        }

        tx.commit().await?;
        row.try_into()
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment, StorageError> {
        let sql = format!(
            "INSERT INTO payments (tenant_id, property_id, lease_id, amount, method, status, \
             due_date, notes) VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7) \
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment.tenant_id)
            .bind(payment.property_id)
            .bind(payment.lease_id)
            .bind(payment.amount)
            .bind(payment.method.as_str())
            .bind(payment.due_date)
            .bind(&payment.notes)
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn get_payment(&self, id: i64) -> Result<Option<Payment>, StorageError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    async fn list_payments(
        &self,
        scope: RecordScope,
        limit: Option<usize>,
    ) -> Result<Vec<Payment>, StorageError> {
        let mut builder = QueryBuilder::new(format!("SELECT {PAYMENT_COLUMNS} FROM payments"));
        push_scope(&mut builder, scope, false);
        builder.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }
        let rows = builder
            .build_query_as::<PaymentRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_payment(
        &self,
        payment: Payment,
        expected: PaymentStatus,
    ) -> Result<Payment, StorageError> {
        let sql = format!(
            "UPDATE payments SET status = $1, paid_date = $2, transaction_id = $3, \
             reference_number = $4, notes = $5, updated_at = $6 WHERE id = $7 AND status = $8 \
             RETURNING {PAYMENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PaymentRow>(&sql)
            .bind(payment.status.as_str())
            .bind(payment.paid_date)
            .bind(&payment.transaction_id)
            .bind(&payment.reference_number)
            .bind(&payment.notes)
            .bind(payment.updated_at)
            .bind(payment.id)
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => Err(stale_or_missing(&self.pool, "payments", "Payment", payment.id).await),
        }
    }

    async fn create_lease(&self, lease: NewLease) -> Result<Lease, StorageError> {
        let sql = format!(
            "INSERT INTO leases (property_id, tenant_id, landlord_id, monthly_rent, \
             security_deposit, start_date, end_date, lease_duration_months, status, pet_deposit, \
             utilities_included, parking_included) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9, $10, $11) \
             RETURNING {LEASE_COLUMNS}"
        );
        sqlx::query_as::<_, LeaseRow>(&sql)
            .bind(lease.property_id)
            .bind(lease.tenant_id)
            .bind(lease.landlord_id)
            .bind(lease.monthly_rent)
            .bind(lease.security_deposit)
            .bind(lease.start_date)
            .bind(lease.end_date)
            .bind(lease.lease_duration_months)
            .bind(lease.pet_deposit)
            .bind(lease.utilities_included)
            .bind(lease.parking_included)
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn get_lease(&self, id: i64) -> Result<Option<Lease>, StorageError> {
        let sql = format!("SELECT {LEASE_COLUMNS} FROM leases WHERE id = $1");
        sqlx::query_as::<_, LeaseRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Lease::try_from)
            .transpose()
    }

    async fn list_leases(&self, scope: RecordScope) -> Result<Vec<Lease>, StorageError> {
        let mut builder = QueryBuilder::new(format!("SELECT {LEASE_COLUMNS} FROM leases"));
        push_scope(&mut builder, scope, true);
        builder.push(" ORDER BY created_at DESC, id DESC");
        let rows = builder
            .build_query_as::<LeaseRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_lease(
        &self,
        lease: Lease,
        expected: LeaseStatus,
    ) -> Result<Lease, StorageError> {
        let sql = format!(
            "UPDATE leases SET status = $1, signed_at = $2, updated_at = $3 \
             WHERE id = $4 AND status = $5 RETURNING {LEASE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, LeaseRow>(&sql)
            .bind(lease.status.as_str())
            .bind(lease.signed_at)
            .bind(lease.updated_at)
            .bind(lease.id)
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => Err(stale_or_missing(&self.pool, "leases", "Lease", lease.id).await),
        }
    }

    async fn create_service(&self, service: NewService) -> Result<Service, StorageError> {
        let sql = format!(
            "INSERT INTO services (name, description, rate, is_active) \
             VALUES ($1, $2, $3, $4) RETURNING {SERVICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.rate)
            .bind(service.is_active)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn get_service(&self, id: i64) -> Result<Option<Service>, StorageError> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = $1");
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Service::from))
    }

    async fn list_services(&self, active_only: bool) -> Result<Vec<Service>, StorageError> {
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services WHERE is_active OR NOT $1 ORDER BY name, id"
        );
        let rows = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(active_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Service::from).collect())
    }

    async fn update_service(&self, service: Service) -> Result<Service, StorageError> {
        let sql = format!(
            "UPDATE services SET name = $1, description = $2, rate = $3, is_active = $4 \
             WHERE id = $5 RETURNING {SERVICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ServiceRow>(&sql)
            .bind(&service.name)
            .bind(&service.description)
            .bind(service.rate)
            .bind(service.is_active)
            .bind(service.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StorageError::not_found("Service", service.id))?;
        Ok(row.into())
    }

    async fn delete_service(&self, id: i64) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM service_bookings WHERE service_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            tx.rollback().await?;
            return Err(StorageError::not_found("Service", id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn create_service_booking(
        &self,
        booking: NewServiceBooking,
    ) -> Result<ServiceBooking, StorageError> {
        let sql = format!(
            "INSERT INTO service_bookings (tenant_id, property_id, service_id, requested_date, \
             status, notes) VALUES ($1, $2, $3, $4, 'pending', $5) \
             RETURNING {SERVICE_BOOKING_COLUMNS}"
        );
        sqlx::query_as::<_, ServiceBookingRow>(&sql)
            .bind(booking.tenant_id)
            .bind(booking.property_id)
            .bind(booking.service_id)
            .bind(booking.requested_date)
            .bind(&booking.notes)
            .fetch_one(&self.pool)
            .await?
            .try_into()
    }

    async fn get_service_booking(&self, id: i64) -> Result<Option<ServiceBooking>, StorageError> {
        let sql = format!("SELECT {SERVICE_BOOKING_COLUMNS} FROM service_bookings WHERE id = $1");
        sqlx::query_as::<_, ServiceBookingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(ServiceBooking::try_from)
            .transpose()
    }

    async fn list_service_bookings(
        &self,
        scope: RecordScope,
    ) -> Result<Vec<ServiceBooking>, StorageError> {
        let mut builder = QueryBuilder::new(format!(
            "SELECT {SERVICE_BOOKING_COLUMNS} FROM service_bookings"
        ));
        push_scope(&mut builder, scope, false);
        builder.push(" ORDER BY id DESC");
        let rows = builder
            .build_query_as::<ServiceBookingRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_service_booking_status(
        &self,
        id: i64,
        expected: ServiceBookingStatus,
        status: ServiceBookingStatus,
    ) -> Result<ServiceBooking, StorageError> {
        let sql = format!(
            "UPDATE service_bookings SET status = $1 WHERE id = $2 AND status = $3 \
             RETURNING {SERVICE_BOOKING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ServiceBookingRow>(&sql)
            .bind(status.as_str())
            .bind(id)
            .bind(expected.as_str())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => row.try_into(),
            None => {
                Err(stale_or_missing(&self.pool, "service_bookings", "ServiceBooking", id).await)
            }
        }
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
