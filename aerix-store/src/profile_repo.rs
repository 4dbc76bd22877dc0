use aerix_core::model::{PassengerProfile, User};
use aerix_core::pii::Masked;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqliteConnection;

use crate::error::StoreError;

pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub role: aerix_core::principal::Role,
    pub is_active: bool,
}

/// Contact/identity fields supplied when creating or updating a profile.
pub struct ProfileData {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub passport_number: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    hashed_password: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            hashed_password: row.hashed_password,
            role: row.role.parse()?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    user_id: i64,
    full_name: String,
    email: String,
    phone: Option<String>,
    passport_number: Option<String>,
    nationality: Option<String>,
    date_of_birth: Option<NaiveDate>,
}

impl From<ProfileRow> for PassengerProfile {
    fn from(row: ProfileRow) -> Self {
        PassengerProfile {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            email: row.email,
            phone: row.phone,
            passport_number: row.passport_number.map(Masked),
            nationality: row.nationality,
            date_of_birth: row.date_of_birth,
        }
    }
}

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn insert_user(
        conn: &mut SqliteConnection,
        user: &NewUser,
        now: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, hashed_password, role, is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: user.username.clone(),
            email: user.email.clone(),
            hashed_password: user.hashed_password.clone(),
            role: user.role,
            is_active: user.is_active,
            created_at: now,
        })
    }

    pub async fn user_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn profile_for_user(
        conn: &mut SqliteConnection,
        user_id: i64,
    ) -> Result<Option<PassengerProfile>, StoreError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT * FROM passenger_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.map(PassengerProfile::from))
    }

    pub async fn profile_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<PassengerProfile>, StoreError> {
        let row =
            sqlx::query_as::<_, ProfileRow>("SELECT * FROM passenger_profiles WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(row.map(PassengerProfile::from))
    }

    /// True when the profile exists and is owned by the given user.
    pub async fn profile_belongs_to_user(
        conn: &mut SqliteConnection,
        profile_id: i64,
        user_id: i64,
    ) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM passenger_profiles WHERE id = ? AND user_id = ?",
        )
        .bind(profile_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.is_some())
    }

    /// Create the caller's profile, or update it in place if one exists.
    pub async fn upsert_profile(
        conn: &mut SqliteConnection,
        user_id: i64,
        data: &ProfileData,
    ) -> Result<PassengerProfile, StoreError> {
        let existing = Self::profile_for_user(&mut *conn, user_id).await?;

        let id = match existing {
            Some(profile) => {
                sqlx::query(
                    "UPDATE passenger_profiles SET full_name = ?, email = ?, phone = ?, \
                     passport_number = ?, nationality = ?, date_of_birth = ? WHERE id = ?",
                )
                .bind(&data.full_name)
                .bind(&data.email)
                .bind(&data.phone)
                .bind(&data.passport_number)
                .bind(&data.nationality)
                .bind(data.date_of_birth)
                .bind(profile.id)
                .execute(&mut *conn)
                .await?;
                profile.id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO passenger_profiles \
                     (user_id, full_name, email, phone, passport_number, nationality, date_of_birth) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(user_id)
                .bind(&data.full_name)
                .bind(&data.email)
                .bind(&data.phone)
                .bind(&data.passport_number)
                .bind(&data.nationality)
                .bind(data.date_of_birth)
                .execute(&mut *conn)
                .await?;
                result.last_insert_rowid()
            }
        };

        Ok(PassengerProfile {
            id,
            user_id,
            full_name: data.full_name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            passport_number: data.passport_number.clone().map(Masked),
            nationality: data.nationality.clone(),
            date_of_birth: data.date_of_birth,
        })
    }
}
