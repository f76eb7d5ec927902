//! Supabase (PostgREST) implementation of [`NutritionStore`]

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone};
use log::debug;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::rate_limit::{Service, ServiceRateLimiter};
use super::response::{check_status, read_json};
use super::{DailyGoals, Meal, NewMeal, NewQuickFood, NutritionStore, Profile, QuickFood};
use crate::config::Config;
use crate::error::{ApiError, ConfigError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_UPSERT: &str = "return=representation,resolution=merge-duplicates";

/// Equality filter value, `eq.<value>`
fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Lower and upper `created_at` bounds covering one calendar day in `tz`
fn day_bounds<Tz>(date: NaiveDate, tz: &Tz) -> (String, String)
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let next = date.succ_opt().unwrap_or(date);
    (
        format!("gte.{}", start_of_day(date, tz)),
        format!("lt.{}", start_of_day(next, tz)),
    )
}

/// Midnight of `date` in `tz` as RFC 3339 with its offset. A midnight
/// skipped by a DST change reads as that wall time in UTC.
fn start_of_day<Tz>(date: NaiveDate, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Supabase REST client
pub struct SupabaseClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    bearer: String,
    rate_limiter: ServiceRateLimiter,
}

impl SupabaseClient {
    /// Create a client for a project. Without a session token, requests are
    /// authorized with the anon key.
    pub fn new(url: &str, api_key: &str, access_token: Option<&str>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: access_token.unwrap_or(api_key).to_string(),
            rate_limiter: ServiceRateLimiter::reactive(Service::Store),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) else {
            return Err(ConfigError::MissingSupabase.into());
        };
        if config.access_token.is_some() && config.is_token_expired() {
            log::warn!("Session token is expired or about to expire; requests may be rejected");
        }
        Self::new(url, key, config.access_token.as_deref())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        prefer: &str,
    ) -> Result<T> {
        self.rate_limiter.wait_if_active().await;

        let url = format!("{}/rest/v1/{}", self.base_url, table);
        debug!("{} {} {:?}", method, url, query);

        let mut request = self
            .http
            .request(method, &url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.bearer))
            .header("Prefer", prefer)
            .query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            self.rate_limiter.activate();
        }

        let response = check_status(response).await?;
        read_json(response).await
    }

    /// Run a request that returns rows and keep the first one.
    async fn send_one<T: DeserializeOwned>(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, String)],
        body: Option<Value>,
        prefer: &str,
        missing: impl FnOnce() -> ApiError,
    ) -> Result<T> {
        let rows: Vec<T> = self.send(method, table, query, body, prefer).await?;
        rows.into_iter().next().ok_or_else(|| missing().into())
    }

    async fn delete_by_id(&self, table: &str, id: &str) -> Result<()> {
        let deleted: Vec<Value> = self
            .send(
                Method::DELETE,
                table,
                &[("id", eq(id))],
                None,
                PREFER_REPRESENTATION,
            )
            .await?;

        if deleted.is_empty() {
            return Err(ApiError::NotFound(format!("{} {}", table, id)).into());
        }
        Ok(())
    }
}

fn to_body<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[async_trait]
impl NutritionStore for SupabaseClient {
    async fn list_meals(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Meal>> {
        let (from, until) = day_bounds(date, &Local);
        self.send(
            Method::GET,
            "meals",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("created_at", from),
                ("created_at", until),
                ("order", "created_at.desc".to_string()),
            ],
            None,
            PREFER_REPRESENTATION,
        )
        .await
    }

    async fn create_meal(&self, meal: &NewMeal) -> Result<Meal> {
        self.send_one(
            Method::POST,
            "meals",
            &[],
            Some(to_body(meal)?),
            PREFER_REPRESENTATION,
            || ApiError::InvalidResponse("Insert returned no rows".to_string()),
        )
        .await
    }

    async fn delete_meal(&self, id: &str) -> Result<()> {
        self.delete_by_id("meals", id).await
    }

    async fn get_daily_goals(&self, user_id: &str) -> Result<DailyGoals> {
        let rows: Vec<DailyGoals> = self
            .send(
                Method::GET,
                "daily_goals",
                &[
                    ("select", "*".to_string()),
                    ("user_id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
                None,
                PREFER_REPRESENTATION,
            )
            .await?;

        Ok(rows
            .into_iter()
            .next()
            .unwrap_or_else(|| DailyGoals::defaults_for(user_id)))
    }

    async fn upsert_daily_goals(&self, goals: &DailyGoals) -> Result<DailyGoals> {
        self.send_one(
            Method::POST,
            "daily_goals",
            &[("on_conflict", "user_id".to_string())],
            Some(to_body(goals)?),
            PREFER_UPSERT,
            || ApiError::InvalidResponse("Upsert returned no rows".to_string()),
        )
        .await
    }

    async fn list_quick_foods(&self, user_id: &str) -> Result<Vec<QuickFood>> {
        self.send(
            Method::GET,
            "quick_foods",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(user_id)),
                ("order", "name.asc".to_string()),
            ],
            None,
            PREFER_REPRESENTATION,
        )
        .await
    }

    async fn create_quick_food(&self, food: &NewQuickFood) -> Result<QuickFood> {
        self.send_one(
            Method::POST,
            "quick_foods",
            &[],
            Some(to_body(food)?),
            PREFER_REPRESENTATION,
            || ApiError::InvalidResponse("Insert returned no rows".to_string()),
        )
        .await
    }

    async fn delete_quick_food(&self, id: &str) -> Result<()> {
        self.delete_by_id("quick_foods", id).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.send_one(
            Method::GET,
            "profiles",
            &[("select", "*".to_string()), ("id", eq(user_id))],
            None,
            PREFER_REPRESENTATION,
            || ApiError::NotFound(format!("profile {}", user_id)),
        )
        .await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile> {
        self.send_one(
            Method::PATCH,
            "profiles",
            &[("id", eq(&profile.id))],
            Some(to_body(profile)?),
            PREFER_REPRESENTATION,
            || ApiError::NotFound(format!("profile {}", profile.id)),
        )
        .await
    }
}
