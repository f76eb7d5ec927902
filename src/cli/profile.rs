//! Profile command implementations

use colored::Colorize;

use crate::cache::Endpoint;
use crate::cli::{CommandContext, OutputFormat};
use crate::client::Profile;
use crate::error::{Error, Result};
use crate::models::ProfileDisplay;
use crate::output::Formattable;

/// Profile fields to change; unset fields are left alone
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub activity_level: Option<String>,
}

impl ProfileUpdate {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.weight_kg.is_none()
            && self.height_cm.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.activity_level.is_none()
    }

    fn apply(&self, mut profile: Profile) -> Profile {
        if let Some(v) = &self.full_name {
            profile.full_name = Some(v.clone());
        }
        if let Some(v) = self.weight_kg {
            profile.weight_kg = Some(v);
        }
        if let Some(v) = self.height_cm {
            profile.height_cm = Some(v);
        }
        if let Some(v) = self.age {
            profile.age = Some(v);
        }
        if let Some(v) = &self.gender {
            profile.gender = Some(v.clone());
        }
        if let Some(v) = &self.activity_level {
            profile.activity_level = Some(v.clone());
        }
        profile
    }
}

async fn load_profile(ctx: &CommandContext) -> Result<Profile> {
    let store = ctx.store.clone();
    let user = ctx.user_id().to_string();

    let query = ctx.query(Endpoint::PROFILE, &[], move |_| {
        let store = store.clone();
        let user = user.clone();
        async move { store.get_profile(&user).await }
    });
    ctx.read(&query, "Loading profile...").await
}

/// Show the user's profile
pub async fn show(ctx: &CommandContext) -> Result<()> {
    let profile = load_profile(ctx).await?;
    ProfileDisplay(profile).print(ctx.format)
}

/// Update profile fields
pub async fn set(ctx: &CommandContext, update: &ProfileUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(Error::Other(
            "Nothing to change. Pass at least one profile field, see `nutrilog profile set --help`"
                .to_string(),
        ));
    }

    let profile = update.apply(load_profile(ctx).await?);

    let store = ctx.store.clone();
    let mutation = ctx.mutation(&[Endpoint::PROFILE], move |profile: Profile| {
        let store = store.clone();
        async move { store.update_profile(&profile).await }
    });
    let saved = mutation.run(profile).await?;

    if ctx.format != OutputFormat::Json {
        println!("{} Profile updated", "✓".green());
    }
    ProfileDisplay(saved).print(ctx.format)
}
