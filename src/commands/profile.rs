use crate::args::ProfileSetArgs;
use crate::commands::{table, Out};
use crate::profile::{Profile, ProfileUpdate};
use crate::{Config, Result};

fn profile_text(profile: &Profile) -> String {
    let value = |v: &str| {
        if v.is_empty() {
            "-".to_string()
        } else {
            v.to_string()
        }
    };
    let rows = [
        ["Nama bisnis".to_string(), value(&profile.business_name)],
        ["Nama pemilik".to_string(), value(&profile.owner_name)],
        ["Kontak".to_string(), value(&profile.contact)],
        ["Email".to_string(), value(&profile.email)],
    ];
    table(["Profil", ""], &rows)
}

/// Handles `cuan profile show`.
pub async fn show_profile(config: &Config) -> Result<Out<Profile>> {
    let profile = config.profile_store().load().await?;
    Ok(Out::new(profile_text(&profile), profile))
}

/// Handles `cuan profile set`. Every given field is validated before any is saved.
pub async fn set_profile(config: &Config, args: &ProfileSetArgs) -> Result<Out<Profile>> {
    let update = ProfileUpdate {
        business_name: args.business_name().map(str::to_string),
        owner_name: args.owner_name().map(str::to_string),
        contact: args.contact().map(str::to_string),
        email: args.email().map(str::to_string),
    };
    let store = config.profile_store();
    let mut profile = store.load().await?;
    if update.is_empty() {
        return Ok(Out::new("Tidak ada perubahan", profile));
    }
    profile.apply(update)?;
    store.save(&profile).await?;
    Ok(Out::new(
        format!("Profil diperbarui\n{}", profile_text(&profile)),
        profile,
    ))
}
