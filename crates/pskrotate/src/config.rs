//! CLI configuration: thin layer over `pskrotate_config` that applies
//! `GlobalOpts` and per-command flag overrides.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use secrecy::SecretString;
use tracing::info;

use pskrotate_core::{
    DashboardSettings, OrgSelector, RotationPlan, TagCase, TagMatchMode, TagPolicy,
};

use crate::cli::{GlobalOpts, OrgArgs, RotateArgs, SsidArgs, TagMatch};
use crate::error::CliError;

pub use pskrotate_config::{
    Config, Profile, SsidTarget, config_path, load_config, render_redacted, resolve_ssid_target,
    resolve_webex_token,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Look up the active profile.
///
/// A named profile must exist. The implicit `default` profile may be
/// absent, in which case flags and env vars carry everything.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);
    if let Some(profile) = config.profiles.get(&name) {
        return Ok((name, profile.clone()));
    }
    if global.profile.is_some() || name != "default" {
        let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name,
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        });
    }
    Ok((name, Profile::default()))
}

/// Translate a `Profile` + global flags into Dashboard connection settings.
///
/// CLI flags take priority over profile values.
pub fn resolve_settings(
    config: &Config,
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<DashboardSettings, CliError> {
    let api_key = match global.api_key {
        Some(ref key) if !key.is_empty() => SecretString::from(key.clone()),
        _ => pskrotate_config::resolve_api_key(profile, profile_name)?,
    };

    let mut profile = profile.clone();
    if let Some(ref url) = global.base_url {
        profile.base_url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    Ok(profile.dashboard_settings(api_key, config.defaults.timeout)?)
}

/// Organization flags win over the profile.
pub fn org_selector(args: &OrgArgs, profile: &Profile) -> OrgSelector {
    match (&args.org, &args.org_name) {
        (Some(id), _) => OrgSelector::Id(id.clone()),
        (None, Some(name)) => OrgSelector::Name(name.clone()),
        (None, None) => profile.org_selector(),
    }
}

/// SSID flags win over the profile; the default index applies last.
pub fn ssid_target(args: &SsidArgs, profile: &Profile) -> SsidTarget {
    let (index, name) = if args.ssid_number.is_some() || args.ssid_name.is_some() {
        (args.ssid_number, args.ssid_name.clone())
    } else {
        (profile.ssid_number, profile.ssid_name.clone())
    };
    let target = resolve_ssid_target(index, name);
    if target.defaulted {
        info!(
            ssid_number = target.index,
            "no SSID configured, using the default SSID number"
        );
    }
    target
}

/// Tag policy from flags, falling back to the profile per field.
pub fn tag_policy(tag_match: Option<TagMatch>, ignore_case: bool, profile: &Profile) -> TagPolicy {
    let base = profile.tag_policy();
    let mode = match tag_match {
        Some(TagMatch::All) => TagMatchMode::All,
        Some(TagMatch::Any) => TagMatchMode::Any,
        None => base.mode,
    };
    let case = if ignore_case {
        TagCase::Insensitive
    } else {
        base.case
    };
    TagPolicy::new(mode, case)
}

/// Tags from flags, or the profile's when none were given.
pub fn required_tags(flags: &[String], profile: &Profile) -> BTreeSet<String> {
    let source = if flags.is_empty() {
        &profile.required_tags
    } else {
        flags
    };
    source
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Build the validated rotation plan for `rotate`.
pub fn rotation_plan(
    args: &RotateArgs,
    profile: &Profile,
    psk: SecretString,
) -> Result<RotationPlan, CliError> {
    let ssid = ssid_target(&args.ssid, profile);
    let concurrency = match args.concurrency {
        Some(n) => usize::try_from(n)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| CliError::Validation {
                field: "concurrency".into(),
                reason: "must be at least 1".into(),
            })?,
        None => profile.concurrency()?,
    };

    Ok(RotationPlan::builder()
        .organization(org_selector(&args.org, profile))
        .required_tags(required_tags(&args.tags, profile))
        .tag_policy(tag_policy(args.tag_match, args.ignore_case, profile))
        .ssid_index(ssid.index)
        .ssid_name(ssid.name)
        .psk(psk)
        .notify(args.notify)
        .concurrency(concurrency)
        .retry(profile.retry_policy()?)
        .build()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pskrotate").chain(args.iter().copied())).unwrap()
    }

    fn rotate_args(cli: Cli) -> RotateArgs {
        match cli.command {
            Command::Rotate(args) => *args,
            other => panic!("expected rotate, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_profile_fields() {
        let profile = Profile {
            required_tags: vec!["from-profile".into()],
            ssid_name: Some("Corp".into()),
            organization: Some("O1".into()),
            ..Profile::default()
        };
        let args = rotate_args(parse(&[
            "rotate",
            "--tag",
            "psk-rotate",
            "--ssid-number",
            "2",
            "--org-name",
            "Acme",
            "--match",
            "any",
        ]));

        let plan = rotation_plan(&args, &profile, SecretString::from("NewPass123!".to_owned()))
            .unwrap();
        assert_eq!(plan.required_tags, BTreeSet::from(["psk-rotate".to_owned()]));
        assert_eq!(plan.ssid.index(), Some(2));
        assert_eq!(plan.ssid.name(), None);
        assert_eq!(plan.organization, OrgSelector::Name("Acme".into()));
        assert_eq!(plan.tag_policy.mode, TagMatchMode::Any);
    }

    #[test]
    fn profile_fills_in_and_ssid_defaults() {
        let profile = Profile {
            required_tags: vec![" psk-rotate ".into(), String::new()],
            ..Profile::default()
        };
        let args = rotate_args(parse(&["rotate", "--ignore-case"]));

        let plan = rotation_plan(&args, &profile, SecretString::from("NewPass123!".to_owned()))
            .unwrap();
        assert_eq!(plan.required_tags, BTreeSet::from(["psk-rotate".to_owned()]));
        assert_eq!(plan.ssid.index(), Some(3));
        assert_eq!(plan.organization, OrgSelector::First);
        assert_eq!(plan.tag_policy.case, TagCase::Insensitive);
    }

    #[test]
    fn no_tags_anywhere_is_rejected() {
        let args = rotate_args(parse(&["rotate"]));
        let err = rotation_plan(
            &args,
            &Profile::default(),
            SecretString::from("NewPass123!".to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }), "{err:?}");
    }

    #[test]
    fn explicit_missing_profile_is_an_error() {
        let cli = parse(&["--profile", "lab", "orgs", "list"]);
        let config = Config {
            profiles: HashMap::from([("corp".to_owned(), Profile::default())]),
            ..Config::default()
        };
        let err = active_profile(&cli.global, &config).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "corp"));

        let implicit = parse(&["orgs", "list"]);
        let (name, _) = active_profile(&implicit.global, &Config::default()).unwrap();
        assert_eq!(name, "default");
    }
}
